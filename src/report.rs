//! Final verdict and the human-readable run report.

use crate::error::{IntegrityError, LaunchError, ResultParseError};
use crate::hash::{md5_hex, TargetDigest};
use crate::search::codec::IndexCodec;
use crate::search::config::SearchSpec;
use crate::search::parallel::collector::{CompletionReport, WorkerOutcome};
use crate::search::parallel::launcher::WorkerHandle;
use crate::search::result::{FoundResult, RunStatistics};
use std::fmt;
use std::io::Write;
use tracing::warn;

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A worker published a candidate and it hashes to the target.
    Found { worker_id: usize, candidate: String },
    /// Every worker scanned its range and nobody published.
    NotFound,
    /// A worker published a candidate that does not hash to the target.
    Inconsistent(IntegrityError),
    /// Nobody published, but some workers did not finish their range.
    Inconclusive { failed_workers: Vec<usize> },
}

impl Verdict {
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Verdict::Inconsistent(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Found {
                worker_id,
                candidate,
            } => write!(f, "found '{}' (worker {})", candidate, worker_id),
            Verdict::NotFound => write!(f, "not found"),
            Verdict::Inconsistent(e) => write!(f, "inconsistent: {}", e),
            Verdict::Inconclusive { failed_workers } => {
                write!(f, "inconclusive: workers {} did not complete", join_ids(failed_workers))
            }
        }
    }
}

/// Decide the verdict once collection is over.
///
/// A published candidate is always re-hashed; it is never trusted as is.
pub fn decide(
    report: &CompletionReport,
    found: Option<&FoundResult>,
    target: &TargetDigest,
) -> Verdict {
    if let Some(found) = found {
        let actual = md5_hex(&found.candidate);
        if actual == target.as_str() {
            return Verdict::Found {
                worker_id: found.worker_id,
                candidate: found.candidate.clone(),
            };
        }
        return Verdict::Inconsistent(IntegrityError {
            worker_id: found.worker_id,
            candidate: found.candidate.clone(),
            expected: target.to_string(),
            actual,
        });
    }

    if report.all_succeeded() {
        Verdict::NotFound
    } else {
        Verdict::Inconclusive {
            failed_workers: report.failed_workers(),
        }
    }
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes progress and summary lines for one run.
///
/// Output errors are logged once and otherwise ignored so a closed stdout
/// never interrupts collection.
pub struct Reporter<W: Write> {
    out: W,
    write_failed: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", args) {
            if !self.write_failed {
                warn!(error = %e, "failed to write report output");
                self.write_failed = true;
            }
        }
    }

    pub fn banner(&mut self, spec: &SearchSpec, target: &TargetDigest) {
        self.line(format_args!("=== Parallel preimage search ==="));
        self.line(format_args!("Target digest: {}", target));
        self.line(format_args!("Candidate length: {}", spec.candidate_length()));
        self.line(format_args!(
            "Alphabet: {} ({} symbols)",
            spec.alphabet(),
            spec.alphabet().len()
        ));
        self.line(format_args!("Workers: {}", spec.worker_count()));
        self.line(format_args!(
            "Search space: {} candidates\n",
            spec.space_size()
        ));
        self.line(format_args!("Starting workers..."));
    }

    pub fn worker_started(&mut self, handle: &WorkerHandle, codec: &IndexCodec) {
        let who = match handle.pid() {
            Some(pid) => format!("pid {}", pid),
            None => format!("task {}", handle.id()),
        };
        let range = handle.assignment().range;
        if range.is_empty() {
            self.line(format_args!(
                "worker {} | {} | (empty)",
                handle.worker_id(),
                who
            ));
        } else {
            self.line(format_args!(
                "worker {} | {} | {} .. {} ({} candidates)",
                handle.worker_id(),
                who,
                codec.encode_for_display(range.start),
                codec.encode_for_display(range.end - 1),
                range.len()
            ));
        }
    }

    pub fn launch_failed(&mut self, error: &LaunchError) {
        self.line(format_args!(
            "worker {} | not started | {}",
            error.worker_id(),
            error
        ));
    }

    pub fn all_started(&mut self, launched: usize) {
        self.line(format_args!(
            "\n{} workers started. Waiting for completion...",
            launched
        ));
    }

    pub fn worker_finished(&mut self, outcome: &WorkerOutcome) {
        self.line(format_args!("worker {} {}", outcome.worker_id, outcome.exit));
    }

    pub fn collection_done(&mut self, report: &CompletionReport) {
        self.line(format_args!(
            "Workers collected: {} ({} finished normally)",
            report.outcomes().len(),
            report.succeeded()
        ));
    }

    pub fn result_unreadable(&mut self, error: &ResultParseError) {
        self.line(format_args!(
            "Warning: ignoring unreadable result artifact ({})",
            error
        ));
    }

    pub fn verdict(&mut self, verdict: &Verdict, stats: &RunStatistics) {
        self.line(format_args!("\n=== Result ==="));
        match verdict {
            Verdict::Found {
                worker_id,
                candidate,
            } => {
                self.line(format_args!(
                    "Worker {} found the candidate: {}",
                    worker_id, candidate
                ));
                self.line(format_args!("Digest verified: {}", md5_hex(candidate)));
            }
            Verdict::NotFound => {
                self.line(format_args!(
                    "No candidate in the search space matches the target."
                ));
            }
            Verdict::Inconsistent(e) => {
                self.line(format_args!("INTEGRITY ERROR: {}", e));
            }
            Verdict::Inconclusive { failed_workers } => {
                self.line(format_args!(
                    "Search inconclusive: workers {} did not complete; the search space may not have been fully covered.",
                    join_ids(failed_workers)
                ));
            }
        }
        self.line(format_args!("\n{}", stats.format_summary().trim_end()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::parallel::channel::ExitClassification;
    use crate::search::partition::{assign, IndexRange, WorkerAssignment};
    use std::time::Duration;

    fn abc_target() -> TargetDigest {
        TargetDigest::parse("900150983cd24fb0d6963f7d28e17f72").unwrap()
    }

    fn report_with(exits: Vec<ExitClassification>) -> CompletionReport {
        let mut report = CompletionReport::default();
        for (assignment, exit) in assign(27, exits.len()).into_iter().zip(exits) {
            report.record_exit(assignment, exit);
        }
        report
    }

    fn found(worker_id: usize, candidate: &str) -> FoundResult {
        FoundResult {
            worker_id,
            candidate: candidate.to_string(),
        }
    }

    #[test]
    fn test_verified_result_is_found() {
        let report = report_with(vec![ExitClassification::NormalSuccess; 4]);
        let verdict = decide(&report, Some(&found(2, "abc")), &abc_target());
        assert_eq!(
            verdict,
            Verdict::Found {
                worker_id: 2,
                candidate: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_unverified_result_is_inconsistent() {
        let report = report_with(vec![ExitClassification::NormalSuccess; 4]);
        let verdict = decide(&report, Some(&found(1, "abd")), &abc_target());
        match verdict {
            Verdict::Inconsistent(e) => {
                assert_eq!(e.worker_id, 1);
                assert_eq!(e.candidate, "abd");
                assert_eq!(e.expected, abc_target().to_string());
                assert_ne!(e.actual, e.expected);
            }
            other => panic!("expected Inconsistent, got {:?}", other),
        }
    }

    #[test]
    fn test_no_result_and_all_success_is_not_found() {
        let report = report_with(vec![ExitClassification::NormalSuccess; 5]);
        assert_eq!(decide(&report, None, &abc_target()), Verdict::NotFound);
    }

    #[test]
    fn test_no_result_with_failures_is_inconclusive() {
        let report = report_with(vec![
            ExitClassification::NormalSuccess,
            ExitClassification::NormalFailure(1),
            ExitClassification::AbnormalTermination("signal 11".to_string()),
        ]);
        assert_eq!(
            decide(&report, None, &abc_target()),
            Verdict::Inconclusive {
                failed_workers: vec![1, 2]
            }
        );
    }

    #[test]
    fn test_launch_failure_makes_run_inconclusive() {
        let mut report = report_with(vec![ExitClassification::NormalSuccess]);
        report.record_launch_failure(
            WorkerAssignment {
                worker_id: 1,
                range: IndexRange::new(27, 27),
            },
            "spawn failed".to_string(),
        );
        assert_eq!(
            decide(&report, None, &abc_target()),
            Verdict::Inconclusive {
                failed_workers: vec![1]
            }
        );
    }

    #[test]
    fn test_verified_result_wins_over_failures() {
        let report = report_with(vec![
            ExitClassification::NormalFailure(2),
            ExitClassification::NormalSuccess,
        ]);
        let verdict = decide(&report, Some(&found(1, "abc")), &abc_target());
        assert!(matches!(verdict, Verdict::Found { worker_id: 1, .. }));
    }

    #[test]
    fn test_rendered_run() {
        let spec = SearchSpec::new("ab", 2, 3).unwrap();
        let codec = IndexCodec::new(&spec);
        let mut reporter = Reporter::new(Vec::new());

        reporter.banner(&spec, &abc_target());
        for (i, assignment) in assign(4, 3).into_iter().enumerate() {
            let handle = WorkerHandle::new(i as u64 + 1, assignment).with_pid(100 + i as u32);
            reporter.worker_started(&handle, &codec);
        }
        reporter.all_started(3);
        reporter.verdict(
            &Verdict::NotFound,
            &RunStatistics {
                elapsed_time: Duration::from_millis(5),
                space_size: 4,
                candidates_covered: 4,
                workers_launched: 3,
                workers_succeeded: 3,
            },
        );

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Search space: 4 candidates"));
        assert!(text.contains("worker 0 | pid 100 | aa .. ab (2 candidates)"));
        assert!(text.contains("worker 1 | pid 101 | ba .. ba (1 candidates)"));
        assert!(text.contains("worker 2 | pid 102 | bb .. bb (1 candidates)"));
        assert!(text.contains("No candidate in the search space matches the target."));
        assert!(text.contains("Workers: 3/3 completed normally"));
    }

    #[test]
    fn test_rendered_empty_range() {
        let spec = SearchSpec::new("abc", 1, 5).unwrap();
        let codec = IndexCodec::new(&spec);
        let mut reporter = Reporter::new(Vec::new());
        let handle = WorkerHandle::new(
            9,
            WorkerAssignment {
                worker_id: 4,
                range: IndexRange::new(3, 3),
            },
        );

        reporter.worker_started(&handle, &codec);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "worker 4 | task 9 | (empty)\n");
    }
}

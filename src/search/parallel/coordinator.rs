//! Parallel search coordinator that launches, collects and judges workers.

use crate::error::{CoordinatorError, LaunchError};
use crate::hash::TargetDigest;
use crate::report::{decide, Reporter, Verdict};
use crate::search::codec::IndexCodec;
use crate::search::config::SearchSpec;
use crate::search::parallel::collector::{collect_all_with, CompletionReport};
use crate::search::parallel::config::{ParallelConfig, RuntimeKind};
use crate::search::parallel::launcher::{ProcessRuntime, ThreadRuntime, WorkerRuntime};
use crate::search::partition::assign;
use crate::search::result::{ResultChannel, RunStatistics};
use crate::search::worker::WorkerJob;
use std::io::Write;
use std::time::Instant;
use tracing::{error, info, warn};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct SearchOutcome {
    pub verdict: Verdict,
    pub report: CompletionReport,
    pub statistics: RunStatistics,
    /// Workers that could not be started.
    pub launch_errors: Vec<LaunchError>,
}

impl SearchOutcome {
    pub fn had_launch_failures(&self) -> bool {
        !self.launch_errors.is_empty()
    }
}

/// Run a search with the runtime selected in `config`.
pub fn run_parallel_search<W: Write>(
    spec: &SearchSpec,
    target: &TargetDigest,
    config: &ParallelConfig,
    reporter: &mut Reporter<W>,
) -> Result<SearchOutcome, CoordinatorError> {
    let mut runtime: Box<dyn WorkerRuntime> = match &config.runtime {
        RuntimeKind::Process { program } => Box::new(ProcessRuntime::new(program)),
        RuntimeKind::InProcess => Box::new(ThreadRuntime::new()),
    };
    run_search_with(spec, target, config, runtime.as_mut(), reporter)
}

/// Run a search on the given runtime.
///
/// All workers are launched before any is waited on. A worker that fails to
/// launch does not stop the run: the others are still collected and the
/// verdict reflects the missing coverage.
pub fn run_search_with<R, W>(
    spec: &SearchSpec,
    target: &TargetDigest,
    config: &ParallelConfig,
    runtime: &mut R,
    reporter: &mut Reporter<W>,
) -> Result<SearchOutcome, CoordinatorError>
where
    R: WorkerRuntime + ?Sized,
    W: Write,
{
    let channel = ResultChannel::new(&config.result_path);
    channel
        .clear()
        .map_err(|source| CoordinatorError::ResultChannel {
            path: config.result_path.clone(),
            source,
        })?;

    reporter.banner(spec, target);
    let codec = IndexCodec::new(spec);
    let start_time = Instant::now();

    let mut handles = Vec::with_capacity(spec.worker_count());
    let mut report = CompletionReport::default();
    let mut launch_errors = Vec::new();

    for assignment in assign(spec.space_size(), spec.worker_count()) {
        let job = WorkerJob {
            assignment,
            target: target.clone(),
            alphabet: spec.alphabet().to_string(),
            candidate_length: spec.candidate_length(),
            result_path: config.result_path.clone(),
            claim_check_interval: config.claim_check_interval,
        };
        match runtime.launch(&job) {
            Ok(handle) => {
                info!(
                    worker_id = assignment.worker_id,
                    start = assignment.range.start,
                    end = assignment.range.end,
                    "worker launched"
                );
                reporter.worker_started(&handle, &codec);
                handles.push(handle);
            }
            Err(e) => {
                error!(worker_id = assignment.worker_id, error = %e, "worker failed to launch");
                reporter.launch_failed(&e);
                report.record_launch_failure(assignment, e.to_string());
                launch_errors.push(e);
            }
        }
    }

    reporter.all_started(handles.len());
    let report = collect_all_with(runtime, &handles, report, |outcome| {
        reporter.worker_finished(outcome)
    });
    reporter.collection_done(&report);

    let found = match channel.try_read() {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, path = %config.result_path.display(), "result artifact unreadable, treating as not found");
            reporter.result_unreadable(&e);
            None
        }
    };

    let verdict = decide(&report, found.as_ref(), target);
    let statistics = RunStatistics {
        elapsed_time: start_time.elapsed(),
        space_size: spec.space_size(),
        candidates_covered: report.candidates_covered(),
        workers_launched: handles.len(),
        workers_succeeded: report.succeeded(),
    };

    match &verdict {
        Verdict::Inconsistent(e) => error!(error = %e, "integrity check failed"),
        other => info!(verdict = %other, "search finished"),
    }
    reporter.verdict(&verdict, &statistics);

    Ok(SearchOutcome {
        verdict,
        report,
        statistics,
        launch_errors,
    })
}

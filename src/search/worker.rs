//! Worker side of the search: scan one index range for the target preimage.

use crate::error::{ConfigError, WorkerError};
use crate::hash::TargetDigest;
use crate::search::codec::IndexCodec;
use crate::search::config::{Alphabet, MAX_CANDIDATE_LEN};
use crate::search::partition::{IndexRange, WorkerAssignment};
use crate::search::result::{FoundResult, ResultChannel};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How many candidates a worker checks between looks at the result artifact.
pub const DEFAULT_CLAIM_CHECK_INTERVAL: u64 = 4096;

/// Everything a worker is launched with. Workers get their own copy.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub assignment: WorkerAssignment,
    pub target: TargetDigest,
    pub alphabet: String,
    pub candidate_length: usize,
    pub result_path: PathBuf,
    pub claim_check_interval: u64,
}

/// What a worker did with its range.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub candidates_checked: u64,
    /// The matching candidate, if this worker found one
    pub found: Option<String>,
    /// Whether this worker's write to the result artifact was the first
    pub published: bool,
    /// Whether the scan ended because another worker had already published
    pub stopped_early: bool,
    pub elapsed_time: Duration,
}

impl ScanSummary {
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.candidates_checked as f64 / secs
        }
    }
}

/// Scan the job's range, publishing the first match to the result artifact.
pub fn scan_range(job: &WorkerJob) -> Result<ScanSummary, WorkerError> {
    let start_time = Instant::now();
    let worker_id = job.assignment.worker_id;
    let range = job.assignment.range;

    if !(1..=MAX_CANDIDATE_LEN).contains(&job.candidate_length) {
        return Err(ConfigError::LengthOutOfRange {
            length: job.candidate_length,
            max: MAX_CANDIDATE_LEN,
        }
        .into());
    }
    let codec = IndexCodec::from_parts(Alphabet::new(&job.alphabet)?, job.candidate_length)?;
    check_range(range, codec.space_size())?;

    let channel = ResultChannel::new(&job.result_path);
    let interval = job.claim_check_interval.max(1);
    let mut summary = ScanSummary::default();

    debug!(worker_id, start = range.start, end = range.end, "scanning range");

    for candidate in codec.candidates(range)? {
        if summary.candidates_checked % interval == 0 && channel.is_claimed() {
            info!(worker_id, "another worker already published a result, stopping");
            summary.stopped_early = true;
            break;
        }
        summary.candidates_checked += 1;

        if job.target.matches(&candidate) {
            let found = FoundResult {
                worker_id,
                candidate: candidate.clone(),
            };
            summary.published = channel.publish(&found).map_err(WorkerError::Publish)?;
            info!(worker_id, candidate = %candidate, published = summary.published, "match found");
            summary.found = Some(candidate);
            break;
        }
    }

    summary.elapsed_time = start_time.elapsed();
    Ok(summary)
}

fn check_range(range: IndexRange, space: u64) -> Result<(), ConfigError> {
    if range.start > range.end || range.end > space {
        return Err(ConfigError::RangeOutsideSpace {
            start: range.start,
            end: range.end,
            space,
        });
    }
    Ok(())
}

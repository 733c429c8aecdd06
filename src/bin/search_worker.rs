use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use preimage_search::error::WorkerError;
use preimage_search::logging;
use preimage_search::search::partition::{IndexRange, WorkerAssignment};
use preimage_search::search::worker::{scan_range, WorkerJob, DEFAULT_CLAIM_CHECK_INTERVAL};
use preimage_search::TargetDigest;

/// Scan one index range of the search space for an MD5 preimage.
///
/// Exits 0 once the range is done (match or not), 1 on any internal error.
#[derive(Parser)]
#[command(name = "search-worker")]
#[command(version)]
struct Args {
    /// Path of the shared result artifact
    #[arg(long)]
    result_file: PathBuf,
    /// Candidates to check between looks at the result artifact
    #[arg(long, default_value_t = DEFAULT_CLAIM_CHECK_INTERVAL)]
    claim_check_interval: u64,
    /// Enable verbose diagnostics on stderr
    #[arg(long, short)]
    verbose: bool,

    /// Worker id reported with a match
    worker_id: usize,
    /// First index of the range (inclusive)
    start: u64,
    /// End of the range (exclusive)
    end: u64,
    /// Length of every candidate string
    candidate_length: usize,
    /// Symbols candidates are built from, in enumeration order
    #[arg(allow_hyphen_values = true)]
    alphabet: String,
    /// Target MD5 digest (32 hex characters)
    target_digest: String,
}

fn run(args: Args) -> Result<(), WorkerError> {
    let job = WorkerJob {
        assignment: WorkerAssignment {
            worker_id: args.worker_id,
            range: IndexRange {
                start: args.start,
                end: args.end,
            },
        },
        target: TargetDigest::parse(&args.target_digest)?,
        alphabet: args.alphabet,
        candidate_length: args.candidate_length,
        result_path: args.result_file,
        claim_check_interval: args.claim_check_interval,
    };

    let summary = scan_range(&job)?;
    info!(
        worker_id = job.assignment.worker_id,
        checked = summary.candidates_checked,
        elapsed = ?summary.elapsed_time,
        candidates_per_sec = summary.throughput(),
        found = summary.found.is_some(),
        stopped_early = summary.stopped_early,
        "range finished"
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);
    let worker_id = args.worker_id;

    if let Err(e) = run(args) {
        error!(worker_id, error = %e, "worker failed");
        eprintln!("[worker {}] Error: {}", worker_id, e);
        std::process::exit(1);
    }
}

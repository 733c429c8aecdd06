use clap::Parser;
use std::io;
use std::path::PathBuf;

use preimage_search::error::CoordinatorError;
use preimage_search::logging;
use preimage_search::report::{Reporter, Verdict};
use preimage_search::search::config::SearchSpec;
use preimage_search::search::parallel::config::suggested_worker_count;
use preimage_search::search::parallel::{run_parallel_search, ParallelConfig, SearchOutcome};
use preimage_search::search::result::DEFAULT_RESULT_FILE;
use preimage_search::search::worker::DEFAULT_CLAIM_CHECK_INTERVAL;
use preimage_search::TargetDigest;

/// A verdict was produced.
const EXIT_OK: i32 = 0;
/// Bad parameters, unusable result artifact, or a worker that never started.
const EXIT_FAILURE: i32 = 1;
/// A worker published a candidate that does not hash to the target.
const EXIT_INTEGRITY: i32 = 3;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "coordinator")]
#[command(about = "Parallel MD5 preimage search over fixed-length strings")]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(after_help = "WORKER_COUNT may be omitted, in which case it defaults to the CPU count (capped at 16).")]
struct Args {
    /// Target MD5 digest (32 hex characters)
    target_digest: String,
    /// Length of every candidate string
    candidate_length: usize,
    /// Symbols candidates are built from, in enumeration order
    #[arg(allow_hyphen_values = true)]
    alphabet: String,
    /// Number of workers; defaults to the CPU count (capped at 16) when omitted
    worker_count: Option<usize>,

    /// Path of the shared result artifact
    #[arg(long, default_value = DEFAULT_RESULT_FILE)]
    result_file: PathBuf,
    /// Worker executable (defaults to search-worker next to this binary)
    #[arg(long, conflicts_with = "in_process")]
    worker_bin: Option<PathBuf>,
    /// Run workers as threads of this process instead of separate processes
    #[arg(long)]
    in_process: bool,
    /// Candidates a worker checks between looks at the result artifact
    #[arg(long, default_value_t = DEFAULT_CLAIM_CHECK_INTERVAL)]
    claim_check_interval: u64,
    /// Enable verbose diagnostics on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parallel_config(args: &Args) -> ParallelConfig {
    let config = ParallelConfig::default()
        .with_result_path(&args.result_file)
        .with_claim_check_interval(args.claim_check_interval);
    if args.in_process {
        config.in_process()
    } else if let Some(program) = &args.worker_bin {
        config.with_worker_program(program)
    } else {
        config
    }
}

fn exit_code(outcome: &SearchOutcome) -> i32 {
    if outcome.verdict.is_integrity_error() {
        EXIT_INTEGRITY
    } else if outcome.had_launch_failures() {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}

fn run(args: &Args) -> Result<i32, CoordinatorError> {
    let target = TargetDigest::parse(&args.target_digest)?;
    let worker_count = args.worker_count.unwrap_or_else(suggested_worker_count);
    let spec = SearchSpec::new(&args.alphabet, args.candidate_length, worker_count)?;
    let config = parallel_config(args);

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let outcome = run_parallel_search(&spec, &target, &config, &mut reporter)?;

    if let Verdict::Inconsistent(e) = &outcome.verdict {
        eprintln!("Error: {}", e);
    }
    for e in &outcome.launch_errors {
        eprintln!("Error: {}", e);
    }
    Ok(exit_code(&outcome))
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

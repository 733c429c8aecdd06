//! Parallel search execution across independent workers.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **coordinator** that partitions the space, launches one worker per
//!   range, and decides the verdict once every worker has ended
//! - A **launcher** with two runtimes: OS processes running `search-worker`,
//!   or threads running the same scan loop in-process
//! - An **exit channel** through which runtimes report terminal states
//! - A **collector** that maps those exits back to worker ids
//!
//! Workers never talk to each other or to the coordinator. The only shared
//! state is the result artifact, which the coordinator reads after
//! collection and always re-verifies. There is no timeout or cancellation:
//! once launched, a worker runs until its range is done.
//!
//! # Example
//!
//! ```ignore
//! use preimage_search::search::parallel::{ParallelConfig, run_parallel_search};
//!
//! let config = ParallelConfig::default()
//!     .with_worker_program("./target/release/search-worker")
//!     .with_result_path("found.txt");
//!
//! let outcome = run_parallel_search(&spec, &target, &config, &mut reporter)?;
//! ```

pub mod channel;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod launcher;

pub use channel::{ExitClassification, ExitEvent, HandleId};
pub use collector::{collect_all, collect_all_with, CompletionReport, WorkerOutcome};
pub use config::{ParallelConfig, RuntimeKind};
pub use coordinator::{run_parallel_search, run_search_with, SearchOutcome};
pub use launcher::{ProcessRuntime, ThreadRuntime, WorkerHandle, WorkerRuntime};

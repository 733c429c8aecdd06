//! Enumerating and searching a fixed-length string space
//!
//! - `config`: validated search parameters and their limits
//! - `codec`: index <-> candidate mapping
//! - `partition`: splitting the space into per-worker ranges
//! - `result`: the shared result artifact and run statistics
//! - `worker`: the scan loop each worker runs over its range
//! - `parallel`: launching workers, collecting them, and running a search

pub mod codec;
pub mod config;
pub mod parallel;
pub mod partition;
pub mod result;
pub mod worker;

pub use codec::IndexCodec;
pub use config::{Alphabet, SearchSpec, MAX_CANDIDATE_LEN, MAX_WORKERS};
pub use partition::{assign, partition, IndexRange, WorkerAssignment};
pub use result::{FoundResult, ResultChannel, RunStatistics};
pub use worker::{scan_range, ScanSummary, WorkerJob};

//! Configuration for parallel search execution.

use crate::search::config::MAX_WORKERS;
use crate::search::result::DEFAULT_RESULT_FILE;
use crate::search::worker::DEFAULT_CLAIM_CHECK_INTERVAL;
use std::path::PathBuf;

/// Name of the worker executable installed next to the coordinator.
pub const WORKER_BIN_NAME: &str = "search-worker";

/// How workers are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeKind {
    /// One OS process per worker, started from the given executable.
    Process { program: PathBuf },
    /// One thread per worker inside the coordinator.
    InProcess,
}

/// Configuration for parallel search execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Where workers run.
    pub runtime: RuntimeKind,
    /// Path of the shared result artifact.
    pub result_path: PathBuf,
    /// Candidates a worker checks between looks at the result artifact.
    pub claim_check_interval: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeKind::Process {
                program: default_worker_program(),
            },
            result_path: PathBuf::from(DEFAULT_RESULT_FILE),
            claim_check_interval: DEFAULT_CLAIM_CHECK_INTERVAL,
        }
    }
}

impl ParallelConfig {
    /// Run workers as OS processes started from `program`.
    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.runtime = RuntimeKind::Process {
            program: program.into(),
        };
        self
    }

    /// Run workers as threads of the current process.
    pub fn in_process(mut self) -> Self {
        self.runtime = RuntimeKind::InProcess;
        self
    }

    pub fn with_result_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.result_path = path.into();
        self
    }

    pub fn with_claim_check_interval(mut self, interval: u64) -> Self {
        self.claim_check_interval = interval.max(1);
        self
    }
}

/// `search-worker` in the directory of the running executable.
pub fn default_worker_program() -> PathBuf {
    let name = format!("{}{}", WORKER_BIN_NAME, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// A worker count suited to this machine, within the accepted bounds.
pub fn suggested_worker_count() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}

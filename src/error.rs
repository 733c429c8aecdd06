//! Error types shared by the coordinator and the worker.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected search parameters. Always raised before any worker is launched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alphabet must not be empty")]
    EmptyAlphabet,

    #[error("alphabet contains '{0}' more than once")]
    DuplicateSymbol(char),

    #[error("alphabet contains line break {0:?}, which the result artifact cannot carry")]
    LineBreakSymbol(char),

    #[error("candidate length must be between 1 and {max} (got {length})")]
    LengthOutOfRange { length: usize, max: usize },

    #[error("worker count must be between 1 and {max} (got {workers})")]
    WorkersOutOfRange { workers: usize, max: usize },

    #[error("search space {alphabet_len}^{length} does not fit in 64 bits")]
    SpaceOverflow { alphabet_len: usize, length: usize },

    #[error("invalid target digest '{0}': expected 32 hexadecimal characters")]
    InvalidDigest(String),

    #[error("range [{start}, {end}) is not inside the search space of {space} candidates")]
    RangeOutsideSpace { start: u64, end: u64, space: u64 },
}

/// Misuse of the index/candidate mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("index {index} is outside the search space of {space} candidates")]
    IndexOutOfRange { index: u64, space: u64 },

    #[error("candidate has {found} symbols, expected {expected}")]
    WrongLength { expected: usize, found: usize },

    #[error("symbol '{0}' is not part of the alphabet")]
    UnknownSymbol(char),
}

/// A worker could not be started at all.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to spawn worker {worker_id} from {}: {source}", program.display())]
    Spawn {
        worker_id: usize,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start the supervising thread for worker {worker_id}: {source}")]
    Supervisor {
        worker_id: usize,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub fn worker_id(&self) -> usize {
        match self {
            LaunchError::Spawn { worker_id, .. } | LaunchError::Supervisor { worker_id, .. } => {
                *worker_id
            }
        }
    }
}

/// The result artifact exists but its content is unusable.
#[derive(Error, Debug)]
pub enum ResultParseError {
    #[error("failed to read result artifact: {0}")]
    Io(#[from] io::Error),

    #[error("result artifact is truncated: {0:?}")]
    Truncated(String),

    #[error("result artifact is malformed: {0:?}")]
    Malformed(String),

    #[error("candidate in result artifact is {0} bytes, limit is 127")]
    CandidateTooLong(usize),
}

/// A worker claimed a candidate that does not hash to the target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("worker {worker_id} claimed '{candidate}' but its digest {actual} does not match {expected}")]
pub struct IntegrityError {
    pub worker_id: usize,
    pub candidate: String,
    pub expected: String,
    pub actual: String,
}

/// Internal failures of a worker. Any of these makes the worker exit nonzero.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to publish result: {0}")]
    Publish(#[source] io::Error),
}

/// Fatal coordinator failures that prevent a run from starting.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to clear result artifact {}: {source}", path.display())]
    ResultChannel {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

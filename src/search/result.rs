//! Result artifact shared by workers and run statistics

use crate::error::ResultParseError;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Longest candidate the artifact format carries.
pub const MAX_RESULT_CANDIDATE_BYTES: usize = 127;

/// Default location of the result artifact.
pub const DEFAULT_RESULT_FILE: &str = "password_found.txt";

/// A match published by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundResult {
    pub worker_id: usize,
    pub candidate: String,
}

impl fmt::Display for FoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.worker_id, self.candidate)
    }
}

impl FromStr for FoundResult {
    type Err = ResultParseError;

    /// Parse one `<worker_id>:<candidate>` record.
    ///
    /// Only the single terminating `\n` is stripped, so every other byte of
    /// the candidate is kept for verification.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.strip_suffix('\n').unwrap_or(s);
        let (id, candidate) = line
            .split_once(':')
            .ok_or_else(|| ResultParseError::Truncated(line.to_string()))?;
        let worker_id = id
            .trim()
            .parse::<usize>()
            .map_err(|_| ResultParseError::Malformed(line.to_string()))?;
        if candidate.is_empty() {
            return Err(ResultParseError::Truncated(line.to_string()));
        }
        if candidate.len() > MAX_RESULT_CANDIDATE_BYTES {
            return Err(ResultParseError::CandidateTooLong(candidate.len()));
        }
        Ok(Self {
            worker_id,
            candidate: candidate.to_string(),
        })
    }
}

/// File-backed, first-writer-wins channel for a found candidate.
///
/// Workers call [`publish`](Self::publish); the coordinator clears it before a
/// run and reads it once every worker has exited.
#[derive(Debug, Clone)]
pub struct ResultChannel {
    path: PathBuf,
}

impl ResultChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove any artifact left by a previous run.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Write `found` unless another worker already did.
    ///
    /// Returns `Ok(false)` when the artifact was already claimed.
    pub fn publish(&self, found: &FoundResult) -> io::Result<bool> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e),
        };
        file.write_all(format!("{}\n", found).as_bytes())?;
        file.sync_all()?;
        Ok(true)
    }

    /// Whether some worker has already created the artifact.
    pub fn is_claimed(&self) -> bool {
        self.path.exists()
    }

    /// Read the published result, if any.
    ///
    /// A missing or empty artifact is `Ok(None)`. Content that does not parse
    /// is an error the caller is expected to report and then ignore.
    pub fn try_read(&self) -> Result<Option<FoundResult>, ResultParseError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content = String::from_utf8_lossy(&bytes);
        if content.trim().is_empty() {
            return Ok(None);
        }
        content.parse().map(Some)
    }
}

/// Aggregate numbers for one coordinator run.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Wall time from first launch to verdict
    pub elapsed_time: Duration,
    /// Size of the whole search space
    pub space_size: u64,
    /// Candidates owned by workers that completed normally
    pub candidates_covered: u64,
    /// Workers launched
    pub workers_launched: usize,
    /// Workers that exited normally with status 0
    pub workers_succeeded: usize,
}

impl RunStatistics {
    /// Covered candidates per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.candidates_covered as f64 / secs
        }
    }

    /// Fraction of the search space owned by successful workers (0.0 to 1.0)
    pub fn coverage(&self) -> f64 {
        if self.space_size == 0 {
            1.0
        } else {
            self.candidates_covered as f64 / self.space_size as f64
        }
    }

    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!(
            "Workers: {}/{} completed normally\n",
            self.workers_succeeded, self.workers_launched
        ));
        s.push_str(&format!(
            "Coverage: {} of {} candidates ({:.2}%)\n",
            self.candidates_covered,
            self.space_size,
            self.coverage() * 100.0
        ));
        if self.throughput() > 0.0 {
            s.push_str(&format!("Throughput: {:.0} candidates/sec\n", self.throughput()));
        }
        s
    }
}

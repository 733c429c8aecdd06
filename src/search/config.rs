//! Search parameters and their limits

use crate::error::ConfigError;
use std::collections::HashSet;
use std::fmt;

/// Longest candidate the coordinator accepts.
pub const MAX_CANDIDATE_LEN: usize = 10;
/// Largest worker pool the coordinator accepts.
pub const MAX_WORKERS: usize = 16;

/// Total number of candidates: `alphabet_len ^ length`.
///
/// Fails instead of wrapping when the result does not fit in a `u64`.
pub fn search_space_size(alphabet_len: usize, length: usize) -> Result<u64, ConfigError> {
    let overflow = || ConfigError::SpaceOverflow {
        alphabet_len,
        length,
    };
    let base = u64::try_from(alphabet_len).map_err(|_| overflow())?;
    let exp = u32::try_from(length).map_err(|_| overflow())?;
    base.checked_pow(exp).ok_or_else(overflow)
}

/// Ordered set of distinct symbols candidates are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet(Vec<char>);

impl Alphabet {
    pub fn new(symbols: &str) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        let mut seen = HashSet::new();
        for c in symbols.chars() {
            if c == '\n' || c == '\r' {
                return Err(ConfigError::LineBreakSymbol(c));
            }
            if !seen.insert(c) {
                return Err(ConfigError::DuplicateSymbol(c));
            }
        }
        Ok(Self(symbols.chars().collect()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.0
    }

    /// Position of `symbol` in the alphabet, which is its digit value.
    pub fn digit_of(&self, symbol: char) -> Option<usize> {
        self.0.iter().position(|&c| c == symbol)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// A validated description of one search: what to enumerate and how many
/// workers share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    alphabet: Alphabet,
    candidate_length: usize,
    worker_count: usize,
    space_size: u64,
}

impl SearchSpec {
    pub fn new(
        alphabet: &str,
        candidate_length: usize,
        worker_count: usize,
    ) -> Result<Self, ConfigError> {
        let alphabet = Alphabet::new(alphabet)?;
        if !(1..=MAX_CANDIDATE_LEN).contains(&candidate_length) {
            return Err(ConfigError::LengthOutOfRange {
                length: candidate_length,
                max: MAX_CANDIDATE_LEN,
            });
        }
        if !(1..=MAX_WORKERS).contains(&worker_count) {
            return Err(ConfigError::WorkersOutOfRange {
                workers: worker_count,
                max: MAX_WORKERS,
            });
        }
        let space_size = search_space_size(alphabet.len(), candidate_length)?;

        Ok(Self {
            alphabet,
            candidate_length,
            worker_count,
            space_size,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn candidate_length(&self) -> usize {
        self.candidate_length
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn space_size(&self) -> u64 {
        self.space_size
    }
}

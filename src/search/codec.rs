//! Mapping between candidate indices and candidate strings
//!
//! An index is read as a number in base `alphabet.len()` with exactly
//! `candidate_length` digits, most significant digit first. Each digit picks
//! the symbol at that position in the alphabet, so index 0 is the first symbol
//! repeated and the last index is the last symbol repeated.

use crate::error::{CodecError, ConfigError};
use crate::search::config::{search_space_size, Alphabet, SearchSpec};
use crate::search::partition::IndexRange;

#[derive(Debug, Clone)]
pub struct IndexCodec {
    alphabet: Alphabet,
    length: usize,
    space_size: u64,
}

impl IndexCodec {
    pub fn new(spec: &SearchSpec) -> Self {
        Self {
            alphabet: spec.alphabet().clone(),
            length: spec.candidate_length(),
            space_size: spec.space_size(),
        }
    }

    /// Build a codec without a worker count, as the worker does.
    pub fn from_parts(alphabet: Alphabet, length: usize) -> Result<Self, ConfigError> {
        let space_size = search_space_size(alphabet.len(), length)?;
        Ok(Self {
            alphabet,
            length,
            space_size,
        })
    }

    pub fn space_size(&self) -> u64 {
        self.space_size
    }

    pub fn encode(&self, index: u64) -> Result<String, CodecError> {
        if index >= self.space_size {
            return Err(CodecError::IndexOutOfRange {
                index,
                space: self.space_size,
            });
        }
        let symbols = self.alphabet.symbols();
        Ok(self
            .digits_of(index)
            .into_iter()
            .map(|d| symbols[d])
            .collect())
    }

    /// Encode an index for display only.
    ///
    /// Indices at or past the end of the space, such as the exclusive end of
    /// the last range, render as the last candidate. Never feed the result to
    /// a worker.
    pub fn encode_for_display(&self, index: u64) -> String {
        let clamped = index.min(self.space_size.saturating_sub(1));
        let symbols = self.alphabet.symbols();
        self.digits_of(clamped)
            .into_iter()
            .map(|d| symbols[d])
            .collect()
    }

    pub fn decode(&self, candidate: &str) -> Result<u64, CodecError> {
        let found = candidate.chars().count();
        if found != self.length {
            return Err(CodecError::WrongLength {
                expected: self.length,
                found,
            });
        }
        let base = self.alphabet.len() as u64;
        let mut index = 0u64;
        for c in candidate.chars() {
            let digit = self
                .alphabet
                .digit_of(c)
                .ok_or(CodecError::UnknownSymbol(c))?;
            // Cannot overflow: a string of valid length decodes below space_size.
            index = index * base + digit as u64;
        }
        Ok(index)
    }

    /// Iterate the candidates of `range` in index order.
    pub fn candidates(&self, range: IndexRange) -> Result<Candidates<'_>, CodecError> {
        if range.end > self.space_size {
            return Err(CodecError::IndexOutOfRange {
                index: range.end,
                space: self.space_size,
            });
        }
        let digits = if range.is_empty() {
            vec![0; self.length]
        } else {
            self.digits_of(range.start)
        };
        Ok(Candidates {
            symbols: self.alphabet.symbols(),
            digits,
            remaining: range.len(),
        })
    }

    fn digits_of(&self, mut index: u64) -> Vec<usize> {
        let base = self.alphabet.len() as u64;
        let mut digits = vec![0usize; self.length];
        for slot in digits.iter_mut().rev() {
            *slot = (index % base) as usize;
            index /= base;
        }
        digits
    }
}

/// Odometer over a contiguous run of candidates.
pub struct Candidates<'a> {
    symbols: &'a [char],
    digits: Vec<usize>,
    remaining: u64,
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        let current: String = self.digits.iter().map(|&d| self.symbols[d]).collect();
        self.remaining -= 1;

        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.symbols.len() {
                break;
            }
            *digit = 0;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

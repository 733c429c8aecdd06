//! MD5 digest helpers.
//!
//! The digest primitive itself comes from the `md-5` crate; this module only
//! fixes the hex encoding and the comparison against a user supplied target.

use crate::error::ConfigError;
use md5::{Digest, Md5};
use std::fmt;

/// Length of an MD5 digest rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 32;

/// Render digest bytes as lowercase hex.
pub fn digest_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a candidate and return its digest as lowercase hex.
pub fn md5_hex(candidate: &str) -> String {
    digest_to_hex(&Md5::digest(candidate.as_bytes()))
}

/// A validated, lowercase hex target digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDigest(String);

impl TargetDigest {
    pub fn parse(hex: &str) -> Result<Self, ConfigError> {
        let trimmed = hex.trim();
        if trimmed.len() != DIGEST_HEX_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidDigest(hex.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hash `candidate` and compare against this target.
    pub fn matches(&self, candidate: &str) -> bool {
        md5_hex(candidate) == self.0
    }
}

impl fmt::Display for TargetDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TargetDigest {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetDigest::parse(s)
    }
}

//! Split a fixed-length string search space across a pool of workers and look
//! for an MD5 preimage.

pub mod error;
pub mod hash;
pub mod logging;
pub mod report;
pub mod search;

pub use error::*;
pub use hash::{md5_hex, TargetDigest};
pub use report::{Reporter, Verdict};

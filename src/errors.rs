//! Errors raised by the compression and decompression pipelines.
//!
//! Per the propagation policy, every variant here is fatal and terminates
//! the current pass: a null/zero argument, an out-of-range sampling
//! factor, a pass mode that isn't `PASS_THRU`, a DCT size other than 8, a
//! missing quantization table, or a request for a feature this narrow
//! profile does not support. Suspension (the entropy coder's sink being
//! full) and `OutputBufferFull` are never represented here -- they are
//! return-value states, see [`crate::progress::Progress`] and
//! [`crate::api::CompressStatus`].
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub enum JscError {
    /// A precondition failed.
    InvariantViolation(String),
    /// A feature this profile deliberately never supports: progressive or
    /// arithmetic-coded scans, 12-bit samples, context-row upsampling,
    /// virtual arrays.
    Unsupported(&'static str),
}

impl Debug for JscError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvariantViolation(reason) => write!(f, "invariant violation: {}", reason),
            Self::Unsupported(reason) => write!(f, "unsupported: {}", reason),
        }
    }
}

impl Display for JscError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for JscError {}

impl JscError {
    #[must_use]
    pub fn invariant<S: Into<String>>(reason: S) -> Self {
        Self::InvariantViolation(reason.into())
    }
}

pub type JscResult<T> = Result<T, JscError>;

//! Error taxonomy for rope operations

use thiserror::Error;

/// Failures surfaced synchronously by rope operations
///
/// Ropes are immutable, so a failed call never leaves any existing rope in a
/// partially edited state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RopeError {
    /// An element index or split point outside the rope
    #[error("index {index} is out of range for a rope of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A `start..start+len` range that does not fit inside the rope
    #[error("range {start}..{start}+{len} is out of bounds for a rope of length {rope_len}")]
    RangeOutOfBounds {
        start: usize,
        len: usize,
        rope_len: usize,
    },

    /// A byte rope that does not hold valid UTF-8
    #[error("rope does not contain valid UTF-8")]
    InvalidUtf8,

    /// A configuration document that could not be parsed
    #[error("invalid rope configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RopeError>;

impl RopeError {
    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(RopeError::IndexOutOfRange { index, len })
        }
    }

    pub(crate) fn check_split(index: usize, len: usize) -> Result<()> {
        if index <= len {
            Ok(())
        } else {
            Err(RopeError::IndexOutOfRange { index, len })
        }
    }

    pub(crate) fn check_range(start: usize, len: usize, rope_len: usize) -> Result<()> {
        match start.checked_add(len) {
            Some(end) if end <= rope_len => Ok(()),
            _ => Err(RopeError::RangeOutOfBounds {
                start,
                len,
                rope_len,
            }),
        }
    }
}

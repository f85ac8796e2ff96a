//! Error types for wipkit-common.

use thiserror::Error;

/// Common error type for wipkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl Error {
    /// The absolute byte offset the error refers to, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof { offset, .. } => Some(*offset),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

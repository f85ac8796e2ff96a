//! Error types for rich-text stripping.

use thiserror::Error;

/// Errors raised when an annotation does not parse as rich-text markup.
///
/// Offsets are relative to the start of the annotation blob.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The blob does not start with the `{\rtf` signature.
    #[error("missing rich-text signature: expected '{{\\rtf', got {actual:?}")]
    MissingSignature { actual: Vec<u8> },

    /// A closing brace with no open group.
    #[error("unbalanced closing brace at offset {offset}")]
    UnbalancedGroup { offset: usize },

    /// Input ended while groups were still open.
    #[error("{depth} group(s) left open at end of input")]
    UnclosedGroup { depth: usize },

    /// A backslash at the very end of the input.
    #[error("dangling escape at offset {offset}")]
    DanglingEscape { offset: usize },

    /// `\'` not followed by two hex digits.
    #[error("invalid hex escape at offset {offset}")]
    InvalidHex { offset: usize },

    /// A control word parameter that does not fit the format's range.
    #[error("control word parameter out of range at offset {offset}")]
    InvalidParameter { offset: usize },
}

impl Error {
    /// The byte offset the error refers to, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnbalancedGroup { offset }
            | Self::DanglingEscape { offset }
            | Self::InvalidHex { offset }
            | Self::InvalidParameter { offset } => Some(*offset),
            Self::MissingSignature { .. } => Some(0),
            Self::UnclosedGroup { .. } => None,
        }
    }
}

/// Result type for rich-text operations.
pub type Result<T> = std::result::Result<T, Error>;

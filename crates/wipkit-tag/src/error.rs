//! Error types for tag-tree decoding.

use thiserror::Error;

use crate::TagType;

/// Errors that can occur when decoding a project file or looking up a tag.
///
/// Every decoding variant carries the absolute file offset at which decoding
/// failed. Decoding errors are fatal: no partial tree is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is too short to hold the file type identifier.
    #[error("file too short for the {expected}-byte file type header: {actual} bytes")]
    InvalidHeader { expected: usize, actual: usize },

    /// Fewer bytes remain than a field declares.
    #[error("truncated buffer at offset {offset}: needed {needed} bytes but only {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A record whose end precedes its start.
    #[error("malformed record at offset {offset}: end {end} precedes start {start}")]
    MalformedRecord { offset: usize, start: u64, end: u64 },

    /// A type code outside the known table.
    #[error("unknown type code {code} at offset {offset}")]
    UnknownTypeCode { offset: usize, code: u32 },

    /// A payload whose size is not a multiple of its element width.
    #[error("{tag_type} payload at offset {offset}: {size} bytes is not a multiple of {width}")]
    SizeMismatch {
        offset: usize,
        tag_type: TagType,
        size: usize,
        width: usize,
    },

    /// Leftover bytes too short to form a record.
    #[error("{remaining} trailing bytes at offset {offset} are too short for a record")]
    TrailingGarbage { offset: usize, remaining: usize },

    /// Containers nested deeper than the configured limit.
    #[error("container at offset {offset} nests {depth} levels deep")]
    NestingTooDeep { offset: usize, depth: usize },

    /// A lookup path that does not exist in the tree.
    #[error("missing tag path: {path}")]
    MissingPath { path: String },

    /// A lookup path that exists but holds a different kind of value.
    #[error("tag {path} holds {actual}, expected {expected}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// An annotation that could not be stripped on demand.
    #[error("malformed rich text: {0}")]
    RichText(#[from] wipkit_rtf::Error),
}

impl Error {
    /// The absolute byte offset at which decoding failed, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedBuffer { offset, .. }
            | Self::MalformedRecord { offset, .. }
            | Self::UnknownTypeCode { offset, .. }
            | Self::SizeMismatch { offset, .. }
            | Self::TrailingGarbage { offset, .. }
            | Self::NestingTooDeep { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl From<wipkit_common::Error> for Error {
    fn from(err: wipkit_common::Error) -> Self {
        match err {
            wipkit_common::Error::UnexpectedEof {
                offset,
                needed,
                available,
            } => Self::TruncatedBuffer {
                offset,
                needed,
                available,
            },
        }
    }
}

/// Result type for tag-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

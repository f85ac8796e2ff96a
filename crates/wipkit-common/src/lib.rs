//! Common utilities for wipkit.
//!
//! This crate provides foundational types used across the wipkit crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices,
//!   with errors that report absolute file offsets
//! - [`codepage`] - Windows-1252 decoding for names and strings stored in
//!   project files

mod error;
mod reader;

pub mod codepage;

pub use error::{Error, Result};
pub use reader::BinaryReader;

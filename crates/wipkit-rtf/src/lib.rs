//! Rich-text markup stripper for WITec Project annotations.
//!
//! The free-text "Information" field of every acquisition is stored as a
//! rich-text document padded with a NUL byte. This crate turns it back into
//! plain text: destination groups (font and color tables, generator tags,
//! pictures) are dropped, control words that stand for characters are
//! expanded, and escapes are unescaped.
//!
//! # Example
//!
//! ```
//! use wipkit_rtf::strip_annotation;
//!
//! let blob = b"{\\rtf1\\ansi{\\fonttbl{\\f0 Arial;}}\\f0 Points per Line:\\tab 150\\par}\0";
//! let annotation = strip_annotation(blob)?;
//! assert_eq!(annotation.text, "Points per Line:\t150\n");
//! # Ok::<(), wipkit_rtf::Error>(())
//! ```

mod error;
mod lexer;
mod strip;

pub use error::{Error, Result};
pub use strip::{is_rich_text, strip, strip_annotation, Annotation, SIGNATURE};

//! Wipkit - WITec Project file decoding library.
//!
//! This crate provides a unified interface to the wipkit crates for reading
//! the binary project files written by WITec confocal Raman instruments.
//!
//! # Crates
//!
//! - [`wipkit_common`] - Common utilities (binary reading, Windows-1252)
//! - [`wipkit_rtf`] - Rich-text stripping for acquisition annotations
//! - [`wipkit_tag`] - Tag-tree decoding, project access and annotation fields
//!
//! # Example
//!
//! ```no_run
//! use wipkit::prelude::*;
//!
//! // Open a project
//! let project = Project::open("sample.wip")?;
//!
//! // Annotation fields of every acquisition
//! for (entry, fields) in project.metadata()? {
//!     println!("{}: {:?}", entry, fields.get("Information"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use wipkit_common as common;
pub use wipkit_rtf as rtf;
pub use wipkit_tag as tag;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use wipkit_common::BinaryReader;
    pub use wipkit_rtf::{strip, strip_annotation};
    pub use wipkit_tag::{
        parse_annotation, DecodeOptions, Diagnostic, DiagnosticSink, NumericArray, NumericMode,
        Project, TagTree, TagValue, TracingSink,
    };
}

// Re-export commonly used types at the crate root
pub use wipkit_tag::Project;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

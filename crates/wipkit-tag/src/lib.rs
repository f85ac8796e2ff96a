//! Tag-tree decoder for WITec Project (`.wip`) files.
//!
//! A project file is an 8-byte file type identifier followed by a stream of
//! self-describing tag records. Containers nest further streams, so the whole
//! file decodes into a [`TagTree`] of named values: numeric arrays, strings
//! and subtrees.
//!
//! # Example
//!
//! ```no_run
//! use wipkit_tag::Project;
//!
//! let project = Project::open("sample.wip")?;
//! for (name, entry) in project.data()? {
//!     println!("{}: {}", name, entry);
//! }
//! println!("{}", project.info_by_number(1)?);
//! # Ok::<(), wipkit_tag::Error>(())
//! ```
//!
//! Decoding is fatal on structural errors and reports everything else to a
//! [`DiagnosticSink`]:
//!
//! ```
//! use wipkit_tag::{decode_tree, DecodeOptions, Diagnostic, TagWriter};
//!
//! let mut writer = TagWriter::new();
//! writer.u32s(b"Count", &[1]).u32s(b"Count", &[2]);
//!
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! let tree = decode_tree(&writer.finish(), 8, &DecodeOptions::default(), &mut diagnostics)?;
//! assert_eq!(tree.len(), 1);
//! assert_eq!(diagnostics.len(), 1);
//! # Ok::<(), wipkit_tag::Error>(())
//! ```

mod decode;
mod diagnostics;
mod error;
mod metadata;
mod project;
mod raw;
mod record;
mod types;
mod value;
mod writer;

pub use decode::{
    decode_array, decode_tree, decode_words, DecodeOptions, ANNOTATION_PATH,
    ENTRY_ANNOTATION_PATH, ROOT_TAG,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use error::{Error, Result};
pub use metadata::{parse_annotation, AnnotationFields, INFORMATION_KEY};
pub use project::{annotation_text, Project, FILE_TYPE_LEN};
pub use record::{RecordHeader, TagRecord, MIN_RECORD_LEN};
pub use types::{NumericMode, TagType};
pub use value::{NumericArray, TagTree, TagValue};
pub use writer::{encode_word, write_project, TagWriter};

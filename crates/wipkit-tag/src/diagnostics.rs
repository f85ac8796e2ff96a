//! Non-fatal decoding diagnostics.
//!
//! The decoder never aborts on these conditions. It reports them to a
//! [`DiagnosticSink`] supplied by the caller and carries on.

use std::fmt;

/// What was noticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A sibling with the same name was already present; the later record won.
    NameCollision,
    /// The annotation could not be stripped and was left as raw bytes.
    RichTextFallback(wipkit_rtf::Error),
    /// The annotation did not end with the expected NUL padding byte.
    MissingTerminator,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameCollision => write!(f, "duplicate tag name, previous value replaced"),
            Self::RichTextFallback(err) => {
                write!(f, "annotation left as raw bytes: {}", err)
            }
            Self::MissingTerminator => write!(f, "annotation has no trailing NUL"),
        }
    }
}

/// A diagnostic tied to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Absolute offset of the record.
    pub offset: usize,
    /// Tag name, decoded for display.
    pub name: String,
    /// What was noticed.
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at offset {}: {}", self.name, self.offset, self.kind)
    }
}

/// Receiver for non-fatal diagnostics.
pub trait DiagnosticSink {
    /// Handle one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Discards diagnostics.
impl DiagnosticSink for () {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards diagnostics as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            offset = diagnostic.offset,
            name = %diagnostic.name,
            "{}",
            diagnostic.kind
        );
    }
}

//! Compile-time error reporting for the schema front-end.
//!
//! # Design
//!
//! - `Error`: single diagnostic with kind, message, and optional source location
//! - `ErrorKind`: categorizes errors by compiler phase
//! - `SourceLoc`: line number, column, and line text, derived lazily from a
//!   byte position only when an error is actually constructed
//!
//! A module either compiles completely or fails with the first error; there is
//! no multi-diagnostic collection in this crate.

use crate::foundation::span::{locate, SourceLoc};
use std::fmt;

/// Category of compilation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Syntax error raised by the scanner or parser, anchored to a cursor position.
    Syntax,
    /// A resolution pass could not bind a name, close a generic, or load an import.
    Resolve,
    /// The resolved module violates a structural rule (ordinal holes, annotation targets).
    Validation,
    /// A transient node survived the pipeline. Always a bug, never a user error.
    Internal,
}

/// Human-readable names for error kinds.
const ERROR_KIND_NAMES: &[(ErrorKind, &str)] = &[
    (ErrorKind::Syntax, "syntax error"),
    (ErrorKind::Resolve, "resolve error"),
    (ErrorKind::Validation, "validation error"),
    (ErrorKind::Internal, "internal compiler error"),
];

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, n)| *n)
            .unwrap_or("error")
    }
}

/// Compilation diagnostic.
///
/// Syntax errors carry a [`SourceLoc`] with the offending line's text so the
/// caller can render a caret under the failure position. Resolution and
/// validation errors are descriptive only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// Category of this error
    pub kind: ErrorKind,
    /// Primary error message
    pub message: String,
    /// Source location, present for syntax errors
    pub loc: Option<SourceLoc>,
}

impl Error {
    /// Creates a syntax error anchored at `pos` within `source`.
    ///
    /// Line, column, and line text are computed here, on the error path only.
    pub fn syntax(message: impl Into<String>, source: &str, pos: usize) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            loc: Some(locate(source, pos)),
        }
    }

    /// Creates a resolution error.
    pub fn resolve(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Resolve,
            message: message.into(),
            loc: None,
        }
    }

    /// Creates a structural validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            loc: None,
        }
    }

    /// Creates an internal invariant-violation error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
            loc: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)?;
        if let Some(loc) = &self.loc {
            write!(
                f,
                "\n  --> line {}, column {}\n   | {}\n   | {:>width$}",
                loc.line,
                loc.column,
                loc.line_text,
                "^",
                width = loc.column as usize + 1
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_line_and_column() {
        let source = "struct Foo {\n  bar @0 :Int32\n}\n";
        // Position of the missing ';' (end of the field line).
        let pos = source.find('\n').unwrap() + "  bar @0 :Int32".len();
        let err = Error::syntax("Expected ';'.", source, pos);
        let loc = err.loc.as_ref().unwrap();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.line_text, "  bar @0 :Int32");
        let rendered = err.to_string();
        assert!(rendered.contains("syntax error"));
        assert!(rendered.contains("line 2"));
    }

    #[test]
    fn resolve_error_has_no_location() {
        let err = Error::resolve("unresolved reference 'Foo.Bar'");
        assert_eq!(err.kind, ErrorKind::Resolve);
        assert!(err.loc.is_none());
    }
}

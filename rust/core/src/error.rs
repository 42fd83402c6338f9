// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh file parsing.

use thiserror::Error;

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a parse.
///
/// Per-line data errors in ASCII sections are not represented here; they go
/// to the [`ErrorSink`](crate::diagnostics::ErrorSink) and parsing continues.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `$Name` header that is not part of the grammar.
    #[error("unknown section `${name}` at line {line}")]
    UnknownSection { line: usize, name: String },

    /// Entity data found while no section is open.
    #[error("data outside of any section at line {line}")]
    DataOutsideSection { line: usize },

    /// An entity record could not be decoded.
    #[error("malformed entity at line {line}: {reason}")]
    MalformedEntity { line: usize, reason: String },

    /// The binary stream can no longer be framed.
    #[error("binary stream desynchronized at line {line}: {reason}")]
    BinaryDesync { line: usize, reason: String },

    /// `$MeshFormat` announces something this parser does not read.
    #[error("unsupported mesh format at line {line}: {reason}")]
    UnsupportedFormat { line: usize, reason: String },

    /// `$EndX` closed a different section (strict mode only).
    #[error("section `${open}` closed by `$End{closed}` at line {line}")]
    SectionMismatch {
        line: usize,
        open: String,
        closed: String,
    },

    /// An element that cannot be framed for binary output.
    #[error("element {tag} cannot be written: {reason}")]
    InvalidElement { tag: i32, reason: String },
}

impl Error {
    /// 1-based line number that triggered the error, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Io(_) | Error::InvalidElement { .. } => None,
            Error::UnknownSection { line, .. }
            | Error::DataOutsideSection { line }
            | Error::MalformedEntity { line, .. }
            | Error::BinaryDesync { line, .. }
            | Error::UnsupportedFormat { line, .. }
            | Error::SectionMismatch { line, .. } => Some(*line),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedEntity {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn desync(line: usize, reason: impl Into<String>) -> Self {
        Error::BinaryDesync {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(line: usize, reason: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            line,
            reason: reason.into(),
        }
    }
}

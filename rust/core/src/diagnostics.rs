// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal parse diagnostics
//!
//! Recoverable problems (a bad data line, a mismatched end tag) are reported
//! to an [`ErrorSink`] with their line number, and parsing carries on.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Tolerated irregularity; no data was lost
    Warning,
    /// A record was dropped
    Error,
}

/// One line-numbered report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    /// Offending line, when there is one
    pub text: Option<String>,
}

impl Diagnostic {
    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            message: message.into(),
            text: None,
        }
    }

    pub fn error(line: usize, message: impl Into<String>, text: &str) -> Self {
        Self {
            line,
            severity: Severity::Error,
            message: message.into(),
            text: Some(text.to_string()),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "line {}: {}: {}", self.line, level, self.message)?;
        if let Some(text) = &self.text {
            write!(f, " `{}`", text)?;
        }
        Ok(())
    }
}

/// Destination for non-fatal diagnostics
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collect diagnostics in memory
impl ErrorSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forward diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
            Severity::Error => tracing::error!(
                line = diagnostic.line,
                text = diagnostic.text.as_deref().unwrap_or(""),
                "{}",
                diagnostic.message
            ),
        }
    }
}

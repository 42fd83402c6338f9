// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section headers
//!
//! A `.msh` file is a flat sequence of `$Name` ... `$EndName` blocks. This
//! module classifies header lines; the driver owns the resulting state.

use std::fmt;

use crate::tokenizer::tokenize;

/// Which block the parser is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionKind {
    #[default]
    NoSection,
    FileInfo,
    Nodes,
    Elements,
    PhysicalNames,
    /// Known to the format but not read; skipped up to its end tag
    Unsupported,
    /// Not part of the format; aborts the parse
    Invalid,
}

impl SectionKind {
    /// Map a tag name (without the leading `$`) to its section
    pub fn from_name(name: &str) -> Self {
        match name {
            "MeshFormat" => Self::FileInfo,
            "Nodes" => Self::Nodes,
            "Elements" => Self::Elements,
            "PhysicalNames" => Self::PhysicalNames,
            "NodeData" | "ElementData" | "InterpolationScheme" | "ElementNodeData"
            | "Periodic" => Self::Unsupported,
            _ => Self::Invalid,
        }
    }

    /// Sections whose first data line is the number of records that follow
    #[inline]
    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Nodes | Self::Elements | Self::PhysicalNames)
    }

    /// Sections whose records switch to binary frames in binary files
    #[inline]
    pub fn has_binary_records(&self) -> bool {
        matches!(self, Self::Nodes | Self::Elements)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSection => "none",
            Self::FileInfo => "MeshFormat",
            Self::Nodes => "Nodes",
            Self::Elements => "Elements",
            Self::PhysicalNames => "PhysicalNames",
            Self::Unsupported => "unsupported",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified `$` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header<'a> {
    /// `$Name`
    Begin { kind: SectionKind, name: &'a str },
    /// `$EndName`
    End { name: &'a str },
}

/// Classify a header line. Returns `None` for lines not starting with `$`.
pub fn classify_header(line: &str) -> Option<Header<'_>> {
    let first = tokenize(line).into_iter().next()?;
    let name = first.strip_prefix('$')?;
    if let Some(closed) = name.strip_prefix("End") {
        return Some(Header::End { name: closed });
    }
    Some(Header::Begin {
        kind: SectionKind::from_name(name),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_headers() {
        assert_eq!(
            classify_header("$Nodes"),
            Some(Header::Begin {
                kind: SectionKind::Nodes,
                name: "Nodes"
            })
        );
        assert_eq!(
            classify_header("$MeshFormat\r"),
            Some(Header::Begin {
                kind: SectionKind::FileInfo,
                name: "MeshFormat"
            })
        );
        assert_eq!(
            classify_header("$Periodic"),
            Some(Header::Begin {
                kind: SectionKind::Unsupported,
                name: "Periodic"
            })
        );
    }

    #[test]
    fn test_invalid_header() {
        assert_eq!(
            classify_header("$Foo"),
            Some(Header::Begin {
                kind: SectionKind::Invalid,
                name: "Foo"
            })
        );
    }

    #[test]
    fn test_end_header() {
        assert_eq!(
            classify_header("$EndElements"),
            Some(Header::End { name: "Elements" })
        );
        assert_eq!(classify_header("$End"), Some(Header::End { name: "" }));
    }

    #[test]
    fn test_not_a_header() {
        assert_eq!(classify_header("1 0.0 0.0 0.0"), None);
        assert_eq!(classify_header(""), None);
    }

    #[test]
    fn test_counted_sections() {
        assert!(SectionKind::Nodes.is_counted());
        assert!(SectionKind::PhysicalNames.is_counted());
        assert!(!SectionKind::FileInfo.is_counted());
        assert!(!SectionKind::PhysicalNames.has_binary_records());
        assert!(SectionKind::Elements.has_binary_records());
    }
}

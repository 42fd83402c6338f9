// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser configuration.

/// Knobs controlling how lenient the parser is.
///
/// The defaults accept what Gmsh itself writes plus common hand-edited
/// irregularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Abort when `$EndX` closes a section other than `$X`.
    /// When unset, the mismatch is reported as a warning.
    pub strict_section_end: bool,
    /// Check ASCII elements against the element type table. Unknown types
    /// and wrong node counts are then reported and the element is dropped.
    /// Binary elements are always checked, since their framing depends on it.
    pub check_element_types: bool,
    /// Stop forwarding diagnostics to the sink after this many; later ones
    /// are only counted in the summary.
    pub max_diagnostics: Option<usize>,
}

impl ParserConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on any structural irregularity
    pub fn strict() -> Self {
        Self {
            strict_section_end: true,
            check_element_types: true,
            max_diagnostics: None,
        }
    }

    pub fn with_strict_section_end(mut self, strict: bool) -> Self {
        self.strict_section_end = strict;
        self
    }

    pub fn with_element_type_check(mut self, check: bool) -> Self {
        self.check_element_types = check;
        self
    }

    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = Some(max);
        self
    }

    /// Whether the `count`-th diagnostic (1-based) should reach the sink
    #[inline]
    pub(crate) fn forwards_diagnostic(&self, count: usize) -> bool {
        self.max_diagnostics.map_or(true, |max| count <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lenient() {
        let config = ParserConfig::default();
        assert!(!config.strict_section_end);
        assert!(!config.check_element_types);
        assert!(config.forwards_diagnostic(10_000));
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::new()
            .with_strict_section_end(true)
            .with_max_diagnostics(2);
        assert!(config.strict_section_end);
        assert!(config.forwards_diagnostic(2));
        assert!(!config.forwards_diagnostic(3));
        assert!(ParserConfig::strict().check_element_types);
    }
}

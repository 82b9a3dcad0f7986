use std::fmt;

use indexmap::IndexMap;
use skyline_hierarchy::NodeTransform;

/// A row or node of a layout file that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line of the offending row or element.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Outcome of reading one layout file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub file: String,
    /// Ground-anchored transforms written into the graph, keyed by node id, in file order.
    pub applied: IndexMap<String, NodeTransform>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub(crate) fn skip(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(file = %self.file, line, "{message}");
        self.diagnostics.push(Diagnostic { line, message });
    }

    /// The applied transforms, ready for `skyline::layout::LoadedNodeLayout`.
    pub fn into_transforms(self) -> IndexMap<String, NodeTransform> {
        self.applied
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows skipped in file {}", self.skipped(), self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_aggregates_skipped_rows() {
        let mut report = LoadReport::new("city.sld");
        report.skip(3, "bad row");
        report.skip(7, "unknown node id x");
        assert_eq!(report.to_string(), "2 rows skipped in file city.sld");
        assert_eq!(report.diagnostics[1].to_string(), "line 7: unknown node id x");
        assert!(!report.is_clean());
    }
}

//! Run configuration.
//!
//! Collected from the command line and shared by the session and exporters.

use crate::error::Result;
use crate::export::{ExportData, ExportFormat};
use crate::graph::{EdgeFilter, ImportGraph};
use crate::session::ImportSession;
use crate::trace::TraceRecord;

/// Options controlling which edges are kept and how the graph is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Pattern every endpoint's file must fully match
    pub include: Option<String>,
    /// Patterns excluding an edge when either endpoint's file fully matches
    pub exclude: Vec<String>,
    /// Compute hierarchy levels and cluster output by them
    pub hierarchy: bool,
    /// Output format
    pub format: ExportFormat,
}

impl GraphConfig {
    /// Compiles the configured filter patterns.
    pub fn edge_filter(&self) -> Result<EdgeFilter> {
        EdgeFilter::new(self.include.as_deref(), self.exclude.as_slice())
    }

    /// Replays `records` into a fresh session and returns the graph.
    ///
    /// # Example
    ///
    /// ```rust
    /// use importgraph::config::GraphConfig;
    /// use importgraph::event::LoadEvent;
    /// use importgraph::trace::TraceRecord;
    ///
    /// let config = GraphConfig::default();
    /// let graph = config
    ///     .build_graph([TraceRecord::Import(LoadEvent::import("app", "json"))])
    ///     .unwrap();
    ///
    /// assert!(graph.contains_edge("app", "json"));
    /// ```
    pub fn build_graph<I>(&self, records: I) -> Result<ImportGraph>
    where
        I: IntoIterator<Item = TraceRecord>,
    {
        let mut session = ImportSession::new(self.edge_filter()?);
        session.replay(records);
        Ok(session.finish())
    }

    /// Wraps a finished graph for export, computing levels if requested.
    pub fn export_data<'a>(&self, graph: &'a ImportGraph) -> ExportData<'a> {
        if self.hierarchy {
            ExportData::with_hierarchy(graph)
        } else {
            ExportData::new(graph)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportGraphError;
    use crate::event::LoadEvent;

    #[test]
    fn test_default_config_keeps_everything() {
        let config = GraphConfig::default();
        assert!(config.edge_filter().unwrap().is_permissive());
        assert_eq!(config.format, ExportFormat::Dot);
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let config = GraphConfig {
            exclude: vec!["[".to_string()],
            ..GraphConfig::default()
        };
        let err = config.build_graph(Vec::new()).unwrap_err();
        assert!(matches!(err, ImportGraphError::InvalidPattern { .. }));
    }

    #[test]
    fn test_export_data_respects_hierarchy_flag() {
        let config = GraphConfig {
            hierarchy: true,
            ..GraphConfig::default()
        };
        let graph = config
            .build_graph([TraceRecord::Import(LoadEvent::import("a", "b"))])
            .unwrap();

        assert_eq!(config.export_data(&graph).level("b"), Some(1));
        assert_eq!(GraphConfig::default().export_data(&graph).level("b"), None);
    }
}

//! An observation session.
//!
//! Replays trace records in order: `module` records grow the registry,
//! `import` records are resolved against the registry as it stood at that
//! point and recorded in the graph.

use crate::event::{LoadEvent, RegistrySnapshot};
use crate::graph::{EdgeFilter, ImportGraph};
use crate::trace::TraceRecord;

/// Counters collected while observing a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Load events seen
    pub imports: usize,
    /// Modules announced
    pub modules: usize,
    /// Edges added to the graph
    pub edges: usize,
    /// Events that produced no new edge
    pub silent_imports: usize,
}

/// Builds an [`ImportGraph`] from a stream of trace records.
///
/// # Example
///
/// ```rust
/// use importgraph::session::ImportSession;
/// use importgraph::trace::read_trace;
///
/// let trace = r#"
/// {"event":"module","name":"pkg","file":"/src/pkg/__init__.py"}
/// {"event":"module","name":"pkg.a","file":"/src/pkg/a.py"}
/// {"event":"module","name":"pkg.b","file":"/src/pkg/b.py"}
/// {"event":"import","requester":"pkg.a","target":"","items":["b"],"level":1}
/// "#;
///
/// let mut session = ImportSession::default();
/// session.replay(read_trace(trace.as_bytes()).unwrap());
/// let graph = session.finish();
///
/// assert!(graph.contains_edge("pkg.a", "pkg.b"));
/// ```
#[derive(Debug, Default)]
pub struct ImportSession {
    registry: RegistrySnapshot,
    graph: ImportGraph,
    stats: SessionStats,
}

impl ImportSession {
    pub fn new(filter: EdgeFilter) -> Self {
        Self {
            registry: RegistrySnapshot::new(),
            graph: ImportGraph::with_filter(filter),
            stats: SessionStats::default(),
        }
    }

    /// Applies one trace record.
    pub fn observe(&mut self, record: TraceRecord) {
        match record {
            TraceRecord::Module(entry) => {
                self.stats.modules += 1;
                self.registry.register(entry);
            }
            TraceRecord::Import(event) => self.observe_import(&event),
        }
    }

    /// Resolves and records one load event against the current registry.
    pub fn observe_import(&mut self, event: &LoadEvent) {
        self.stats.imports += 1;
        let added = self.graph.add_import(event, &self.registry);
        if added == 0 {
            self.stats.silent_imports += 1;
        }
        self.stats.edges += added;
        tracing::debug!(
            requester = %event.requester,
            target = %event.target,
            level = event.level,
            added,
            "observed import"
        );
    }

    /// Applies every record in order.
    pub fn replay<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = TraceRecord>,
    {
        for record in records {
            self.observe(record);
        }
    }

    pub fn registry(&self) -> &RegistrySnapshot {
        &self.registry
    }

    pub fn graph(&self) -> &ImportGraph {
        &self.graph
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Ends the session and returns the finished graph.
    pub fn finish(self) -> ImportGraph {
        tracing::info!(
            imports = self.stats.imports,
            modules = self.stats.modules,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "import session finished"
        );
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::registry::ModuleEntry;
    use std::path::PathBuf;

    fn module(name: &str, file: &str) -> TraceRecord {
        TraceRecord::Module(ModuleEntry::new(name, Some(PathBuf::from(file))))
    }

    #[test]
    fn test_registry_state_at_event_time() {
        let mut session = ImportSession::default();
        let event = LoadEvent::from_import("pkg.a", "", ["b"], 1);

        // pkg.b is not loaded yet, so the item resolves to nothing
        session.observe(module("pkg.a", "/src/pkg/a.py"));
        session.observe(TraceRecord::Import(event.clone()));
        assert_eq!(session.graph().edge_count(), 0);

        session.observe(module("pkg.b", "/src/pkg/b.py"));
        session.observe(TraceRecord::Import(event));
        assert!(session.graph().contains_edge("pkg.a", "pkg.b"));
    }

    #[test]
    fn test_stats() {
        let mut session = ImportSession::default();
        session.replay([
            module("app", "/src/app.py"),
            TraceRecord::Import(LoadEvent::import("app", "json")),
            TraceRecord::Import(LoadEvent::import("app", "json")),
            TraceRecord::Import(LoadEvent::import("app", "os")),
        ]);

        assert_eq!(
            session.stats(),
            SessionStats {
                imports: 3,
                modules: 1,
                edges: 2,
                silent_imports: 1,
            }
        );
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_filter_applies_to_session() {
        let filter = EdgeFilter::new(Some("/src/.*"), &[".*/tests/.*"]).unwrap();
        let mut session = ImportSession::new(filter);
        session.replay([
            module("app", "/src/app/__init__.py"),
            module("app.core", "/src/app/core.py"),
            module("app.tests", "/src/app/tests/__init__.py"),
            module("json", "/usr/lib/python3/json/__init__.py"),
            TraceRecord::Import(LoadEvent::import("app", "app.core")),
            TraceRecord::Import(LoadEvent::import("app", "app.tests")),
            TraceRecord::Import(LoadEvent::import("app.core", "json")),
        ]);

        let graph = session.finish();
        assert_eq!(graph.edges(), vec![("app", "app.core")]);
        assert!(!graph.contains("json"));
    }

    #[test]
    fn test_unknown_requester_recorded_against_placeholder() {
        let mut session = ImportSession::default();
        session.replay(
            crate::trace::read_trace(
                r#"{"event":"import","requester":null,"target":"site","items":null,"level":0}"#
                    .as_bytes(),
            )
            .unwrap(),
        );

        assert!(session.finish().contains_edge("<unknown>", "site"));
    }
}

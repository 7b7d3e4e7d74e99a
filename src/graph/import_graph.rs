//! Import graph implementation using petgraph.
//!
//! Provides a directed graph of module names where an edge `a -> b` means
//! module `a` imported module `b` while the program ran.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

use super::filter::EdgeFilter;
use super::hierarchy::{build_hierarchy, Hierarchy};
use crate::event::{LoadEvent, ModuleRegistry};
use crate::resolver::imported_names;

/// A directed graph of observed imports.
///
/// Nodes are fully-qualified module names; duplicate edges collapse. Both
/// edge directions are served from the same petgraph edge list, so the
/// forward and reverse adjacency can never disagree.
///
/// # Example
///
/// ```rust
/// use importgraph::graph::ImportGraph;
///
/// let mut graph = ImportGraph::new();
///
/// graph.record_edge("app", "app.models");
/// graph.record_edge("app", "app.views");
/// graph.record_edge("app.views", "app.models");
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert!(graph.imports_of("app").unwrap().contains("app.views"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,
    /// Maps module names to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Which edges are kept
    filter: EdgeFilter,
}

impl ImportGraph {
    /// Creates a new empty graph that keeps every edge.
    ///
    /// ```rust
    /// use importgraph::graph::ImportGraph;
    ///
    /// let graph = ImportGraph::new();
    /// assert!(graph.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty graph that only records edges passing `filter`.
    pub fn with_filter(filter: EdgeFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn filter(&self) -> &EdgeFilter {
        &self.filter
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Records the edge `source -> target`, adding missing endpoints.
    ///
    /// Unfiltered and idempotent: returns `true` only if the edge is new.
    ///
    /// ```rust
    /// use importgraph::graph::ImportGraph;
    ///
    /// let mut graph = ImportGraph::new();
    /// assert!(graph.record_edge("a", "b"));
    /// assert!(!graph.record_edge("a", "b"));
    /// assert_eq!(graph.edge_count(), 1);
    /// ```
    pub fn record_edge(&mut self, source: &str, target: &str) -> bool {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Records `source -> target` if it passes the graph's filter.
    ///
    /// Filtered edges leave the graph untouched, endpoints included.
    pub fn offer_edge<R>(&mut self, source: &str, target: &str, registry: &R) -> bool
    where
        R: ModuleRegistry + ?Sized,
    {
        if !self.filter.keeps(source, target, registry) {
            tracing::trace!(source, target, "edge filtered out");
            return false;
        }
        self.record_edge(source, target)
    }

    /// Resolves one load event and records every resulting edge.
    ///
    /// Returns the number of new edges.
    ///
    /// ```rust
    /// use importgraph::event::{LoadEvent, RegistrySnapshot};
    /// use importgraph::graph::ImportGraph;
    ///
    /// let registry: RegistrySnapshot = [("pkg", None), ("pkg.a", None), ("pkg.b", None)]
    ///     .into_iter()
    ///     .collect();
    /// let mut graph = ImportGraph::new();
    ///
    /// // from . import b  (inside pkg.a)
    /// let added = graph.add_import(&LoadEvent::from_import("pkg.a", "", ["b"], 1), &registry);
    /// assert_eq!(added, 1);
    /// assert!(graph.contains_edge("pkg.a", "pkg.b"));
    /// ```
    pub fn add_import<R>(&mut self, event: &LoadEvent, registry: &R) -> usize
    where
        R: ModuleRegistry + ?Sized,
    {
        imported_names(event, registry)
            .iter()
            .filter(|target| self.offer_edge(&event.requester, target, registry))
            .count()
    }

    /// Returns the modules `name` imports, or `None` if `name` is not in the graph.
    pub fn imports_of(&self, name: &str) -> Option<BTreeSet<&str>> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Returns the modules importing `name`, or `None` if `name` is not in the graph.
    pub fn imported_by(&self, name: &str) -> Option<BTreeSet<&str>> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Option<BTreeSet<&str>> {
        let &idx = self.node_indices.get(name)?;
        Some(
            self.graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].as_str())
                .collect(),
        )
    }

    /// Returns true if the edge `source -> target` was recorded.
    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        match (self.node_indices.get(source), self.node_indices.get(target)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Iterates over module names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Returns all edges as `(source, target)` pairs, sorted.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .raw_edges()
            .iter()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                )
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Returns modules nobody imports, in insertion order.
    ///
    /// ```rust
    /// use importgraph::graph::ImportGraph;
    ///
    /// let mut graph = ImportGraph::new();
    /// graph.record_edge("main", "lib");
    /// graph.record_edge("tool", "lib");
    ///
    /// assert_eq!(graph.roots(), vec!["main", "tool"]);
    /// ```
    pub fn roots(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Checks if the graph contains import cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns every import cycle as a sorted list of module names.
    ///
    /// A cycle is a strongly connected component with more than one module,
    /// or a single module importing itself.
    ///
    /// ```rust
    /// use importgraph::graph::ImportGraph;
    ///
    /// let mut graph = ImportGraph::new();
    /// graph.record_edge("a", "b");
    /// graph.record_edge("b", "c");
    /// graph.record_edge("c", "a");
    /// graph.record_edge("a", "d");
    ///
    /// assert_eq!(graph.detect_cycles(), vec![vec!["a", "b", "c"]]);
    /// ```
    pub fn detect_cycles(&self) -> Vec<Vec<&str>> {
        let mut cycles: Vec<Vec<&str>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<&str> =
                    scc.iter().map(|&idx| self.graph[idx].as_str()).collect();
                names.sort_unstable();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Computes hierarchy levels for every module.
    pub fn hierarchy(&self) -> Hierarchy {
        build_hierarchy(&self.graph)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a module is in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }
}

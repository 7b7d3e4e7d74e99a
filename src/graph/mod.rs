//! Graph module for import relationship modeling.
//!
//! This module provides the [`ImportGraph`] struct for recording which
//! module imported which, the [`EdgeFilter`] deciding which edges are kept,
//! and the [`Hierarchy`] levels used to lay the graph out in layers.
//!
//! # Example
//!
//! ```rust
//! use importgraph::graph::ImportGraph;
//!
//! let mut graph = ImportGraph::new();
//! graph.record_edge("app", "app.models");
//! graph.record_edge("app", "json");
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//! assert_eq!(graph.hierarchy().level("json"), Some(1));
//! ```

mod filter;
mod hierarchy;
mod import_graph;

pub use filter::EdgeFilter;
pub use hierarchy::Hierarchy;
pub use import_graph::ImportGraph;

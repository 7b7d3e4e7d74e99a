//! importgraph - dependency graphs from the imports a program actually executes
//!
//! This crate records every import a Python program performs while it runs,
//! resolves relative and `from ... import` loads to the modules they
//! reference, and renders the result as a directed graph, optionally layered
//! by each module's distance from the graph's roots.

pub mod config;
pub mod discover;
pub mod error;
pub mod event;
pub mod export;
pub mod graph;
pub mod resolver;
pub mod session;
pub mod trace;

pub use error::{ImportGraphError, Result};

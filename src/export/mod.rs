//! Export functionality for import graphs.
//!
//! This module provides exporters for writing a finished graph in various
//! formats: Graphviz DOT, JSON and CSV.

pub mod csv;
pub mod dot;
pub mod json;

use crate::graph::{Hierarchy, ImportGraph};
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Graphviz DOT source
    #[default]
    Dot,
    /// JSON format - machine-readable, full data
    Json,
    /// CSV edge list - spreadsheet-friendly
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" => Ok(ExportFormat::Dot),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: dot, json, csv",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Dot => write!(f, "dot"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Data container for export operations.
///
/// Holds the finished graph and, when requested, its hierarchy levels.
#[derive(Debug, Clone)]
pub struct ExportData<'a> {
    /// The finished import graph
    pub graph: &'a ImportGraph,
    /// Hierarchy levels, if layering was requested
    pub hierarchy: Option<Hierarchy>,
}

impl<'a> ExportData<'a> {
    /// Export data without hierarchy levels.
    pub fn new(graph: &'a ImportGraph) -> Self {
        Self {
            graph,
            hierarchy: None,
        }
    }

    /// Export data with hierarchy levels computed from the graph.
    pub fn with_hierarchy(graph: &'a ImportGraph) -> Self {
        Self {
            graph,
            hierarchy: Some(graph.hierarchy()),
        }
    }

    /// Level of a module, if levels were computed.
    pub fn level(&self, name: &str) -> Option<usize> {
        self.hierarchy.as_ref().and_then(|h| h.level(name))
    }

    /// Module names, sorted.
    pub fn sorted_nodes(&self) -> Vec<&'a str> {
        let mut nodes: Vec<&str> = self.graph.nodes().collect();
        nodes.sort_unstable();
        nodes
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(format: ExportFormat, data: &ExportData, writer: &mut W) -> io::Result<()> {
    match format {
        ExportFormat::Dot => dot::DotExporter.export(data, writer),
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

//! JSON export implementation.
//!
//! Exports the import graph in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable module for JSON output.
#[derive(Serialize)]
struct JsonModule<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<usize>,
}

/// Serializable import edge for JSON output.
#[derive(Serialize)]
struct JsonImport<'a> {
    from: &'a str,
    to: &'a str,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    modules: usize,
    imports: usize,
    roots: usize,
    cycles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_level: Option<usize>,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    summary: JsonSummary,
    modules: Vec<JsonModule<'a>>,
    imports: Vec<JsonImport<'a>>,
    roots: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cycles: Vec<Vec<&'a str>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let graph = data.graph;

        let modules: Vec<JsonModule> = data
            .sorted_nodes()
            .into_iter()
            .map(|name| JsonModule {
                name,
                level: data.level(name),
            })
            .collect();

        let imports: Vec<JsonImport> = graph
            .edges()
            .into_iter()
            .map(|(from, to)| JsonImport { from, to })
            .collect();

        let mut roots = graph.roots();
        roots.sort_unstable();
        let cycles = graph.detect_cycles();

        let export = JsonExport {
            summary: JsonSummary {
                modules: graph.node_count(),
                imports: graph.edge_count(),
                roots: roots.len(),
                cycles: cycles.len(),
                max_level: data.hierarchy.as_ref().and_then(|h| h.max_level()),
            },
            modules,
            imports,
            roots,
            cycles,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

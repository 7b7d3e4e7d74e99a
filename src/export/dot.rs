//! Graphviz DOT export.
//!
//! Produces a digraph named `Imports` with orthogonal edges and rectangular
//! nodes. With hierarchy levels, each level is emitted as a `rank=same`
//! subgraph so Graphviz lays modules out in layers.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// DOT exporter implementation.
pub struct DotExporter;

impl DotExporter {
    /// Quote an identifier for DOT.
    fn quote(value: &str) -> String {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "digraph Imports {{")?;
        writeln!(writer, "\tgraph [splines=ortho]")?;
        writeln!(writer, "\tnode [shape=rectangle]")?;

        match &data.hierarchy {
            Some(hierarchy) => {
                for (level, names) in hierarchy.layers() {
                    writeln!(writer, "\tsubgraph level_{} {{", level)?;
                    writeln!(writer, "\t\trank=same")?;
                    for name in names {
                        writeln!(writer, "\t\t{}", Self::quote(name))?;
                    }
                    writeln!(writer, "\t}}")?;
                }
            }
            None => {
                for name in data.sorted_nodes() {
                    writeln!(writer, "\t{}", Self::quote(name))?;
                }
            }
        }

        for (source, target) in data.graph.edges() {
            writeln!(
                writer,
                "\t{} -> {}",
                Self::quote(source),
                Self::quote(target)
            )?;
        }

        writeln!(writer, "}}")
    }
}

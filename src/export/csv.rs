//! CSV export implementation.
//!
//! Exports the import edge list in CSV format for spreadsheet use.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn level_field(level: Option<usize>) -> String {
        level.map(|l| l.to_string()).unwrap_or_default()
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "importer,imported,importer_level,imported_level")?;

        for (source, target) in data.graph.edges() {
            writeln!(
                writer,
                "{},{},{},{}",
                Self::escape_field(source),
                Self::escape_field(target),
                Self::level_field(data.level(source)),
                Self::level_field(data.level(target)),
            )?;
        }

        Ok(())
    }
}

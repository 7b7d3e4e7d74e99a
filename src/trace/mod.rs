//! Import traces.
//!
//! A trace is a JSON-lines stream written by the interception script while
//! the traced program runs. Two kinds of records appear, in load order:
//!
//! - `module`: a module entered the interpreter's module registry
//! - `import`: a load event, written after the modules it caused to load
//!
//! ```text
//! {"event":"module","name":"pkg.mod","file":"/src/pkg/mod.py"}
//! {"event":"import","requester":"pkg","target":"pkg.mod","items":null,"level":0}
//! ```

mod tracer;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{ImportGraphError, Result};
use crate::event::registry::ModuleEntry;
use crate::event::LoadEvent;

pub use tracer::{PythonTracer, DEFAULT_PYTHON};

/// One line of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceRecord {
    /// A module was added to the registry.
    Module(ModuleEntry),
    /// A load event completed.
    Import(LoadEvent),
}

/// Parses a trace from any buffered reader. Blank lines are skipped.
///
/// # Example
///
/// ```rust
/// use importgraph::trace::{read_trace, TraceRecord};
///
/// let trace = r#"{"event":"module","name":"json","file":null}
/// {"event":"import","requester":"app","target":"json","items":null,"level":0}
/// "#;
/// let records = read_trace(trace.as_bytes()).unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert!(matches!(records[1], TraceRecord::Import(_)));
/// ```
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| {
            ImportGraphError::MalformedTrace {
                line: index + 1,
                source,
            }
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Parses a trace file from disk.
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceRecord>> {
    let file = File::open(path)?;
    let records = read_trace(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), records = records.len(), "read trace file");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UNKNOWN_MODULE_NAME;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_read_module_record() {
        let records =
            read_trace(r#"{"event":"module","name":"pkg","file":"/src/pkg/__init__.py"}"#.as_bytes())
                .unwrap();

        assert_eq!(
            records,
            vec![TraceRecord::Module(ModuleEntry::new(
                "pkg",
                Some(PathBuf::from("/src/pkg/__init__.py"))
            ))]
        );
    }

    #[test]
    fn test_read_module_without_file() {
        let records = read_trace(r#"{"event":"module","name":"sys"}"#.as_bytes()).unwrap();
        assert_eq!(records, vec![TraceRecord::Module(ModuleEntry::new("sys", None))]);
    }

    #[test]
    fn test_read_import_record() {
        let line = r#"{"event":"import","requester":"pkg.a","target":"","items":["b"],"level":1,"resolved":"pkg"}"#;
        let records = read_trace(line.as_bytes()).unwrap();

        let TraceRecord::Import(event) = &records[0] else {
            panic!("expected an import record");
        };
        assert_eq!(event.requester, "pkg.a");
        assert_eq!(event.items, Some(vec!["b".to_string()]));
        assert_eq!(event.level, 1);
        assert_eq!(event.resolved.as_deref(), Some("pkg"));
    }

    #[test]
    fn test_null_requester_becomes_unknown() {
        let line = r#"{"event":"import","requester":null,"target":"json","items":null,"level":0}"#;
        let records = read_trace(line.as_bytes()).unwrap();

        assert_eq!(
            records,
            vec![TraceRecord::Import(LoadEvent::import(UNKNOWN_MODULE_NAME, "json"))]
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let trace = "\n{\"event\":\"module\",\"name\":\"a\"}\n   \n{\"event\":\"module\",\"name\":\"b\"}\n";
        assert_eq!(read_trace(trace.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let trace = "{\"event\":\"module\",\"name\":\"a\"}\n\n{\"event\":\"launch\"}\n";
        let err = read_trace(trace.as_bytes()).unwrap_err();

        assert!(matches!(err, ImportGraphError::MalformedTrace { line: 3, .. }));
    }

    #[test]
    fn test_record_round_trips_through_serde() {
        let record = TraceRecord::Import(LoadEvent::from_import("a.b", "c", ["D"], 2));
        let line = serde_json::to_string(&record).unwrap();

        assert!(line.contains("\"event\":\"import\""));
        assert_eq!(read_trace(line.as_bytes()).unwrap(), vec![record]);
    }

    #[test]
    fn test_read_trace_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"event":"module","name":"app","file":"/src/app.py"}}"#).unwrap();
        writeln!(file, r#"{{"event":"import","requester":"app","target":"json"}}"#).unwrap();

        let records = read_trace_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_trace_file(Path::new("/nonexistent/trace.jsonl")).unwrap_err();
        assert!(matches!(err, ImportGraphError::Io(_)));
    }
}

//! Error types for importgraph.
//!
//! Resolution misses, unknown requesters and filtered edges are not errors;
//! they are handled where they occur. Everything here belongs to the outer
//! layers: compiling filter patterns, reading traces, running the
//! interpreter and walking directories.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors that can occur while building an import graph.
#[derive(Debug, thiserror::Error)]
pub enum ImportGraphError {
    /// A filter pattern failed to compile.
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A trace line could not be decoded.
    #[error("Malformed trace record on line {line}: {source}")]
    MalformedTrace {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The interpreter could not be started.
    #[error("Failed to start interpreter '{}': {source}", python.display())]
    InterpreterSpawn {
        python: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interpreter ran but the traced program failed.
    #[error("Traced program exited with {status}:\n{stderr}")]
    InterpreterFailed { status: ExitStatus, stderr: String },

    /// Directory discovery failed.
    #[error("Failed to walk directory: {0}")]
    Discovery(#[from] walkdir::Error),
}

/// Result type alias for importgraph operations.
pub type Result<T> = std::result::Result<T, ImportGraphError>;

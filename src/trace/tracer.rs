//! Runs the traced program under the interception script.
//!
//! The script is embedded in the binary and passed to the interpreter with
//! `-c`. It writes its trace to a temporary file, which is read back once
//! the interpreter exits.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use super::{read_trace_file, TraceRecord};
use crate::error::{ImportGraphError, Result};

/// Embedded interception script.
const TRACER_SCRIPT: &str = include_str!("import_tracer.py");

/// Environment variable carrying extra search paths to the script.
const SEARCH_PATH_VAR: &str = "IMPORTGRAPH_PATH";

/// Default interpreter.
pub const DEFAULT_PYTHON: &str = "python3";

/// Imports a set of modules under the interception script and collects the trace.
///
/// # Example
///
/// ```ignore
/// use importgraph::trace::PythonTracer;
///
/// let records = PythonTracer::new("python3")
///     .search_path("./src")
///     .run(&["app.main".to_string()])?;
/// ```
#[derive(Debug, Clone)]
pub struct PythonTracer {
    python: PathBuf,
    search_paths: Vec<PathBuf>,
    keep_trace: Option<PathBuf>,
}

impl Default for PythonTracer {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl PythonTracer {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            search_paths: Vec::new(),
            keep_trace: None,
        }
    }

    /// Adds a directory to the interpreter's module search path.
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Writes the trace to `path` instead of a temporary file.
    pub fn keep_trace(mut self, path: impl Into<PathBuf>) -> Self {
        self.keep_trace = Some(path.into());
        self
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Builds the interpreter command writing its trace to `trace_path`.
    fn command(&self, trace_path: &Path, modules: &[String]) -> Result<Command> {
        let mut command = Command::new(&self.python);
        command
            .arg("-c")
            .arg(TRACER_SCRIPT)
            .arg(trace_path)
            .args(modules)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());

        if !self.search_paths.is_empty() {
            let joined = env::join_paths(&self.search_paths).map_err(|e| {
                ImportGraphError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
            })?;
            command.env(SEARCH_PATH_VAR, joined);
        }
        Ok(command)
    }

    /// Picks the file the script writes to. A temporary file is only created
    /// when no trace is kept; it is removed once the returned guard drops.
    fn trace_destination(&self) -> Result<(Option<NamedTempFile>, PathBuf)> {
        if let Some(path) = &self.keep_trace {
            return Ok((None, path.clone()));
        }
        let temp = tempfile::Builder::new()
            .prefix("importgraph-")
            .suffix(".jsonl")
            .tempfile()?;
        let path = temp.path().to_path_buf();
        Ok((Some(temp), path))
    }

    /// Imports `modules` in a fresh interpreter and returns the recorded trace.
    pub fn run(&self, modules: &[String]) -> Result<Vec<TraceRecord>> {
        let (_temp, trace_path) = self.trace_destination()?;

        tracing::info!(
            python = %self.python.display(),
            modules = modules.len(),
            trace = %trace_path.display(),
            "running traced imports"
        );

        let output = self
            .command(&trace_path, modules)?
            .output()
            .map_err(|source| ImportGraphError::InterpreterSpawn {
                python: self.python.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ImportGraphError::InterpreterFailed {
                status: output.status,
                stderr,
            });
        }
        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            tracing::warn!(target: "importgraph::python", "{}", line);
        }

        read_trace_file(&trace_path)
    }

    /// Arguments passed to the interpreter, for diagnostics.
    pub fn describe(&self, modules: &[String]) -> Vec<OsString> {
        let mut args = vec![self.python.clone().into_os_string(), OsString::from("-c")];
        args.push(OsString::from("<import tracer>"));
        args.extend(modules.iter().map(OsString::from));
        args
    }
}

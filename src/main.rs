use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use importgraph::config::GraphConfig;
use importgraph::discover::collect_from_dirs;
use importgraph::export::{export, ExportFormat};
use importgraph::trace::{read_trace_file, PythonTracer, TraceRecord};

#[derive(Parser)]
#[command(name = "importgraph")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Build a graph of the imports a Python program actually executes", long_about = None)]
struct Cli {
    /// Modules to import; every import they trigger is recorded.
    /// With --directory these are directories to discover modules in.
    #[arg(required_unless_present = "trace")]
    modules: Vec<String>,

    /// Write the graph to a file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep only imports between modules whose file fully matches this regex
    #[arg(short, long)]
    regex: Option<String>,

    /// Drop imports touching a module whose file fully matches this regex (repeatable)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Treat MODULES as directories, import every module found in them
    /// and add them to the interpreter's search path
    #[arg(short, long)]
    directory: bool,

    /// Replay a recorded trace instead of running the interpreter
    #[arg(short, long, conflicts_with_all = ["directory", "save_trace"])]
    trace: Option<PathBuf>,

    /// Keep the recorded trace at this path
    #[arg(long)]
    save_trace: Option<PathBuf>,

    /// Interpreter used to run the traced imports
    #[arg(long, default_value = importgraph::trace::DEFAULT_PYTHON)]
    python: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Dot)]
    format: Format,

    /// Cluster modules into layers by their distance from the roots
    #[arg(long)]
    hierarchy: bool,

    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Dot,
    Json,
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Dot => ExportFormat::Dot,
            Format::Json => ExportFormat::Json,
            Format::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    fn config(&self) -> GraphConfig {
        GraphConfig {
            include: self.regex.clone(),
            exclude: self.exclude.clone(),
            hierarchy: self.hierarchy,
            format: self.format.into(),
        }
    }

    /// Runs the interpreter or replays a trace file.
    fn records(&self) -> anyhow::Result<Vec<TraceRecord>> {
        if let Some(trace) = &self.trace {
            return read_trace_file(trace)
                .with_context(|| format!("reading trace {}", trace.display()));
        }

        let mut tracer = PythonTracer::new(&self.python);
        if let Some(path) = &self.save_trace {
            tracer = tracer.keep_trace(path);
        }

        let modules = if self.directory {
            for dir in &self.modules {
                tracer = tracer.search_path(dir);
            }
            collect_from_dirs(self.modules.as_slice()).context("discovering modules")?
        } else {
            self.modules.clone()
        };
        if modules.is_empty() {
            bail!("no modules to import");
        }

        tracing::debug!(command = ?tracer.describe(&modules), "tracing imports");
        tracer.run(&modules).context("tracing imports")
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.config();
    let records = cli.records()?;
    let graph = config.build_graph(records)?;
    let data = config.export_data(&graph);

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export(config.format, &data, &mut writer)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), format = %config.format, "graph written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export(config.format, &data, &mut writer)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("importgraph: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filters() {
        let cli = Cli::parse_from([
            "importgraph",
            "app",
            "-r",
            "/src/.*",
            "-x",
            ".*/tests/.*",
            "-x",
            ".*/vendor/.*",
            "--hierarchy",
            "-f",
            "json",
        ]);
        let config = cli.config();

        assert_eq!(cli.modules, vec!["app"]);
        assert_eq!(config.include.as_deref(), Some("/src/.*"));
        assert_eq!(config.exclude.len(), 2);
        assert!(config.hierarchy);
        assert_eq!(config.format, ExportFormat::Json);
    }

    #[test]
    fn test_modules_required_without_trace() {
        assert!(Cli::try_parse_from(["importgraph"]).is_err());
        assert!(Cli::try_parse_from(["importgraph", "--trace", "run.jsonl"]).is_ok());
    }

    #[test]
    fn test_trace_conflicts_with_directory() {
        assert!(Cli::try_parse_from(["importgraph", "-d", "src", "--trace", "run.jsonl"]).is_err());
    }

    #[test]
    fn test_replay_trace_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let trace = dir.path().join("run.jsonl");
        let output = dir.path().join("graph.dot");
        std::fs::write(
            &trace,
            concat!(
                r#"{"event":"module","name":"app","file":"/src/app/__init__.py"}"#,
                "\n",
                r#"{"event":"module","name":"app.cli","file":"/src/app/cli.py"}"#,
                "\n",
                r#"{"event":"module","name":"app.db","file":"/src/app/db.py"}"#,
                "\n",
                r#"{"event":"import","requester":"app.cli","target":"","items":["db"],"level":1}"#,
                "\n",
                r#"{"event":"import","requester":"app","target":"","items":["db"],"level":1}"#,
                "\n",
            ),
        )
        .unwrap();

        let args: Vec<std::ffi::OsString> = vec![
            "importgraph".into(),
            "--trace".into(),
            trace.into_os_string(),
            "-o".into(),
            output.clone().into_os_string(),
        ];
        let cli = Cli::parse_from(args);
        run(&cli).unwrap();

        let dot = std::fs::read_to_string(&output).unwrap();
        assert!(dot.contains("\"app.cli\" -> \"app.db\""));
        assert!(!dot.contains("\"app\" -> "));
    }
}

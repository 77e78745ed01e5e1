#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use collabnet_core::error::{AnalysisError, ErrorCode};
use collabnet_core::persist::PersistError;
use output::{CliError, OutputMode};

/// Directory (relative to the working directory) holding per-run log files.
const LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "collabnet: developer collaboration-network analytics",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the step timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run the full analysis and write network_metrics.csv",
        long_about = "Join the input tables, build the collaboration graph, compute centrality, \
                      structural holes and absence impact, and persist one row per developer.",
        after_help = "EXAMPLES:\n    collabnet analyze --countries devs.csv --metrics repos.csv\n\n    \
                      # Resume-safe run with small batches and JSON summary\n    \
                      collabnet analyze --countries devs.csv --metrics repos.csv --batch-size 200 --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Build the collaboration graph and print its statistics",
        after_help = "EXAMPLES:\n    collabnet graph --countries devs.csv --metrics repos.csv --edges"
    )]
    Graph(cmd::graph::GraphArgs),
}

fn init_tracing(verbose: bool) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_env("COLLABNET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "collabnet=debug,info"
        } else {
            "collabnet=info,warn"
        })
    });

    let format = env::var("COLLABNET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let (log_path, file_layer) = match open_run_log() {
        Some((path, file)) => (
            Some(path),
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            ),
        ),
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }

    log_path
}

/// Create `logs/collabnet_<timestamp>.log`; `None` when the directory is not writable.
fn open_run_log() -> Option<(PathBuf, File)> {
    let dir = PathBuf::from(LOG_DIR);
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join(format!(
        "collabnet_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&path).ok()?;
    Some((path, file))
}

/// Map an error chain to its stable code.
fn error_code(err: &anyhow::Error) -> ErrorCode {
    if let Some(code) = err.downcast_ref::<ErrorCode>() {
        return *code;
    }
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<AnalysisError>()
                .map(AnalysisError::code)
                .or_else(|| cause.downcast_ref::<PersistError>().map(PersistError::code))
        })
        .unwrap_or(ErrorCode::InternalUnexpected)
}

fn report_error(err: &anyhow::Error, mode: OutputMode) {
    let code = error_code(err);
    error!(code = code.code(), summary = code.message(), error = %format!("{err:#}"), "run failed");

    let cli_error = CliError {
        summary: code.message().to_string(),
        message: format!("{err:#}"),
        hint: code.hint().map(str::to_string),
        error_code: code.code().to_string(),
    };
    if output::render_error(mode, &cli_error).is_err() {
        eprintln!("error: {err:#}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_path = init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    if let Some(path) = &log_path {
        info!(path = %path.display(), "run log opened");
    }

    let output = cli.output_mode();
    let result = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, output, cli.timing),
        Commands::Graph(args) => cmd::graph::run_graph(args, output, cli.timing),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, output);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from([
            "collabnet",
            "graph",
            "--countries",
            "c.csv",
            "--metrics",
            "m.csv",
            "--json",
        ]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn timing_flag_parses_before_subcommand() {
        let cli = Cli::parse_from([
            "collabnet",
            "--timing",
            "analyze",
            "--countries",
            "c.csv",
            "--metrics",
            "m.csv",
        ]);
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn error_codes_follow_the_chain() {
        let err = anyhow::Error::from(AnalysisError::EmptyGraph).context("while analyzing");
        assert_eq!(error_code(&err), ErrorCode::EmptyGraph);

        let err = anyhow::Error::from(PersistError::Locked {
            path: PathBuf::from("out/.collabnet.lock"),
        });
        assert_eq!(error_code(&err), ErrorCode::LockContention);

        let err: anyhow::Result<()> = Err(anyhow::anyhow!("bad toml")).context(ErrorCode::ConfigParseError);
        assert_eq!(
            error_code(&err.expect_err("error")),
            ErrorCode::ConfigParseError
        );

        assert_eq!(
            error_code(&anyhow::anyhow!("something else")),
            ErrorCode::InternalUnexpected
        );
    }
}

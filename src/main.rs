use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rust_ddlgen::{generate_ddl, GenerateOptions, RunReport};

#[derive(Parser)]
#[command(name = "rust-ddlgen")]
#[command(author, version, about = "Generate DDL scripts for multiple SQL dialects")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one DDL script per dialect from a .ddlproj file
    Generate {
        /// Path to the .ddlproj file
        #[arg(short, long)]
        project: PathBuf,

        /// Output directory (defaults to the project's OutputDirectory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dialect identifier, e.g. PostgreSQL@13 (repeatable, replaces the project's list)
        #[arg(short, long = "dialect")]
        dialects: Vec<String>,

        /// Generate drop statements before creation statements
        #[arg(long)]
        create_drop: bool,

        /// Stop at the first failed statement (true) or collect failures (false)
        #[arg(long)]
        halt_on_error: Option<bool>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Exit code when generation completed but some statements failed
const EXIT_COLLECTED_ERRORS: u8 = 2;

fn setup_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

fn run(cli: Cli) -> Result<RunReport> {
    match cli.command {
        Commands::Generate {
            project,
            output,
            dialects,
            create_drop,
            halt_on_error,
            verbose,
        } => {
            setup_logging(verbose, cli.log_format);

            let options = GenerateOptions {
                project_path: project,
                output_dir: output,
                dialects,
                create_drop: create_drop.then_some(true),
                halt_on_error,
            };

            generate_ddl(options)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(report) => {
            for script in &report.scripts {
                info!(
                    "{}: {} ({} statements, sha256 {})",
                    script.dialect,
                    script.path.display(),
                    script.statement_count,
                    script.checksum
                );
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                warn!(
                    "Completed with {} failed statements and {} unresolved dialects",
                    report.errors.len(),
                    report.resolution_errors.len()
                );
                ExitCode::from(EXIT_COLLECTED_ERRORS)
            }
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

mod api;
mod config;
mod profiler;
mod serve;
mod surveys;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use surveygen_core::{ServiceConfig, SurveyService};
use surveygen_db::Database;
use surveygen_logging::{init_tracing, init_tracing_with_file, LogFormat, WorkerGuard};

use crate::config::Config;
use crate::surveys::SurveyCommand;

#[derive(Parser, Debug)]
#[command(
    name = "surveygen",
    about = "Personalized survey question generator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ./surveygen.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (default: ~/.local/share/surveygen/surveygen.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Survey(SurveyCommand),

    /// Serve the HTTP API
    Serve {
        /// Port to listen on (default: 3100)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::resolve(cli.config.as_deref(), &working_dir)?;

    // The server logs requests at info; one-shot commands stay quiet.
    let default_level = match cli.command {
        Command::Serve { .. } => "info",
        Command::Survey(_) => "warn",
    };
    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or(default_level);
    let _guard = init_logging(level, cli.log_format.into(), cli.log_file.as_deref())?;

    let db_path = cli.db.clone().or_else(|| config.database.clone());
    let db = open_database(db_path.as_deref())?;
    let service = SurveyService::new(
        Arc::new(db),
        ServiceConfig {
            share_base_url: config.share_base_url().to_string(),
        },
    );

    match cli.command {
        Command::Serve { port } => {
            serve::handle_serve(Arc::new(service), port.unwrap_or(config.port())).await
        }
        Command::Survey(command) => surveys::handle_survey_command(command, &service, &config),
    }
}

fn init_logging(
    level: &str,
    format: LogFormat,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    match log_file {
        Some(path) => {
            let guard = init_tracing_with_file(level, format, path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Ok(Some(guard))
        }
        None => {
            init_tracing(level, format);
            Ok(None)
        }
    }
}

fn open_database(path: Option<&Path>) -> Result<Database> {
    let Some(path) = path else {
        return Database::open().context("Failed to open the default database");
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Database::open_at(path).with_context(|| format!("Failed to open {}", path.display()))
}

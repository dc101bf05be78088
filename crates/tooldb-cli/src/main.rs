//! `tooldb`: administrative command line for a ToolDB store.

mod commands;

use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};
use thiserror::Error as ThisError;
use tooldb_config::{CONFIG_ENV, ConfigError, StoreConfig, ToolDbConfig};
use tooldb_core::error::InternalError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "tooldb", version, about = "Tool, pocket and offset database")]
struct Cli {
    /// TOML config file.
    #[arg(long, env = CONFIG_ENV, global = true)]
    config: Option<PathBuf>,

    /// Use a snapshot file at this path, overriding the config's store.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print the metrics report to stderr after the command.
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the bootstrap inventory: a geometry, a linear magazine with
    /// all its pockets, an active spindle and numbered tools.
    Seed {
        #[arg(long, default_value_t = 30)]
        tools: u32,
    },

    /// Print every row of one table as JSON.
    List { table: String },

    /// Resolve an offset/geometry id, groups first.
    Resolve { id: u64 },

    /// Print the compensated offset of a tool by number.
    ToolOffset { number: i64 },
}

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}", .0.display_with_class())]
    Db(#[from] InternalError),

    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("database already holds {0} tools; refusing to seed")]
    AlreadySeeded(usize),
}

fn load_config(cli: &Cli) -> Result<ToolDbConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => ToolDbConfig::load(path)?,
        None => ToolDbConfig::default(),
    };
    if let Some(path) = &cli.store {
        config.store = StoreConfig::file(path);
        config.validate()?;
    }

    Ok(config)
}

fn init_tracing(config: &ToolDbConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    init_tracing(&config);

    let mut session = tooldb_core::db::session::DbSession::open(&config.store)?;
    tracing::debug!(backend = session.db().backend_name(), "session opened");

    match &cli.command {
        Command::Seed { tools } => commands::seed(&mut session, &config.defaults, *tools)?,
        Command::List { table } => commands::list(&session, table)?,
        Command::Resolve { id } => commands::resolve(&session, *id)?,
        Command::ToolOffset { number } => commands::tool_offset(&session, *number)?,
    }

    if cli.metrics {
        commands::print_metrics()?;
    }

    session.close()?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tooldb: {err}");
            ExitCode::FAILURE
        }
    }
}

//! # dynaform CLI
//!
//! Serves the form API and acts as its terminal client.
//!
//! ## Usage
//!
//! ```bash
//! dynaform --config ./config/dynaform.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dynaform serve` | Start the HTTP server |
//! | `dynaform schema [--json]` | Show the active form |
//! | `dynaform validate <file>` | Validate a JSON record offline |
//! | `dynaform fill [--dry-run]` | Fill the form on the terminal and submit it |
//! | `dynaform submit <file>` | Submit a JSON record |
//! | `dynaform submissions list` | Page through submissions |
//! | `dynaform submissions get <id>` | Show one submission |
//!
//! Commands that fail validation or look up an unknown ID exit with status 1.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynaform::{commands, config, server};
use dynaform_core::store::SortOrder;

/// dynaform: schema-driven forms with validation and submission history.
#[derive(Parser)]
#[command(
    name = "dynaform",
    about = "Schema-driven dynamic forms: validation, submissions, and a terminal client",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dynaform.toml`. A missing file means defaults.
    #[arg(long, global = true, default_value = "./config/dynaform.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` (or `PORT`) and serves the form schema and
    /// submission endpoints. Logging follows `RUST_LOG` (default `info`).
    Serve,

    /// Show the active form schema.
    Schema {
        /// Print the schema JSON exactly as the API serves it.
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON record file against the active schema, offline.
    Validate {
        /// Path to a JSON object with one key per field id.
        file: PathBuf,
    },

    /// Fill the form interactively and submit it.
    ///
    /// When stdin is not a terminal, one answer per line is read without
    /// prompts.
    Fill {
        /// Validate locally and print the record instead of submitting.
        #[arg(long)]
        dry_run: bool,
    },

    /// Submit a JSON record file to the server.
    Submit {
        file: PathBuf,
    },

    /// Browse stored submissions.
    Submissions {
        #[command(subcommand)]
        action: SubmissionsAction,
    },
}

#[derive(Subcommand)]
enum SubmissionsAction {
    /// List one page of submissions, sorted by creation time.
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Page size; `[pagination].default_limit` when omitted.
        #[arg(long)]
        limit: Option<usize>,

        /// `asc` (oldest first) or `desc` (newest first).
        #[arg(long, default_value = "desc", value_parser = parse_order)]
        order: SortOrder,
    },
    /// Show a submission by ID (e.g. `SUB000001`).
    Get { id: String },
}

fn parse_order(s: &str) -> Result<SortOrder, String> {
    s.parse::<SortOrder>().map_err(|e| e.to_string())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    let ok = match cli.command {
        Commands::Serve => {
            init_tracing();
            server::run_server(&cfg).await?;
            true
        }
        Commands::Schema { json } => {
            commands::run_schema(&cfg, json)?;
            true
        }
        Commands::Validate { file } => commands::run_validate(&cfg, &file)?,
        Commands::Fill { dry_run } => commands::run_fill(&cfg, dry_run).await?,
        Commands::Submit { file } => commands::run_submit(&cfg, &file).await?,
        Commands::Submissions { action } => match action {
            SubmissionsAction::List { page, limit, order } => {
                commands::run_list(&cfg, page, limit, order).await?;
                true
            }
            SubmissionsAction::Get { id } => commands::run_get(&cfg, &id).await?,
        },
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

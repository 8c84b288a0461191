//! # Codex Harness CLI (`cdx`)
//!
//! The `cdx` binary is the primary interface for Codex Harness. It
//! lists datasets, searches and shows records, inspects dataset shape,
//! and serves the JSON HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! cdx --config ./config/cdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cdx datasets` | List datasets declared by the index document |
//! | `cdx search <dataset> "<query>"` | Token-AND search over one dataset |
//! | `cdx show <dataset> <id>` | Structured view of one record |
//! | `cdx inspect <dataset>` | Key/type statistics and name coverage |
//! | `cdx serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # List everything the export tree declares
//! cdx datasets --config ./config/cdx.toml
//!
//! # Find iron weapons
//! cdx search weapons_cdo "iron sword"
//!
//! # Show one record, including exporter-noise fields
//! cdx show items_cdo "04_items_all/sword_01" --hidden
//!
//! # Serve the API for a browser viewer
//! cdx serve
//! ```

mod adapter;
mod codex;
mod config;
mod error;
mod extract;
mod get;
mod inspect;
mod models;
mod normalize;
mod presenter;
mod search;
mod server;
mod source;
mod source_fs;
mod source_http;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::codex::Codex;

/// Codex Harness CLI — a local-first dataset ingestion and inspection
/// harness for chunked game-data exports.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/cdx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cdx",
    about = "Codex Harness — ingest, search, and inspect chunked game-data exports",
    version,
    long_about = "Codex Harness merges chunked JSON record exports into in-memory datasets \
    and exposes search, record views, and shape inspection via a CLI and a JSON HTTP server."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List datasets declared by the index document.
    ///
    /// Shows each dataset's key, declared record total, chunk count,
    /// and source kind. Nothing is fetched beyond the index itself.
    Datasets,

    /// Search one dataset.
    ///
    /// Tokenizes the query (lowercase, punctuation stripped) and
    /// returns records whose label or id contains every token,
    /// sorted by label.
    Search {
        /// Dataset key (e.g. `weapons_cdo`).
        dataset: String,

        /// The search query string. Empty matches every record.
        query: String,

        /// Maximum number of rows to print (the total is always shown).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a structured view of one record.
    Show {
        /// Dataset key.
        dataset: String,

        /// Record id within the dataset.
        id: String,

        /// Include exporter-noise fields normally hidden.
        #[arg(long)]
        hidden: bool,

        /// Print the full view as JSON instead of labelled blocks.
        #[arg(long)]
        json: bool,
    },

    /// Inspect a dataset's shape.
    ///
    /// Reports record count, generic-name coverage, the most frequent
    /// top-level keys, and a per-key value-type histogram.
    Inspect {
        /// Dataset key.
        dataset: String,
    },

    /// Start the JSON HTTP server.
    ///
    /// Binds to `[server].bind` and serves dataset listing, search,
    /// record views, and inspection for browser-based viewers.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let source = source::source_for(&cfg);
    let codex = Codex::bootstrap(
        source,
        &cfg.data.index_file,
        Some(cfg.data.presenters_file.as_str()),
    )
    .await?;

    match cli.command {
        Commands::Datasets => {
            codex::run_datasets(&codex);
        }
        Commands::Search {
            dataset,
            query,
            limit,
        } => {
            let limit = limit.unwrap_or(cfg.search.max_results);
            search::run_search(&codex, &dataset, &query, limit).await?;
        }
        Commands::Show {
            dataset,
            id,
            hidden,
            json,
        } => {
            get::run_show(&codex, &dataset, &id, hidden, json).await?;
        }
        Commands::Inspect { dataset } => {
            inspect::run_inspect(&codex, &dataset).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg, Arc::new(codex)).await?;
        }
    }

    Ok(())
}

use analytics::Snapshot;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use core_types::{Customer, Product, Sale};
use runner::{ReportRunner, SnapshotStore};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Entry point of the retail analytics harness.
#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean JSON document.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => handle_report(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Inventory, sales and customer reports over a retail data snapshot.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every report and print the bundle as JSON.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// JSON file with `customers`, `products` and `sales` arrays.
    #[arg(long)]
    snapshot: PathBuf,

    /// TOML settings file. Missing files fall back to the defaults.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Reference date of the time-dependent reports (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

/// On-disk layout of a snapshot file.
#[derive(Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    sales: Vec<Sale>,
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

async fn handle_report(args: ReportArgs) -> Result<()> {
    let settings = configuration::load_config(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config))?;

    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot.display()))?;
    let file: SnapshotFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.snapshot.display()))?;
    let snapshot = Snapshot::new(file.customers, file.products, file.sales)
        .context("Snapshot rejected")?;

    let store = Arc::new(SnapshotStore::new(snapshot));
    let runner = ReportRunner::new(settings, store)?;

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let bundle = runner.run_all(as_of).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&bundle)?
    } else {
        serde_json::to_string(&bundle)?
    };
    println!("{json}");
    Ok(())
}

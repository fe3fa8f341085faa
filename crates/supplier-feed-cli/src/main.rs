mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use supplier_feed::SupplierSync;
use supplier_feed_http::EndpointClient;
use supplier_feed_store::ProductStore;
use tracing_subscriber::EnvFilter;

use crate::commands::sync::FeedRequest;

#[derive(Parser)]
#[command(name = "supplier-sync")]
#[command(about = "Import supplier product feeds into the local catalog")]
struct Cli {
    /// Catalog database path (overrides the config file)
    #[arg(long, global = true, env = "SUPPLIER_FEED_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync a single CSV file or JSON endpoint
    Sync {
        /// Path to a CSV feed
        #[arg(long, conflicts_with = "api", required_unless_present = "api")]
        csv: Option<PathBuf>,
        /// URL of a JSON feed
        #[arg(long)]
        api: Option<String>,
        /// Bearer token for the JSON feed
        #[arg(long, env = "SUPPLIER_API_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Suggested CSV delimiter (`,` `;` `|` or `tab`)
        #[arg(long, requires = "csv", value_parser = config::parse_delimiter)]
        delimiter: Option<u8>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync every enabled feed from the config file and environment
    SyncAll {
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog products ordered by name
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Products per page
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        /// Print products as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one product by SKU
    Show {
        sku: String,
        /// Print the product as JSON
        #[arg(long)]
        json: bool,
    },
}

fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("could not determine cache directory")?;
    Ok(base.join("supplier-feed"))
}

/// Resolve the catalog path: flag or env, then config, then the cache dir.
fn db_path(flag: Option<PathBuf>, configured: Option<PathBuf>) -> Result<PathBuf> {
    let path = match flag.or(configured) {
        Some(path) => path,
        None => cache_dir()?.join("catalog.db"),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(path)
}

fn open_store(path: &Path) -> Result<ProductStore> {
    ProductStore::open(path)
        .with_context(|| format!("failed to open catalog at {}", path.display()))
}

fn build_sync(store: Arc<ProductStore>) -> SupplierSync {
    SupplierSync::new(store, Arc::new(EndpointClient::new()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let app_config = config::load_config();
    let db = db_path(cli.database, app_config.database.clone())?;
    tracing::debug!(path = %db.display(), "using catalog");

    match cli.command {
        Command::Sync {
            csv,
            api,
            token,
            delimiter,
            json,
        } => {
            let request = match (csv, api) {
                (Some(csv_path), _) => FeedRequest::Csv { path: csv_path, delimiter },
                (None, Some(url)) => FeedRequest::Api { url, token },
                (None, None) => anyhow::bail!("either --csv or --api is required"),
            };
            let sync = build_sync(Arc::new(open_store(&db)?));
            commands::sync::run(&sync, &request, json).await
        }
        Command::SyncAll { json } => {
            let sync = build_sync(Arc::new(open_store(&db)?));
            commands::sync::run_all(&sync, &app_config.feeds, |key| std::env::var(key).ok(), json)
                .await
        }
        Command::List {
            page,
            per_page,
            json,
        } => commands::list::run(&open_store(&db)?, page, per_page, json),
        Command::Show { sku, json } => commands::show::run(&open_store(&db)?, &sku, json),
    }
}

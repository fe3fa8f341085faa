use std::path::PathBuf;

use anyhow::{Result, bail};
use supplier_feed::{SupplierSync, SyncResult};

use super::format;
use crate::config::{FeedEntry, FeedType, parse_delimiter};

/// A feed resolved to everything a single sync call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRequest {
    Csv {
        path: PathBuf,
        delimiter: Option<u8>,
    },
    Api {
        url: String,
        token: Option<String>,
    },
}

impl FeedRequest {
    /// Resolve a configured feed, reading its token from the environment
    /// through `lookup`.
    pub fn from_entry(entry: &FeedEntry, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match &entry.feed_type {
            FeedType::Csv { path, delimiter } => {
                let delimiter = match delimiter {
                    Some(raw) => Some(
                        parse_delimiter(raw)
                            .map_err(|e| anyhow::anyhow!("feed [{}]: {e}", entry.label))?,
                    ),
                    None => None,
                };
                Ok(Self::Csv {
                    path: path.clone(),
                    delimiter,
                })
            }
            FeedType::Api { url, token_env } => Ok(Self::Api {
                url: url.clone(),
                token: token_env
                    .as_deref()
                    .and_then(&lookup)
                    .filter(|t| !t.is_empty()),
            }),
        }
    }

    pub async fn execute(&self, sync: &SupplierSync) -> SyncResult {
        match self {
            Self::Csv { path, delimiter } => sync.sync_from_file(path, *delimiter).await,
            Self::Api { url, token } => sync.sync_from_endpoint(url, token.as_deref()).await,
        }
    }
}

/// Sync one feed and print its result. Fails when the feed could not be
/// read at all; row-level errors are reported but do not fail the command.
pub async fn run(sync: &SupplierSync, request: &FeedRequest, json: bool) -> Result<()> {
    let result = request.execute(sync).await;
    report(std::slice::from_ref(&result), json)?;

    if result.is_source_failure() {
        bail!("sync failed for {}", result.source);
    }
    Ok(())
}

/// Sync every enabled configured feed in order. Fails only when every feed
/// failed at the source.
pub async fn run_all(
    sync: &SupplierSync,
    feeds: &[FeedEntry],
    lookup: impl Fn(&str) -> Option<String>,
    json: bool,
) -> Result<()> {
    let mut results = Vec::new();

    for entry in feeds.iter().filter(|f| f.enabled) {
        let request = match FeedRequest::from_entry(entry, &lookup) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(feed = %entry.label, error = %e, "skipping feed");
                continue;
            }
        };

        tracing::info!(feed = %entry.label, "syncing feed");
        results.push(request.execute(sync).await);
    }

    if results.is_empty() {
        bail!("no feeds configured; add [[feeds]] to the config file or set SUPPLIER_CSV_PATH / SUPPLIER_API_URL");
    }

    report(&results, json)?;

    let failed = results.iter().filter(|r| r.is_source_failure()).count();
    if failed == results.len() {
        bail!("all {failed} feeds failed to sync");
    }
    if failed > 0 {
        eprintln!("Synced {} feeds ({failed} failed)", results.len() - failed);
    }
    Ok(())
}

fn report(results: &[SyncResult], json: bool) -> Result<()> {
    if json {
        match results {
            [single] => println!("{}", serde_json::to_string_pretty(single)?),
            many => println!("{}", serde_json::to_string_pretty(many)?),
        }
        return Ok(());
    }

    for result in results {
        format::print_result(result);
    }
    Ok(())
}

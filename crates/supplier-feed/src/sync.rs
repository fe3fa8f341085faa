use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::aggregate::SkuAggregator;
use crate::catalog::Catalog;
use crate::fetch::{FeedFetcher, FetchError};
use crate::json::decode_products;
use crate::normalize::normalize_row;
use crate::reader::{CsvRows, ReadError};
use crate::record::RawRecord;
use crate::result::SyncResult;
use crate::validate::{join_errors, validate_row};

/// Delimiter assumed when the caller has no better guess.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Drives a feed through normalization, validation and aggregation, then
/// writes the result to the catalog in a single bulk upsert.
///
/// Every entry point returns a [`SyncResult`]; failures are reported in its
/// `errors` rather than as `Err`. A feed that cannot be read at all leaves
/// the catalog untouched.
///
/// The existence check and the upsert are two separate catalog calls. If
/// another sync writes overlapping SKUs in between, the reported
/// inserted/updated split can be stale, though the rows written are not.
pub struct SupplierSync {
    catalog: Arc<dyn Catalog>,
    fetcher: Arc<dyn FeedFetcher>,
}

impl SupplierSync {
    pub fn new(catalog: Arc<dyn Catalog>, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { catalog, fetcher }
    }

    /// Sync from a CSV file on disk.
    pub async fn sync_from_file(&self, path: &Path, delimiter: Option<u8>) -> SyncResult {
        let source = path.display().to_string();

        if !path.is_file() {
            return self.fail(source.clone(), format!("CSV not found: {source}"));
        }

        let rows = match CsvRows::open(path, delimiter.unwrap_or(DEFAULT_DELIMITER)) {
            Ok(rows) => rows,
            Err(e) => return self.fail(source.clone(), csv_failure(&e, &source)),
        };

        self.sync_csv_rows(source, rows).await
    }

    /// Sync from an already-open CSV byte stream. `source` labels the result.
    pub async fn sync_from_reader<R: Read>(
        &self,
        source: impl Into<String>,
        reader: R,
        delimiter: Option<u8>,
    ) -> SyncResult {
        let source = source.into();
        match CsvRows::from_reader(reader, delimiter.unwrap_or(DEFAULT_DELIMITER)) {
            Ok(rows) => self.sync_csv_rows(source, rows).await,
            Err(e) => {
                let message = csv_failure(&e, &source);
                self.fail(source, message)
            }
        }
    }

    /// Sync from a JSON endpoint whose body holds a `products` array.
    pub async fn sync_from_endpoint(&self, url: &str, token: Option<&str>) -> SyncResult {
        tracing::info!(source = url, "fetching supplier feed");

        let body = match self.fetcher.fetch(url, token).await {
            Ok(body) => body,
            Err(e) => return self.fail(url.to_owned(), fetch_failure(&e)),
        };

        let rows = match decode_products(&body.bytes) {
            Ok(rows) => rows,
            Err(e) => {
                return self.fail(url.to_owned(), format!("API returned invalid JSON: {e}"));
            }
        };

        let collected = match collect(rows.map(Ok::<_, std::convert::Infallible>)) {
            Ok(collected) => collected,
            Err(never) => match never {},
        };
        self.persist(SyncResult::new(url), collected).await
    }

    async fn sync_csv_rows<R: Read>(&self, source: String, rows: CsvRows<R>) -> SyncResult {
        tracing::info!(source = %source, "reading supplier CSV");

        match collect(rows) {
            Ok(collected) => self.persist(SyncResult::new(source), collected).await,
            Err(e) => {
                let message = csv_failure(&e, &source);
                self.fail(source, message)
            }
        }
    }

    /// Upsert the aggregated rows and fill in the counts.
    async fn persist(&self, mut result: SyncResult, collected: Collected) -> SyncResult {
        result.total = collected.total;
        result.errors.extend(collected.errors);

        let aggregated = collected.rows;
        if aggregated.is_empty() {
            tracing::info!(source = %result.source, total = result.total, "no valid rows to upsert");
            return result;
        }

        let skus = aggregated.skus();
        let existing = match self.catalog.existing_skus(&skus).await {
            Ok(existing) => existing,
            Err(e) => return catalog_failure(result, &e),
        };

        let updated = skus.iter().filter(|sku| existing.contains(*sku)).count() as u64;
        let inserted = skus.len() as u64 - updated;

        if let Err(e) = self.catalog.upsert_products(&aggregated.into_rows()).await {
            return catalog_failure(result, &e);
        }

        result.inserted = inserted;
        result.updated = updated;

        tracing::info!(
            source = %result.source,
            total = result.total,
            inserted,
            updated,
            errors = result.errors.len(),
            "supplier sync completed"
        );
        result
    }

    fn fail(&self, source: String, message: String) -> SyncResult {
        tracing::error!(source = %source, "{message}");
        SyncResult::source_failure(source, message)
    }
}

/// Valid rows aggregated by SKU, plus the bookkeeping for the report.
#[derive(Debug, Default)]
struct Collected {
    total: u64,
    errors: Vec<String>,
    rows: SkuAggregator,
}

/// Normalize and validate every row, aggregating the valid ones.
///
/// A read error aborts the whole pass; row-level problems are recorded and
/// skipped.
fn collect<E>(rows: impl IntoIterator<Item = Result<RawRecord, E>>) -> Result<Collected, E> {
    let mut collected = Collected::default();

    for (index, record) in rows.into_iter().enumerate() {
        let record = record?;
        collected.total += 1;

        match validate_row(normalize_row(&record)).into_canonical() {
            Ok(row) => collected.rows.push(row),
            Err(errors) => {
                let message = format!("Row {}: {}", index + 1, join_errors(&errors));
                tracing::warn!("{message}");
                collected.errors.push(message);
            }
        }
    }

    Ok(collected)
}

fn csv_failure(error: &ReadError, source: &str) -> String {
    match error {
        ReadError::Empty => format!("Failed reading CSV: CSV appears empty: {source}"),
        other => format!("Failed reading CSV: {other}"),
    }
}

fn fetch_failure(error: &FetchError) -> String {
    match error {
        FetchError::Status { status } => format!("API returned non-200: {status}"),
        other => format!("API call failed: {other}"),
    }
}

fn catalog_failure(mut result: SyncResult, error: &crate::catalog::CatalogError) -> SyncResult {
    let message = format!("Catalog error: {error}");
    tracing::error!(source = %result.source, "{message}");
    result.errors.push(message);
    result
}

use std::collections::HashSet;
use std::sync::Mutex;

use crate::{CanonicalRow, Catalog, CatalogError, FeedFetcher, FetchError, FetchedBody};

/// In-memory catalog for testing. Keeps rows in insertion order.
#[derive(Default)]
pub struct InMemoryCatalog {
    rows: Mutex<Vec<CanonicalRow>>,
    upsert_calls: Mutex<usize>,
    upsert_failure: Mutex<Option<String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: impl IntoIterator<Item = CanonicalRow>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn get(&self, sku: &str) -> Option<CanonicalRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.sku == sku)
            .cloned()
    }

    pub fn rows(&self) -> Vec<CanonicalRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn upsert_calls(&self) -> usize {
        *self.upsert_calls.lock().unwrap()
    }

    /// Make every later upsert fail with a database error.
    pub fn fail_upserts(&self, message: impl Into<String>) {
        *self.upsert_failure.lock().unwrap() = Some(message.into());
    }
}

#[async_trait::async_trait]
impl Catalog for InMemoryCatalog {
    async fn existing_skus(&self, skus: &[String]) -> Result<HashSet<String>, CatalogError> {
        let rows = self.rows.lock().unwrap();
        Ok(skus
            .iter()
            .filter(|sku| rows.iter().any(|r| &r.sku == *sku))
            .cloned()
            .collect())
    }

    async fn upsert_products(&self, incoming: &[CanonicalRow]) -> Result<(), CatalogError> {
        *self.upsert_calls.lock().unwrap() += 1;
        if let Some(message) = self.upsert_failure.lock().unwrap().clone() {
            return Err(CatalogError::Database(message));
        }

        let mut rows = self.rows.lock().unwrap();
        for row in incoming {
            match rows.iter_mut().find(|r| r.sku == row.sku) {
                Some(existing) => *existing = row.clone(),
                None => rows.push(row.clone()),
            }
        }
        Ok(())
    }
}

/// Fetcher that answers every request with the same canned outcome and
/// records what it was asked for.
pub struct StaticFetcher {
    outcome: Result<Vec<u8>, FetchError>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticFetcher {
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            outcome: Ok(body.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::body(r#"{"products":[]}"#)
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchedBody, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_owned(), token.map(str::to_owned)));

        self.outcome
            .clone()
            .map(|bytes| FetchedBody { bytes })
    }
}

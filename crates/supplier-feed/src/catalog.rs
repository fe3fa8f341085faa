use std::collections::HashSet;

use crate::product::CanonicalRow;

/// Columns overwritten when an upserted SKU already exists.
pub const UPSERT_COLUMNS: [&str; 7] = [
    "name",
    "description",
    "price",
    "currency",
    "stock",
    "incoming_stock",
    "supplier_name",
];

/// Errors reported by a catalog backend.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("{0}")]
    Other(String),
}

/// The persisted product catalog, keyed by SKU.
///
/// The sync pipeline only ever asks which SKUs exist and then writes all of
/// its rows in one bulk upsert. The backend owns everything else.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// The subset of `skus` already present in the catalog.
    async fn existing_skus(&self, skus: &[String]) -> Result<HashSet<String>, CatalogError>;

    /// Insert new SKUs and overwrite [`UPSERT_COLUMNS`] for existing ones.
    async fn upsert_products(&self, rows: &[CanonicalRow]) -> Result<(), CatalogError>;
}

#[async_trait::async_trait]
impl<T: Catalog + ?Sized> Catalog for std::sync::Arc<T> {
    async fn existing_skus(&self, skus: &[String]) -> Result<HashSet<String>, CatalogError> {
        (**self).existing_skus(skus).await
    }

    async fn upsert_products(&self, rows: &[CanonicalRow]) -> Result<(), CatalogError> {
        (**self).upsert_products(rows).await
    }
}

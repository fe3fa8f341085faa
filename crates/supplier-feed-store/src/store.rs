use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use supplier_feed::catalog::UPSERT_COLUMNS;
use supplier_feed::{CanonicalRow, Catalog, CatalogError};

use crate::schema;

/// SQLite caps bound parameters per statement; SKU lookups are chunked.
const SKU_CHUNK: usize = 500;

/// A product row as persisted, with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub product: CanonicalRow,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
}

/// One page of products ordered by name.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<StoredProduct>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl ProductPage {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1))
    }
}

/// A SQLite-backed product catalog that implements [`Catalog`].
pub struct ProductStore {
    conn: Mutex<rusqlite::Connection>,
}

impl ProductStore {
    /// Open a catalog backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = rusqlite::Connection::open(path).map_err(db_error)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = rusqlite::Connection::open_in_memory().map_err(db_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: rusqlite::Connection) -> Result<Self, CatalogError> {
        schema::migrations()
            .to_latest(&mut conn)
            .map_err(|e| CatalogError::Migration(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Other("catalog connection lock poisoned".into()))
    }

    /// Look up one product by SKU.
    pub fn find_by_sku(&self, sku: &str) -> Result<Option<StoredProduct>, CatalogError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT sku, name, description, price, currency, stock, incoming_stock,
                    supplier_name, created_at, updated_at
             FROM products
             WHERE sku = ?1",
            [sku],
            Self::row_to_product,
        );

        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    pub fn count(&self) -> Result<usize, CatalogError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .map_err(db_error)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Products ordered by name (then SKU), `per_page` at a time.
    /// Pages are 1-based; page 0 is treated as page 1.
    pub fn page(&self, page: usize, per_page: usize) -> Result<ProductPage, CatalogError> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = self.count()?;

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT sku, name, description, price, currency, stock, incoming_stock,
                        supplier_name, created_at, updated_at
                 FROM products
                 ORDER BY name, sku
                 LIMIT ?1 OFFSET ?2",
            )
            .map_err(db_error)?;

        let limit = i64::try_from(per_page).unwrap_or(i64::MAX);
        let offset = i64::try_from((page - 1).saturating_mul(per_page)).unwrap_or(i64::MAX);
        let products = stmt
            .query_map(rusqlite::params![limit, offset], Self::row_to_product)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;

        Ok(ProductPage {
            products,
            page,
            per_page,
            total,
        })
    }

    fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<StoredProduct> {
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        Ok(StoredProduct {
            product: CanonicalRow {
                sku: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                price: row.get(3)?,
                currency: row.get(4)?,
                stock: row.get(5)?,
                incoming_stock: row.get(6)?,
                supplier_name: row.get(7)?,
            },
            created_at: created_at.parse().unwrap_or(0),
            updated_at: updated_at.parse().unwrap_or(0),
        })
    }
}

#[async_trait::async_trait]
impl Catalog for ProductStore {
    async fn existing_skus(&self, skus: &[String]) -> Result<HashSet<String>, CatalogError> {
        let conn = self.lock()?;
        let mut existing = HashSet::new();

        for chunk in skus.chunks(SKU_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT sku FROM products WHERE sku IN ({placeholders})");

            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let found = stmt
                .query_map(rusqlite::params_from_iter(chunk), |row| row.get::<_, String>(0))
                .map_err(db_error)?;

            for sku in found {
                existing.insert(sku.map_err(db_error)?);
            }
        }

        Ok(existing)
    }

    /// Writes every row in one transaction. `created_at` is only set on
    /// insert; conflicts overwrite [`UPSERT_COLUMNS`] and `updated_at`.
    async fn upsert_products(&self, rows: &[CanonicalRow]) -> Result<(), CatalogError> {
        let mut conn = self.lock()?;
        let now = now_epoch_secs();

        let assignments = UPSERT_COLUMNS
            .iter()
            .chain(std::iter::once(&"updated_at"))
            .map(|col| format!("{col} = excluded.{col}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO products
                (sku, name, description, price, currency, stock, incoming_stock,
                 supplier_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(sku) DO UPDATE SET {assignments}"
        );

        let tx = conn.transaction().map_err(db_error)?;
        {
            let mut stmt = tx.prepare(&sql).map_err(db_error)?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.sku,
                    row.name,
                    row.description,
                    row.price,
                    row.currency,
                    row.stock,
                    row.incoming_stock,
                    row.supplier_name,
                    now,
                ])
                .map_err(db_error)?;
            }
        }
        tx.commit().map_err(db_error)?;

        tracing::debug!(rows = rows.len(), "upserted products");
        Ok(())
    }
}

fn db_error(e: rusqlite::Error) -> CatalogError {
    CatalogError::Database(e.to_string())
}

fn now_epoch_secs() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now.to_string()
}

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use supplier_feed::test_support::StaticFetcher;
use supplier_feed::{CanonicalRow, Catalog, CatalogError, SupplierSync};
use supplier_feed_store::ProductStore;

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn create_sync() -> (Arc<ProductStore>, SupplierSync) {
    let store = Arc::new(ProductStore::open_in_memory().unwrap());
    let sync = SupplierSync::new(store.clone(), Arc::new(StaticFetcher::empty()));
    (store, sync)
}

const FEED: &str = "\u{feff}SKU;Product Name;Price;Currency;Stock;Incoming Qty;Supplier\n\
A-1;Widget;9.99;eur;10;3;Acme\n\
A-2;Gadget;4.50;USD;1;0;Acme\n\
A-1;Widget (dup);;;8;4;\n\
;Orphan;1;USD;1;1;Acme\n";

#[tokio::test]
async fn csv_sync_populates_catalog() {
    let (store, sync) = create_sync();
    let file = csv_file(FEED);

    let result = sync.sync_from_file(file.path(), None).await;
    assert_eq!(result.total, 4);
    assert_eq!(result.inserted, 2);
    assert_eq!(result.updated, 0);
    assert_eq!(result.errors, vec!["Row 4: Missing required field: sku"]);

    let widget = store.find_by_sku("A-1").unwrap().unwrap().product;
    assert_eq!(widget.name, "Widget");
    assert_eq!(widget.price, Some(9.99));
    assert_eq!(widget.currency, "EUR");
    assert_eq!(widget.stock, 8);
    assert_eq!(widget.incoming_stock, 7);
    assert_eq!(widget.supplier_name.as_deref(), Some("Acme"));
    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test]
async fn resync_is_idempotent() {
    let (store, sync) = create_sync();
    let file = csv_file(FEED);

    sync.sync_from_file(file.path(), None).await;
    let before: Vec<CanonicalRow> = store
        .page(1, 10)
        .unwrap()
        .products
        .into_iter()
        .map(|p| p.product)
        .collect();

    let second = sync.sync_from_file(file.path(), None).await;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);

    let after: Vec<CanonicalRow> = store
        .page(1, 10)
        .unwrap()
        .products
        .into_iter()
        .map(|p| p.product)
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn later_feed_updates_only_upsert_columns() {
    let (store, sync) = create_sync();

    let first = csv_file("sku,name,price,stock\nA-1,Widget,9.99,10\n");
    sync.sync_from_file(first.path(), None).await;
    let created_at = store.find_by_sku("A-1").unwrap().unwrap().created_at;

    let second = csv_file("sku,name,stock\nA-1,Widget Mk2,3\nB-1,Bolt,1\n");
    let result = sync.sync_from_file(second.path(), None).await;
    assert_eq!(result.inserted, 1);
    assert_eq!(result.updated, 1);

    let stored = store.find_by_sku("A-1").unwrap().unwrap();
    assert_eq!(stored.product.name, "Widget Mk2");
    assert_eq!(stored.product.price, None);
    assert_eq!(stored.product.stock, 3);
    assert_eq!(stored.created_at, created_at);
}

#[tokio::test]
async fn missing_file_leaves_catalog_untouched() {
    let (store, sync) = create_sync();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");

    let result = sync.sync_from_file(&path, None).await;
    assert_eq!(result.total, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("missing.csv"));
    assert_eq!(store.count().unwrap(), 0);
}

/// Another writer that lands between the existence check and the upsert.
struct RacingCatalog {
    inner: Arc<ProductStore>,
    interloper: CanonicalRow,
}

#[async_trait::async_trait]
impl Catalog for RacingCatalog {
    async fn existing_skus(&self, skus: &[String]) -> Result<HashSet<String>, CatalogError> {
        let existing = self.inner.existing_skus(skus).await?;
        self.inner
            .upsert_products(std::slice::from_ref(&self.interloper))
            .await?;
        Ok(existing)
    }

    async fn upsert_products(&self, rows: &[CanonicalRow]) -> Result<(), CatalogError> {
        self.inner.upsert_products(rows).await
    }
}

// Known race: counts come from a read taken before the concurrent write, so
// they are stale. The rows themselves end up last-writer-wins.
#[tokio::test]
async fn concurrent_writer_makes_counts_stale_but_rows_correct() {
    let store = Arc::new(ProductStore::open_in_memory().unwrap());
    let catalog = Arc::new(RacingCatalog {
        inner: store.clone(),
        interloper: CanonicalRow::new("A-1", "From other feed"),
    });
    let sync = SupplierSync::new(catalog, Arc::new(StaticFetcher::empty()));
    let file = csv_file("sku,name\nA-1,Widget\nA-2,Gadget\n");

    let result = sync.sync_from_file(file.path(), None).await;

    assert_eq!(result.inserted, 2);
    assert_eq!(result.updated, 0);
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.find_by_sku("A-1").unwrap().unwrap().product.name, "Widget");
}

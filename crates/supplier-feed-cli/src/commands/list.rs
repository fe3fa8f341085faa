use anyhow::Result;
use supplier_feed_store::ProductStore;

use super::format;

pub fn run(store: &ProductStore, page: usize, per_page: usize, json: bool) -> Result<()> {
    let page = store.page(page, per_page)?;

    if json {
        let products: Vec<_> = page.products.iter().map(|p| &p.product).collect();
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    format::print_product_table(&page);
    Ok(())
}

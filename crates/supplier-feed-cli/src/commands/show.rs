use anyhow::{Result, bail};
use supplier_feed_store::ProductStore;

use super::format;

pub fn run(store: &ProductStore, sku: &str, json: bool) -> Result<()> {
    let Some(stored) = store.find_by_sku(sku)? else {
        bail!("Product not found: {sku}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stored.product)?);
    } else {
        format::print_product(&stored);
    }

    Ok(())
}

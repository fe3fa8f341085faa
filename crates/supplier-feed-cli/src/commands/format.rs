use supplier_feed::SyncResult;
use supplier_feed_store::{ProductPage, StoredProduct};

const MAX_NAME_WIDTH: usize = 35;
const SKU_WIDTH: usize = 16;

pub fn print_result(result: &SyncResult) {
    print!("{}", render_result(result));
}

pub fn print_product_table(page: &ProductPage) {
    print!("{}", render_product_table(page));
}

pub fn print_product(stored: &StoredProduct) {
    print!("{}", render_product(stored));
}

/// Summary line followed by one indented line per error.
fn render_result(result: &SyncResult) -> String {
    let mut out = format!("{result}\n");
    for error in &result.errors {
        out.push_str(&format!("  {error}\n"));
    }
    out
}

fn render_product_table(page: &ProductPage) -> String {
    if page.products.is_empty() {
        return format!("No products on page {} ({} total)\n", page.page, page.total);
    }

    let name_width = page
        .products
        .iter()
        .map(|p| p.product.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    let mut out = String::new();
    for stored in &page.products {
        let p = &stored.product;
        out.push_str(&format!(
            "  {:<sku_w$}  {:<name_w$}  {:>10}  {:>6}  {:>6}\n",
            truncate(&p.sku, SKU_WIDTH),
            truncate(&p.name, name_width),
            price_label(p.price, &p.currency),
            p.stock,
            p.incoming_stock,
            sku_w = SKU_WIDTH,
            name_w = name_width,
        ));
    }

    out.push_str(&format!(
        "\nPage {} of {} ({} products)\n",
        page.page,
        page.page_count().max(1),
        page.total
    ));
    out
}

fn render_product(stored: &StoredProduct) -> String {
    let p = &stored.product;
    let mut out = String::new();

    out.push_str(&format!("SKU:         {}\n", p.sku));
    out.push_str(&format!("Name:        {}\n", p.name));
    if let Some(desc) = &p.description {
        out.push_str(&format!("Description: {desc}\n"));
    }
    out.push_str(&format!("Price:       {}\n", price_label(p.price, &p.currency)));
    out.push_str(&format!("Stock:       {}\n", p.stock));
    out.push_str(&format!("Incoming:    {}\n", p.incoming_stock));
    if let Some(supplier) = &p.supplier_name {
        out.push_str(&format!("Supplier:    {supplier}\n"));
    }
    out.push_str(&format!("Updated:     {}\n", stored.updated_at));
    out
}

fn price_label(price: Option<f64>, currency: &str) -> String {
    match price {
        Some(price) => format!("{price:.2} {currency}"),
        None => "-".to_owned(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

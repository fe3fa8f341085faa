use std::collections::HashMap;

use crate::product::CanonicalRow;

/// Collapses rows that share a SKU within one feed.
///
/// Merge rules when a SKU repeats:
/// - `name`, `description`, `price`, `currency`, `supplier_name`: the first
///   non-empty value is kept.
/// - `stock`: the latest row's value replaces the accumulated one.
/// - `incoming_stock`: summed across every row.
///
/// SKUs are yielded in the order they were first seen.
#[derive(Debug, Default)]
pub struct SkuAggregator {
    rows: Vec<CanonicalRow>,
    index: HashMap<String, usize>,
}

impl SkuAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: CanonicalRow) {
        match self.index.get(&row.sku) {
            Some(&slot) => merge(&mut self.rows[slot], row),
            None => {
                self.index.insert(row.sku.clone(), self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// Number of distinct SKUs seen so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn skus(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.sku.clone()).collect()
    }

    pub fn into_rows(self) -> Vec<CanonicalRow> {
        self.rows
    }
}

impl Extend<CanonicalRow> for SkuAggregator {
    fn extend<I: IntoIterator<Item = CanonicalRow>>(&mut self, iter: I) {
        for row in iter {
            self.push(row);
        }
    }
}

impl FromIterator<CanonicalRow> for SkuAggregator {
    fn from_iter<I: IntoIterator<Item = CanonicalRow>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

fn merge(acc: &mut CanonicalRow, incoming: CanonicalRow) {
    if acc.name.is_empty() && !incoming.name.is_empty() {
        acc.name = incoming.name;
    }
    if acc.currency.is_empty() && !incoming.currency.is_empty() {
        acc.currency = incoming.currency;
    }
    fill_if_empty(&mut acc.description, incoming.description);
    fill_if_empty(&mut acc.supplier_name, incoming.supplier_name);
    if acc.price.is_none() {
        acc.price = incoming.price;
    }

    acc.stock = incoming.stock;
    acc.incoming_stock = acc.incoming_stock.saturating_add(incoming.incoming_stock);
}

fn fill_if_empty(slot: &mut Option<String>, incoming: Option<String>) {
    let empty = slot.as_deref().is_none_or(str::is_empty);
    if empty && let Some(value) = incoming.filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}

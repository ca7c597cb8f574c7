//! Working List Ordering

use std::cmp::Ordering;

use crate::models::{Item, SortKey};

/// Three-way comparison of two items on `key`. Prices use the IEEE total
/// order, so the comparison stays total for any `f64`.
pub fn compare(a: &Item, b: &Item, key: SortKey) -> Ordering {
    match key {
        SortKey::ByName => a.name.cmp(&b.name),
        SortKey::ByPrice => a.price.total_cmp(&b.price),
    }
}

/// Stable ascending sort; ties keep their snapshot order
pub fn sort_items(items: &mut [Item], key: SortKey) {
    items.sort_by(|a, b| compare(a, b, key));
}

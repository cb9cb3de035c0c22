//! Joins a persona's behavior record against the catalog.

use std::collections::HashMap;

use serde::Serialize;
use shared::domain::{BehaviorRecord, Product, ProductId};

/// Viewed and purchased products resolved to full catalog entries, in behavior order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityView {
    pub viewed: Vec<Product>,
    pub purchased: Vec<Product>,
}

/// Resolves every id in `behavior` against `catalog`.
///
/// Ids missing from the catalog are dropped without error, which is what happens for
/// every id while the catalog is empty after a failed load. Duplicate ids resolve once
/// per occurrence. When the catalog itself holds duplicate ids the first entry wins.
pub fn resolve_activity(catalog: &[Product], behavior: &BehaviorRecord) -> ActivityView {
    let mut index: HashMap<&ProductId, &Product> = HashMap::with_capacity(catalog.len());
    for product in catalog {
        index.entry(&product.id).or_insert(product);
    }

    ActivityView {
        viewed: resolve_ids(&index, &behavior.viewed),
        purchased: resolve_ids(&index, &behavior.purchased),
    }
}

fn resolve_ids(index: &HashMap<&ProductId, &Product>, ids: &[ProductId]) -> Vec<Product> {
    ids.iter()
        .filter_map(|id| index.get(id).map(|product| (*product).clone()))
        .collect()
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;

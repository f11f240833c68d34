//! Start-up population of the order store.

use super::config::SeedSource;
use anyhow::Context;
use ordermgt_core::{OrderStore, proto::Order};
use std::path::Path;

/// Builds the store described by `source`.
///
/// # Errors
///
/// Fails if a seed file cannot be read or is not a JSON array of orders.
pub fn load_store(source: &SeedSource) -> anyhow::Result<OrderStore> {
    let store = match source {
        SeedSource::Empty => OrderStore::new(),
        SeedSource::SampleData => OrderStore::with_sample_data(),
        SeedSource::File(path) => OrderStore::from_orders(read_seed_file(path)?),
    };

    tracing::info!(orders = store.len(), "Order store initialized");
    Ok(store)
}

fn read_seed_file(path: &Path) -> anyhow::Result<Vec<Order>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not a JSON array of orders", path.display()))
}

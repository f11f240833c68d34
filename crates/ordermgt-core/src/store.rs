//! In-memory order store shared by every RPC.
//!
//! [`OrderStore`] maps order identifiers to [`Order`] records behind a single
//! [`parking_lot::Mutex`]. Every read and write is serialized through that
//! lock, and no guard ever escapes a method, so callers can hold a reference
//! to the store across `.await` points without holding the lock.
//!
//! Reads always return copies. The store may be overwritten at any time, so
//! nothing outside this module ever observes a live entry.

use crate::{
    Error, Result,
    proto::Order,
    types::sample_orders,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-wide mapping of order identifier to [`Order`].
///
/// Last writer wins: [`put`](Self::put) overwrites silently.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: Mutex<HashMap<String, Order>>,
}

impl OrderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `orders`. Later duplicates win.
    pub fn from_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        let store = Self::new();
        for order in orders {
            store.put(order);
        }
        store
    }

    /// Creates a store seeded with [`sample_orders`].
    pub fn with_sample_data() -> Self {
        Self::from_orders(sample_orders())
    }

    /// Inserts or overwrites `order`, returning the previous record if any.
    pub fn put(&self, order: Order) -> Option<Order> {
        self.orders.lock().insert(order.id.clone(), order)
    }

    /// Returns a copy of the order stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` was never stored.
    pub fn get(&self, id: &str) -> Result<Order> {
        self.orders
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    /// Returns a copy of the order stored under `id`, or a placeholder that
    /// only carries `id` (and therefore an empty destination) when absent.
    ///
    /// Used by shipment consolidation, which does not validate references.
    /// The placeholder is not a zero-value `Order`: it keeps the referenced
    /// `id`, so the emitted shipment still names the unknown reference.
    pub fn resolve(&self, id: &str) -> Order {
        self.get(id).unwrap_or_else(|_| Order {
            id: id.to_string(),
            ..Order::default()
        })
    }

    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.lock().is_empty()
    }

    /// Lazily scans the store for orders with an item containing `query`.
    ///
    /// The set of identifiers is captured when the scan starts; each order is
    /// then looked up and tested only when the iterator is advanced, so a slow
    /// consumer never holds the lock. Every call starts a fresh scan. Orders
    /// removed or overwritten mid-scan are seen in their current state.
    ///
    /// Iteration order follows the underlying map and is not stable.
    pub fn search<'a>(&'a self, query: &'a str) -> Search<'a> {
        let ids: Vec<String> = self.orders.lock().keys().cloned().collect();
        Search {
            store: self,
            query,
            ids: ids.into_iter(),
        }
    }
}

/// Iterator returned by [`OrderStore::search`].
#[derive(Debug)]
pub struct Search<'a> {
    store: &'a OrderStore,
    query: &'a str,
    ids: std::vec::IntoIter<String>,
}

impl Iterator for Search<'_> {
    type Item = Order;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            let orders = self.store.orders.lock();
            if let Some(order) = orders.get(&id) {
                if order.has_item_matching(self.query) {
                    return Some(order.clone());
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

//! # Domain Constants and Helpers
//!
//! Values shared by the server, the client and the consolidation engine, so
//! both sides of the wire agree on naming without re-declaring literals.
//!
//! ## Constants
//!
//! - [`INVALID_ORDER_ID`] - Identifier clients send to exercise the
//!   invalid-argument path of `AddOrder`.
//! - [`SHIPMENT_STATUS`] - Status tag stamped on every combined shipment.
//! - [`SHIPMENT_ID_PREFIX`] - Prefix of the destination-derived shipment id.
//! - [`DEFAULT_BATCH_SIZE`] - Default consolidation threshold.
//!
//! ## Demonstration data
//!
//! [`sample_orders`] returns the five orders the server seeds on start-up
//! unless told otherwise.

use crate::proto::Order;
use core::num::NonZeroUsize;

/// Sentinel order identifier that `AddOrder` always rejects.
pub const INVALID_ORDER_ID: &str = "-1";

/// Status carried by every [`CombinedShipment`](crate::proto::CombinedShipment).
pub const SHIPMENT_STATUS: &str = "Processed!";

/// Prefix prepended to the destination to form a shipment identifier.
pub const SHIPMENT_ID_PREFIX: &str = "cmb - ";

/// Number of accepted references after which an epoch is flushed.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Deterministic shipment identifier for a destination.
pub fn shipment_id(destination: &str) -> String {
    format!("{SHIPMENT_ID_PREFIX}{destination}")
}

impl Order {
    /// Returns `true` if any item name contains `query` as a substring.
    ///
    /// Stops at the first matching item.
    pub fn has_item_matching(&self, query: &str) -> bool {
        self.items.iter().any(|item| item.contains(query))
    }
}

fn order(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
    Order {
        id: id.to_string(),
        items: items.iter().map(|item| (*item).to_string()).collect(),
        description: String::new(),
        price,
        destination: destination.to_string(),
    }
}

/// The demonstration dataset seeded into a fresh server.
pub fn sample_orders() -> Vec<Order> {
    vec![
        order(
            "102",
            &["Google Pixel 3A", "Mac Book Pro"],
            "Mountain View, CA",
            1800.00,
        ),
        order("103", &["Apple Watch S4"], "San Jose, CA", 400.00),
        order(
            "104",
            &["Google Home Mini", "Google Nest Hub"],
            "Mountain View, CA",
            400.00,
        ),
        order("105", &["Amazon Echo"], "San Jose, CA", 30.00),
        order(
            "106",
            &["Amazon Echo", "Apple iPhone XS"],
            "Mountain View, CA",
            300.00,
        ),
    ]
}

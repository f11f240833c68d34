//! Order operations behind the unary and client-streamed RPCs.
//!
//! - [`add_order`] validates and stores a single order.
//! - [`get_order`] returns a copy of a stored order.
//! - [`update_orders`] drains a stream of orders into the store and reports
//!   the identifiers it processed.

use crate::{
    Error, Result,
    proto::Order,
    store::OrderStore,
    types::INVALID_ORDER_ID,
};
use core::fmt;
use futures::{Stream, StreamExt, pin_mut};

/// Stores `order` and returns the confirmation sent back to the caller.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for the sentinel identifier
/// [`INVALID_ORDER_ID`]. The store is left untouched in that case.
pub fn add_order(store: &OrderStore, order: Order) -> Result<String> {
    if order.id == INVALID_ORDER_ID {
        tracing::info!(order_id = %order.id, "Order ID is invalid");
        return Err(Error::InvalidArgument {
            field: "ID".to_string(),
            description: format!(
                "Order ID received is not valid {} : {}",
                order.id, order.description
            ),
        });
    }

    let confirmation = format!("Order Added: {}", order.id);
    tracing::info!(order_id = %order.id, "Order added");
    store.put(order);
    Ok(confirmation)
}

/// Returns a copy of the order stored under `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] carrying `id` when nothing is stored under it.
pub fn get_order(store: &OrderStore, id: &str) -> Result<Order> {
    store.get(id)
}

/// Identifiers processed by one [`update_orders`] call, in arrival order.
///
/// Displays as the summary string returned to the client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    ids: Vec<String>,
}

impl UpdateSummary {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl fmt::Display for UpdateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Orders processed Updated Order IDs : {}",
            self.ids.join(", ")
        )
    }
}

/// Upserts every order from `inbound` until end-of-stream.
///
/// Each order is written as soon as it arrives; the summary is produced only
/// after the stream ends.
///
/// # Errors
///
/// The first read failure aborts the call and is returned as-is (converted
/// into [`Error`]). Orders stored before the failure stay stored.
pub async fn update_orders<S, E>(store: &OrderStore, inbound: S) -> Result<UpdateSummary>
where
    S: Stream<Item = core::result::Result<Order, E>>,
    Error: From<E>,
{
    pin_mut!(inbound);
    let mut summary = UpdateSummary::default();

    while let Some(order) = inbound.next().await {
        let order = order?;
        tracing::debug!(order_id = %order.id, "Order updated");
        summary.ids.push(order.id.clone());
        store.put(order);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tonic::{Code, Status};

    fn order(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
        Order {
            id: id.to_string(),
            items: items.iter().map(|s| (*s).to_string()).collect(),
            destination: destination.to_string(),
            price,
            ..Order::default()
        }
    }

    #[test]
    fn add_then_get_round_trips() {
        let store = OrderStore::new();
        let confirmation =
            add_order(&store, order("101", &["iPhone XS"], "San Jose, CA", 2300.0)).unwrap();
        assert_eq!(confirmation, "Order Added: 101");

        let stored = get_order(&store, "101").unwrap();
        assert_eq!(stored.items, vec!["iPhone XS".to_string()]);
        assert_eq!(stored.price, 2300.0);
    }

    #[test]
    fn add_sentinel_is_rejected_without_mutation() {
        let store = OrderStore::with_sample_data();
        let mut bad = order(INVALID_ORDER_ID, &["x"], "Nowhere", 1.0);
        bad.description = "broken".to_string();

        match add_order(&store, bad) {
            Err(Error::InvalidArgument { field, description }) => {
                assert_eq!(field, "ID");
                assert_eq!(description, "Order ID received is not valid -1 : broken");
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert_eq!(store.len(), 5);
        assert!(store.get(INVALID_ORDER_ID).is_err());
    }

    #[test]
    fn add_overwrites_existing_order() {
        let store = OrderStore::with_sample_data();
        add_order(&store, order("102", &["Google Pixel Book"], "Palo Alto, CA", 1.0)).unwrap();
        let stored = get_order(&store, "102").unwrap();
        assert_eq!(stored.destination, "Palo Alto, CA");
    }

    #[tokio::test]
    async fn update_reports_ids_in_arrival_order() {
        let store = OrderStore::with_sample_data();
        let inbound = stream::iter(vec![
            Ok::<_, Status>(order("104", &["Google Home Mini", "iPad Mini"], "Mountain View, CA", 2200.0)),
            Ok(order("102", &["Google Pixel 3A", "Google Pixel Book"], "Mountain View, CA", 1100.0)),
            Ok(order("200", &["Kindle"], "Sunnyvale, CA", 90.0)),
        ]);

        let summary = update_orders(&store, inbound).await.unwrap();
        assert_eq!(summary.ids(), ["104", "102", "200"]);
        assert_eq!(
            summary.to_string(),
            "Orders processed Updated Order IDs : 104, 102, 200"
        );

        assert_eq!(store.get("102").unwrap().price, 1100.0);
        assert_eq!(store.get("200").unwrap().destination, "Sunnyvale, CA");
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn update_with_empty_stream_returns_empty_summary() {
        let store = OrderStore::new();
        let summary = update_orders(&store, stream::empty::<core::result::Result<Order, Status>>())
            .await
            .unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.to_string(), "Orders processed Updated Order IDs : ");
    }

    #[tokio::test]
    async fn update_read_failure_aborts_without_summary() {
        let store = OrderStore::new();
        let inbound = stream::iter(vec![
            Ok(order("1", &["a"], "X", 1.0)),
            Err(Status::aborted("connection reset")),
            Ok(order("2", &["b"], "X", 1.0)),
        ]);

        match update_orders(&store, inbound).await {
            Err(Error::Transport(status)) => {
                assert_eq!(status.code(), Code::Aborted);
                assert_eq!(status.message(), "connection reset");
            }
            other => panic!("expected Transport error, got {other:?}"),
        }
        // Applied writes are not rolled back; nothing after the failure lands.
        assert!(store.get("1").is_ok());
        assert!(store.get("2").is_err());
    }
}

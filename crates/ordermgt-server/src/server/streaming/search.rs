use super::surface;
use ordermgt_core::{Error, OrderStore, proto::Order};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// Streams every order matching `query` into `resp_tx`, one at a time.
///
/// The store is scanned lazily: the next order is only looked up once the
/// previous one has been accepted by the channel. Returns the number of
/// orders sent.
///
/// # Behavior
///
/// - Stops when the client disconnects (the channel closes).
/// - Stops when `cancel` fires. The stream then ends with `UNAVAILABLE` so the
///   client can tell the result is incomplete.
/// - An empty result is simply an empty stream.
pub async fn feed_search(
    store: Arc<OrderStore>,
    query: String,
    resp_tx: mpsc::Sender<Result<Order, Status>>,
    cancel: CancellationToken,
) -> usize {
    let mut sent = 0;

    for order in store.search(&query) {
        let order_id = order.id.clone();

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("Search cancelled after {sent} matches");
                surface(&resp_tx, &cancel, &Error::ServiceShutdown).await;
                break;
            }
            res = resp_tx.send(Ok(order)) => {
                if let Err(_e) = res {
                    tracing::debug!("Client went away, stopping search: {_e}");
                    break;
                }
                tracing::debug!(order_id = %order_id, "Matching order found");
                sent += 1;
            }
        }
    }

    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tonic::Code;

    #[tokio::test]
    async fn sends_each_match_once() {
        let store = Arc::new(OrderStore::with_sample_data());
        let (tx, mut rx) = mpsc::channel(1);

        let task = tokio::spawn(feed_search(
            Arc::clone(&store),
            "Google".to_string(),
            tx,
            CancellationToken::new(),
        ));

        let mut ids = HashSet::new();
        while let Some(order) = rx.recv().await {
            assert!(ids.insert(order.unwrap().id));
        }

        assert_eq!(task.await.unwrap(), 2);
        assert_eq!(ids, HashSet::from(["102".to_string(), "104".to_string()]));
    }

    #[tokio::test]
    async fn no_match_closes_immediately() {
        let store = Arc::new(OrderStore::with_sample_data());
        let (tx, mut rx) = mpsc::channel(1);

        let sent = feed_search(store, "Nokia".to_string(), tx, CancellationToken::new()).await;
        assert_eq!(sent, 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stops_when_client_disconnects() {
        let store = Arc::new(OrderStore::with_sample_data());
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sent = feed_search(store, String::new(), tx, CancellationToken::new()).await;
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn cancellation_ends_with_unavailable() {
        let store = Arc::new(OrderStore::with_sample_data());
        // Capacity 1 and nobody reading: the second send would block forever.
        let (tx, mut rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(feed_search(store, String::new(), tx, cancel.clone()));
        tokio::task::yield_now().await;
        cancel.cancel();

        assert!(rx.recv().await.unwrap().is_ok());
        let status = rx.recv().await.unwrap().unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
        assert!(rx.recv().await.is_none());

        assert_eq!(task.await.unwrap(), 1);
    }
}

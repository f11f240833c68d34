use super::surface;
use crate::server::telemetry::add_shipments_emitted;
use core::num::NonZeroUsize;
use futures::{Stream, StreamExt, pin_mut};
use ordermgt_core::{Error, OrderStore, Result, ShipmentConsolidator, proto::CombinedShipment};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// Drives one `ProcessOrders` stream through a [`ShipmentConsolidator`].
///
/// Each inbound order identifier is resolved against the store (unknown ids
/// become placeholders with an empty destination) and handed to the engine.
/// Whenever an epoch completes, its combined shipments are forwarded to
/// `resp_tx` before the next identifier is read. On end-of-input, the partial
/// epoch is flushed and the response stream closes when `resp_tx` drops.
///
/// Returns the total number of shipments emitted.
///
/// # Errors
///
/// - A failed inbound read discards the partial epoch. The read error is
///   forwarded to the client, after any shipments already queued, and
///   returned.
/// - Cancellation discards the partial epoch and returns
///   [`Error::ServiceShutdown`].
/// - A closed response channel returns [`Error::ChannelError`].
pub async fn feed_shipments<S, E>(
    store: Arc<OrderStore>,
    batch_size: NonZeroUsize,
    inbound: S,
    resp_tx: mpsc::Sender<core::result::Result<CombinedShipment, Status>>,
    cancel: CancellationToken,
) -> Result<usize>
where
    S: Stream<Item = core::result::Result<String, E>>,
    Error: From<E>,
{
    pin_mut!(inbound);
    let mut engine = ShipmentConsolidator::new(batch_size);
    let mut emitted = 0;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let dropped = engine.abort();
                tracing::debug!(dropped, "Shipment stream cancelled");
                surface(&resp_tx, &cancel, &Error::ServiceShutdown).await;
                return Err(Error::ServiceShutdown);
            }
            next = inbound.next() => next,
        };

        match next {
            Some(Ok(order_id)) => {
                tracing::debug!(order_id = %order_id, "Reading order reference");
                let order = store.resolve(&order_id);
                if let Some(batch) = engine.accept(order)? {
                    emitted += forward(&resp_tx, &cancel, batch).await?;
                }
            }
            Some(Err(e)) => {
                let err = Error::from(e);
                let dropped = engine.abort();
                tracing::warn!(dropped, "Inbound stream failed, dropping partial epoch: {err}");
                surface(&resp_tx, &cancel, &err).await;
                return Err(err);
            }
            None => {
                let batch = engine.finish()?;
                emitted += forward(&resp_tx, &cancel, batch).await?;
                tracing::debug!(emitted, "Inbound stream closed");
                return Ok(emitted);
            }
        }
    }
}

/// Sends one flush, in order, suspending while the client is behind.
async fn forward(
    resp_tx: &mpsc::Sender<core::result::Result<CombinedShipment, Status>>,
    cancel: &CancellationToken,
    batch: Vec<CombinedShipment>,
) -> Result<usize> {
    let count = batch.len();

    for shipment in batch {
        tracing::debug!(
            shipment_id = %shipment.id,
            orders = shipment.orders_list.len(),
            "Shipping"
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                surface(resp_tx, cancel, &Error::ServiceShutdown).await;
                return Err(Error::ServiceShutdown);
            }
            res = resp_tx.send(Ok(shipment)) => {
                res.map_err(|e| Error::ChannelError {
                    context: format!("Failed to forward shipment: {e}"),
                })?;
            }
        }
    }

    add_shipments_emitted(count);
    Ok(count)
}

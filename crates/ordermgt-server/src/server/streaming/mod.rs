//! Background tasks that feed server-streamed responses.
//!
//! Each streaming RPC spawns one task that writes into a bounded
//! [`mpsc`](tokio::sync::mpsc) channel whose receiver becomes the gRPC
//! response stream. The channel capacity is the backpressure window: when the
//! client stops reading, the task suspends on `send`.
//!
//! - [`search`] - Feeds `SearchOrders` matches.
//! - [`shipments`] - Drives a [`ShipmentConsolidator`] for `ProcessOrders`.
//!
//! Both stop early when the client disconnects or the service-wide
//! cancellation token fires. A stream that stops for any reason other than
//! the client going away ends with an error status, delivered through
//! [`surface`], so a truncated result is never reported as `OK`.
//!
//! [`ShipmentConsolidator`]: ordermgt_core::ShipmentConsolidator

pub mod search;
pub mod shipments;

use core::time::Duration;
use ordermgt_core::Error;
use tokio::{sync::mpsc, time::sleep};
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// How long a terminal error may wait for buffer space once `cancel` fires.
pub const CANCELLED_SEND_GRACE: Duration = Duration::from_secs(1);

/// Delivers `err` as the final item of a response stream.
///
/// Waits for room in the channel like any other message, so a client that is
/// behind still receives the error after the messages queued before it. The
/// wait ends [`CANCELLED_SEND_GRACE`] after `cancel` fires.
pub async fn surface<T>(
    resp_tx: &mpsc::Sender<Result<T, Status>>,
    cancel: &CancellationToken,
    err: &Error,
) {
    let give_up = async {
        cancel.cancelled().await;
        sleep(CANCELLED_SEND_GRACE).await;
    };

    tokio::select! {
        biased;
        res = resp_tx.send(Err(err.clone().into())) => {
            if let Err(_e) = res {
                tracing::debug!("Client went away before terminal error: {err}");
            }
        }
        () = give_up => {
            tracing::warn!("Client stopped reading, terminal error dropped: {err}");
        }
    }
}

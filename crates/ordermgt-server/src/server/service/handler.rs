//! gRPC service implementation for order management.
//!
//! This module defines [`OrderService`], the concrete implementation of the
//! [`OrderManagement`] service from `ecommerce.proto`.
//!
//! ## Responsibilities
//!
//! - Delegate unary and client-streamed calls to the order operations in
//!   `ordermgt-core`.
//! - Spawn one background task per server-streamed call ([`feed_search`],
//!   [`feed_shipments`]) connected to the response through a bounded channel.
//! - Refuse new streams during shutdown, drain running ones, then cancel the
//!   stragglers.

use crate::server::{
    config::ServerConfig,
    service::StreamTracker,
    streaming::{search::feed_search, shipments::feed_shipments},
    telemetry::{add_orders_updated, add_search_matches, increment_orders_added, increment_stream_errors},
};
use core::{pin::Pin, time::Duration};
use ordermgt_core::{
    Error, OrderStore,
    middleware::LoggedStream,
    proto::{CombinedShipment, Order, order_management_server::OrderManagement},
};
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
};
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

/// Order management service backed by a shared in-memory [`OrderStore`].
///
/// Cloning is cheap: clones share the store, the stream tracker and the
/// shutdown token.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<OrderStore>,
    config: ServerConfig,
    streams: Arc<StreamTracker>,
    shutdown_token: CancellationToken,
}

impl OrderService {
    pub fn new(store: Arc<OrderStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config,
            streams: Arc::new(StreamTracker::new()),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }

    /// Number of streaming RPCs currently running.
    pub fn streams_inflight(&self) -> usize {
        self.streams.inflight()
    }

    /// Gracefully stops all streaming work.
    ///
    /// - Refuses new streams with `UNAVAILABLE`.
    /// - Waits up to `shutdown_timeout` seconds for running streams to finish.
    /// - Cancels whatever is still running. Cancelled `ProcessOrders` streams
    ///   drop their partial epoch.
    pub async fn shutdown(&self) {
        // === Phase 0: Stop accepting new streams ===
        tracing::info!("Refusing new streams");
        self.streams.begin_drain();

        // === Phase 1: Wait for in-flight streams to drain ===
        tracing::info!(
            "Draining in-flight streams ({} active)",
            self.streams.inflight()
        );
        let drain_result = timeout(Duration::from_secs(self.config.shutdown_timeout), async {
            while self.streams.inflight() > 0 {
                sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        match drain_result {
            Ok(()) => tracing::debug!("All in-flight streams drained successfully"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} streams still active)",
                self.streams.inflight()
            ),
        }

        // === Phase 2: Cancel any remaining work ===
        tracing::debug!("Cancelling remaining streams via shutdown token");
        self.shutdown_token.cancel();

        tracing::info!("Order service shutdown complete");
    }
}

#[tonic::async_trait]
impl OrderManagement for OrderService {
    type SearchOrdersStream = Pin<Box<dyn Stream<Item = Result<Order, Status>> + Send>>;
    type ProcessOrdersStream = Pin<Box<dyn Stream<Item = Result<CombinedShipment, Status>> + Send>>;

    #[tracing::instrument(skip_all, fields(order_id = %req.get_ref().id))]
    async fn add_order(&self, req: Request<Order>) -> Result<Response<String>, Status> {
        let confirmation = ordermgt_core::add_order(&self.store, req.into_inner())?;
        increment_orders_added();
        Ok(Response::new(confirmation))
    }

    #[tracing::instrument(skip_all, fields(order_id = %req.get_ref()))]
    async fn get_order(&self, req: Request<String>) -> Result<Response<Order>, Status> {
        let order = ordermgt_core::get_order(&self.store, req.get_ref())?;
        Ok(Response::new(order))
    }

    /// Streams every stored order with an item containing the query.
    #[tracing::instrument(skip_all, fields(query = %req.get_ref()))]
    async fn search_orders(
        &self,
        req: Request<String>,
    ) -> Result<Response<Self::SearchOrdersStream>, Status> {
        let guard = self.streams.enter()?;
        let query = req.into_inner();

        let (resp_tx, resp_rx) = mpsc::channel::<Result<Order, Status>>(self.config.stream_buffer_size);
        let store = Arc::clone(&self.store);
        let cancel = self.shutdown_token.child_token();

        let fut = async move {
            let _guard = guard;
            let sent = feed_search(store, query, resp_tx, cancel).await;
            add_search_matches(sent);
            tracing::debug!(sent, "Search complete");
        };
        tokio::spawn(fut.instrument(tracing::info_span!("search_feeder")));

        let stream = LoggedStream::outbound(ReceiverStream::new(resp_rx), "SearchOrders");
        Ok(Response::new(Box::pin(stream)))
    }

    /// Applies every streamed order, replying once with the processed ids.
    #[tracing::instrument(skip_all)]
    async fn update_orders(
        &self,
        req: Request<Streaming<Order>>,
    ) -> Result<Response<String>, Status> {
        let _guard = self.streams.enter()?;
        let inbound = LoggedStream::inbound(req.into_inner(), "UpdateOrders");

        let summary = tokio::select! {
            res = ordermgt_core::update_orders(&self.store, inbound) => res,
            () = self.shutdown_token.cancelled() => Err(Error::ServiceShutdown),
        }
        .inspect_err(|_| increment_stream_errors())?;

        add_orders_updated(summary.len());
        tracing::info!(updated = summary.len(), "Orders updated");
        Ok(Response::new(summary.to_string()))
    }

    /// Consolidates streamed order references into combined shipments.
    #[tracing::instrument(skip_all)]
    async fn process_orders(
        &self,
        req: Request<Streaming<String>>,
    ) -> Result<Response<Self::ProcessOrdersStream>, Status> {
        let guard = self.streams.enter()?;
        let inbound = LoggedStream::inbound(req.into_inner(), "ProcessOrders");

        let (resp_tx, resp_rx) =
            mpsc::channel::<Result<CombinedShipment, Status>>(self.config.stream_buffer_size);
        let store = Arc::clone(&self.store);
        let batch_size = self.config.batch_size;
        let cancel = self.shutdown_token.child_token();

        let fut = async move {
            let _guard = guard;
            match feed_shipments(store, batch_size, inbound, resp_tx, cancel).await {
                Ok(emitted) => tracing::debug!(emitted, "Shipment stream complete"),
                Err(e) => {
                    increment_stream_errors();
                    tracing::warn!("Shipment stream ended early: {e}");
                }
            }
        };
        tokio::spawn(fut.instrument(tracing::info_span!("shipment_driver")));

        let stream = LoggedStream::outbound(ReceiverStream::new(resp_rx), "ProcessOrders");
        Ok(Response::new(Box::pin(stream)))
    }
}

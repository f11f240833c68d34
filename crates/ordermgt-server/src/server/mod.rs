//! Server assembly: configuration, store seeding, the gRPC services, their
//! streaming tasks and telemetry.
//!
//! [`serve_with_incoming`] wires everything onto a tonic [`Server`] and runs
//! it until a shutdown signal arrives, then drains streams before the
//! transport stops.

pub mod config;
pub mod seed;
pub mod service;
pub mod streaming;
pub mod telemetry;


use core::future::Future;
use futures::Stream;
use ordermgt_core::{
    middleware::RpcLogLayer,
    proto::{
        FILE_DESCRIPTOR_SET, greeter_server::GreeterServer,
        order_management_server::OrderManagementServer,
    },
};
use service::{greeter::GreeterService, handler::OrderService};
use tokio::io::{AsyncRead, AsyncWrite};
use tonic::{
    codec::CompressionEncoding,
    transport::{Server, server::Connected},
};
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Serves both services on `incoming` until `signal` resolves.
///
/// Once `signal` resolves, health is flipped to `NOT_SERVING` and
/// [`OrderService::shutdown`] drains running streams before the transport
/// finishes its own graceful shutdown.
pub async fn serve_with_incoming<I, IO, IE, F>(
    service: OrderService,
    incoming: I,
    signal: F,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
    F: Future<Output = ()>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrderManagementServer<OrderService>>()
        .await;
    health_reporter
        .set_serving::<GreeterServer<GreeterService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let drain = {
        let service = service.clone();
        async move {
            signal.await;
            tracing::info!("Shutdown signal received, terminating gracefully...");

            // 1. Publish the status
            health_reporter
                .set_not_serving::<OrderManagementServer<OrderService>>()
                .await;
            health_reporter
                .set_not_serving::<GreeterServer<GreeterService>>()
                .await;

            // 2. Drain, then cancel, streaming work
            service.shutdown().await;
        }
    };

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new())
                .layer(RpcLogLayer::server()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_order_service(service))
        .add_service(build_greeter_service(GreeterService))
        .serve_with_incoming_shutdown(incoming, drain)
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn build_order_service(service: OrderService) -> OrderManagementServer<OrderService> {
    OrderManagementServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

fn build_greeter_service(service: GreeterService) -> GreeterServer<GreeterService> {
    GreeterServer::new(service)
        .accept_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Gzip)
}

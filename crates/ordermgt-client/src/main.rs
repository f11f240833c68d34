#![doc = include_str!("../README.md")]

mod client;

use clap::Parser;
use client::{config::CliArgs, demo};
use ordermgt_core::{
    middleware::RpcLogLayer,
    proto::order_management_client::OrderManagementClient,
};
use tonic::{codec::CompressionEncoding, transport::Endpoint};
use tower::ServiceBuilder;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    let channel = Endpoint::from_shared(args.server_addr.clone())?
        .connect_timeout(args.timeout())
        .connect()
        .await?;
    tracing::info!("Connected to {}", args.server_addr);

    let channel = ServiceBuilder::new()
        .layer(RpcLogLayer::client())
        .service(channel);
    let mut client = OrderManagementClient::new(channel)
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd);

    demo::run(&mut client, args.timeout()).await
}

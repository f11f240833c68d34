//! The scripted walk through every `OrderManagement` RPC.

use core::time::Duration;
use ordermgt_core::{
    middleware::{LoggedStream, RpcLog},
    proto::{Order, order_management_client::OrderManagementClient},
    types::INVALID_ORDER_ID,
};
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tonic::{Code, Request, Status, transport::Channel};
use tonic_types::StatusExt;

pub type Client = OrderManagementClient<RpcLog<Channel>>;

pub async fn run(client: &mut Client, timeout: Duration) -> anyhow::Result<()> {
    add_order(
        client,
        timeout,
        order("101", &["iPhone XS", "Mac Book Pro"], "San Jose, CA", 2300.0),
    )
    .await?;
    add_invalid_order(client, timeout).await?;
    get_order(client, timeout, "106").await?;
    search_orders(client, "Google").await?;
    update_orders(client).await?;
    process_orders(client, &["102", "103", "104", "101"]).await?;
    Ok(())
}

fn order(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
    Order {
        id: id.to_string(),
        items: items.iter().map(|s| (*s).to_string()).collect(),
        destination: destination.to_string(),
        price,
        ..Order::default()
    }
}

fn with_timeout<T>(message: T, timeout: Duration) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    request
}

async fn add_order(client: &mut Client, timeout: Duration, order: Order) -> anyhow::Result<()> {
    let reply = client.add_order(with_timeout(order, timeout)).await?;
    tracing::info!("AddOrder response: {}", reply.into_inner());
    Ok(())
}

/// Sends the reserved invalid id and reports the structured error details.
async fn add_invalid_order(client: &mut Client, timeout: Duration) -> anyhow::Result<()> {
    let mut invalid = order(INVALID_ORDER_ID, &["iPhone XS"], "San Jose, CA", 2300.0);
    invalid.description = "Invalid order".to_string();

    match client.add_order(with_timeout(invalid, timeout)).await {
        Ok(reply) => {
            tracing::warn!("Invalid order was accepted: {}", reply.into_inner());
            Ok(())
        }
        Err(status) if status.code() == Code::InvalidArgument => {
            log_violations(&status);
            Ok(())
        }
        Err(status) => Err(status.into()),
    }
}

fn log_violations(status: &Status) {
    let details = status.get_error_details();
    match details.bad_request() {
        Some(bad_request) => {
            for violation in &bad_request.field_violations {
                tracing::info!(
                    field = %violation.field,
                    "Request field invalid: {}",
                    violation.description
                );
            }
        }
        None => tracing::info!("Invalid argument without details: {}", status.message()),
    }
}

async fn get_order(client: &mut Client, timeout: Duration, id: &str) -> anyhow::Result<()> {
    let order = client
        .get_order(with_timeout(id.to_string(), timeout))
        .await?
        .into_inner();
    tracing::info!("GetOrder response: {order:?}");
    Ok(())
}

async fn search_orders(client: &mut Client, query: &str) -> anyhow::Result<()> {
    let inbound = client.search_orders(query.to_string()).await?.into_inner();
    let mut matches = LoggedStream::inbound(inbound, "SearchOrders");

    while let Some(order) = matches.next().await {
        tracing::info!("Search result: {:?}", order?);
    }
    Ok(())
}

async fn update_orders(client: &mut Client) -> anyhow::Result<()> {
    let updates = vec![
        order("102", &["Google Pixel 3A", "Google Pixel Book"], "Mountain View, CA", 1100.0),
        order("103", &["Apple Watch S4", "Mac Book Pro", "iPad Pro"], "San Jose, CA", 2800.0),
        order("104", &["Google Home Mini", "Google Nest Hub", "iPad Mini"], "Mountain View, CA", 2200.0),
    ];

    let reply = client.update_orders(tokio_stream::iter(updates)).await?;
    tracing::info!("UpdateOrders response: {}", reply.into_inner());
    Ok(())
}

/// Streams `ids` while concurrently printing each combined shipment.
async fn process_orders(client: &mut Client, ids: &[&str]) -> anyhow::Result<()> {
    let (req_tx, req_rx) = mpsc::channel::<String>(ids.len().max(1));
    let ids: Vec<String> = ids.iter().map(|id| (*id).to_string()).collect();

    let sender = tokio::spawn(async move {
        for id in ids {
            if req_tx.send(id).await.is_err() {
                break;
            }
        }
    });

    let inbound = client
        .process_orders(ReceiverStream::new(req_rx))
        .await?
        .into_inner();
    let mut shipments = LoggedStream::inbound(inbound, "ProcessOrders");

    while let Some(shipment) = shipments.next().await {
        let shipment = shipment?;
        let order_ids: Vec<&str> = shipment.orders_list.iter().map(|o| o.id.as_str()).collect();
        tracing::info!(
            status = %shipment.status,
            "Combined shipment {}: {:?}",
            shipment.id,
            order_ids
        );
    }

    sender.await?;
    Ok(())
}

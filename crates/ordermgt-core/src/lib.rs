#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

pub mod middleware;
pub mod orders;
pub mod shipment;
pub mod store;

pub use orders::{UpdateSummary, add_order, get_order, update_orders};
pub use shipment::{EngineState, ShipmentConsolidator};
pub use store::OrderStore;

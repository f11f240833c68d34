//! Shipment consolidation.
//!
//! A [`ShipmentConsolidator`] groups orders that share a destination into
//! [`CombinedShipment`](crate::proto::CombinedShipment)s and releases them in
//! batches. It holds the state of exactly one bidirectional stream and is
//! never shared between streams.
//!
//! ## Lifecycle
//!
//! ```text
//!   ACCUMULATING --accept() x batch_size--> flush, new epoch (still ACCUMULATING)
//!   ACCUMULATING --finish()---------------> flush partial epoch, TERMINATED
//!   ACCUMULATING --abort()----------------> discard epoch, TERMINATED
//! ```
//!
//! The consolidator is synchronous and transport-agnostic: the caller
//! resolves references to orders, feeds them in, and forwards whatever batch
//! comes back.

mod engine;

pub use engine::{EngineState, ShipmentConsolidator};

#[cfg(test)]
mod tests;

use crate::{
    Error, Result,
    proto::{CombinedShipment, Order},
    types::{SHIPMENT_STATUS, shipment_id},
};
use core::{mem, num::NonZeroUsize};
use std::collections::{HashMap, hash_map::Entry};

/// Lifecycle state of a [`ShipmentConsolidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Accepting orders into the current epoch.
    Accumulating,
    /// End-of-input (or abort) was reached. No further calls are accepted.
    Terminated,
}

/// Per-stream consolidation state machine.
///
/// Orders are grouped by destination inside an *epoch*. The epoch closes
/// after `batch_size` accepted orders (counted from one, so the first flush
/// happens on the `batch_size`-th order) or when the input ends. Closing an
/// epoch hands back every shipment it holds and starts a new, empty one.
///
/// Within one flush shipments come back in the order their destination was
/// first seen. Callers should treat cross-destination order as unspecified.
#[derive(Debug)]
pub struct ShipmentConsolidator {
    batch_size: NonZeroUsize,
    shipments: Vec<CombinedShipment>,
    by_destination: HashMap<String, usize>,
    accepted: usize,
    state: EngineState,
}

impl ShipmentConsolidator {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self {
            batch_size,
            shipments: Vec::new(),
            by_destination: HashMap::new(),
            accepted: 0,
            state: EngineState::Accumulating,
        }
    }

    pub const fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Orders accepted since the last flush.
    pub const fn pending_orders(&self) -> usize {
        self.accepted
    }

    /// Shipments held in the current epoch.
    pub fn pending_shipments(&self) -> usize {
        self.shipments.len()
    }

    /// Adds `order` to the shipment for its destination.
    ///
    /// Returns `Some(batch)` when this order completes the epoch, in which
    /// case the consolidator has already moved on to a fresh epoch.
    ///
    /// The destination is taken from the order as given; an empty destination
    /// is a valid grouping key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineTerminated`] after [`finish`](Self::finish) or
    /// [`abort`](Self::abort).
    pub fn accept(&mut self, order: Order) -> Result<Option<Vec<CombinedShipment>>> {
        self.ensure_accumulating()?;

        match self.by_destination.entry(order.destination.clone()) {
            Entry::Occupied(slot) => {
                self.shipments[*slot.get()].orders_list.push(order);
            }
            Entry::Vacant(slot) => {
                let shipment = CombinedShipment {
                    id: shipment_id(slot.key()),
                    status: SHIPMENT_STATUS.to_string(),
                    orders_list: vec![order],
                };
                slot.insert(self.shipments.len());
                self.shipments.push(shipment);
            }
        }

        self.accepted += 1;
        if self.accepted == self.batch_size.get() {
            tracing::debug!(
                orders = self.accepted,
                shipments = self.shipments.len(),
                "Batch size reached, flushing epoch"
            );
            return Ok(Some(self.take_epoch()));
        }

        Ok(None)
    }

    /// Closes the input: returns the partial epoch and terminates.
    ///
    /// The returned batch is empty if nothing was accepted since the last
    /// flush.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineTerminated`] if already terminated.
    pub fn finish(&mut self) -> Result<Vec<CombinedShipment>> {
        self.ensure_accumulating()?;
        self.state = EngineState::Terminated;
        Ok(self.take_epoch())
    }

    /// Terminates without flushing, discarding the current epoch.
    ///
    /// Returns the number of orders that were dropped.
    pub fn abort(&mut self) -> usize {
        self.state = EngineState::Terminated;
        let dropped = self.accepted;
        self.take_epoch();
        dropped
    }

    fn ensure_accumulating(&self) -> Result<()> {
        match self.state {
            EngineState::Accumulating => Ok(()),
            EngineState::Terminated => Err(Error::EngineTerminated),
        }
    }

    fn take_epoch(&mut self) -> Vec<CombinedShipment> {
        self.by_destination.clear();
        self.accepted = 0;
        mem::take(&mut self.shipments)
    }
}

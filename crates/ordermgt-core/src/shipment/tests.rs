use super::{EngineState, ShipmentConsolidator};
use crate::{
    Error,
    proto::{CombinedShipment, Order},
    store::OrderStore,
    types::{DEFAULT_BATCH_SIZE, SHIPMENT_STATUS},
};
use core::num::NonZeroUsize;
use std::collections::HashMap;

const SJ: &str = "San Jose, CA";
const MV: &str = "Mountain View, CA";

fn batch(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn order(id: &str, destination: &str) -> Order {
    Order {
        id: id.to_string(),
        destination: destination.to_string(),
        ..Order::default()
    }
}

/// Collapses a flush into `destination -> [order ids]` for order-insensitive
/// comparisons.
fn by_destination(shipments: &[CombinedShipment]) -> HashMap<String, Vec<String>> {
    shipments
        .iter()
        .map(|s| {
            let destination = s.id.trim_start_matches("cmb - ").to_string();
            let ids = s.orders_list.iter().map(|o| o.id.clone()).collect();
            (destination, ids)
        })
        .collect()
}

#[test]
fn sj_sj_mv_then_sj_sj_scenario() {
    let mut engine = ShipmentConsolidator::new(DEFAULT_BATCH_SIZE);

    assert!(engine.accept(order("103", SJ)).unwrap().is_none());
    assert!(engine.accept(order("105", SJ)).unwrap().is_none());
    let first = engine.accept(order("102", MV)).unwrap().expect("flush on 3rd");

    assert_eq!(first.len(), 2);
    let grouped = by_destination(&first);
    assert_eq!(grouped[SJ], ["103", "105"]);
    assert_eq!(grouped[MV], ["102"]);
    assert!(first.iter().all(|s| s.status == SHIPMENT_STATUS));
    assert_eq!(engine.pending_orders(), 0);
    assert_eq!(engine.pending_shipments(), 0);

    assert!(engine.accept(order("103", SJ)).unwrap().is_none());
    assert!(engine.accept(order("105", SJ)).unwrap().is_none());
    let last = engine.finish().unwrap();

    assert_eq!(last.len(), 1);
    assert_eq!(last[0].id, "cmb - San Jose, CA");
    assert_eq!(last[0].orders_list.len(), 2);
    assert_eq!(engine.state(), EngineState::Terminated);
}

#[test]
fn flushes_after_every_third_reference() {
    let mut engine = ShipmentConsolidator::new(batch(3));
    let mut flushed_at = Vec::new();

    for i in 1..=10 {
        if engine.accept(order(&i.to_string(), SJ)).unwrap().is_some() {
            flushed_at.push(i);
        }
    }

    assert_eq!(flushed_at, [3, 6, 9]);
    assert_eq!(engine.pending_orders(), 1);
    let tail = engine.finish().unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].orders_list.len(), 1);
}

#[test]
fn batch_size_one_flushes_every_order() {
    let mut engine = ShipmentConsolidator::new(batch(1));
    for (i, destination) in [SJ, SJ, MV].into_iter().enumerate() {
        let flushed = engine
            .accept(order(&i.to_string(), destination))
            .unwrap()
            .expect("flush every order");
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].orders_list.len(), 1);
    }
    assert!(engine.finish().unwrap().is_empty());
}

#[test]
fn finish_on_exact_boundary_is_empty() {
    let mut engine = ShipmentConsolidator::new(batch(2));
    engine.accept(order("1", SJ)).unwrap();
    assert!(engine.accept(order("2", MV)).unwrap().is_some());
    assert!(engine.finish().unwrap().is_empty());
}

#[test]
fn shipment_ids_repeat_across_epochs() {
    let mut engine = ShipmentConsolidator::new(batch(2));
    engine.accept(order("1", SJ)).unwrap();
    let first = engine.accept(order("2", SJ)).unwrap().unwrap();
    engine.accept(order("3", SJ)).unwrap();
    let second = engine.finish().unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].id, second[0].id);
    assert_eq!(first[0].orders_list.len(), 2);
    assert_eq!(second[0].orders_list.len(), 1);
}

#[test]
fn unknown_references_group_under_empty_destination() {
    let store = OrderStore::with_sample_data();
    let mut engine = ShipmentConsolidator::new(batch(3));

    engine.accept(store.resolve("missing-1")).unwrap();
    engine.accept(store.resolve("103")).unwrap();
    let flushed = engine.accept(store.resolve("missing-2")).unwrap().unwrap();

    let grouped = by_destination(&flushed);
    assert_eq!(grouped[""], ["missing-1", "missing-2"]);
    assert_eq!(grouped[SJ], ["103"]);
}

#[test]
fn shipments_hold_copies_not_store_entries() {
    let store = OrderStore::with_sample_data();
    let mut engine = ShipmentConsolidator::new(batch(5));
    engine.accept(store.resolve("102")).unwrap();

    let mut changed = store.get("102").unwrap();
    changed.price = 1.0;
    store.put(changed);

    let flushed = engine.finish().unwrap();
    assert_eq!(flushed[0].orders_list[0].price, 1800.0);
}

#[test]
fn every_order_is_emitted_once_and_grouped_by_destination() {
    let destinations = ["A", "B", "C", "D"];

    for batch_size in 1..=7 {
        for total in 0..=25 {
            let mut engine = ShipmentConsolidator::new(batch(batch_size));
            let mut emitted = Vec::new();
            let mut flushes = 0;

            for i in 0..total {
                let destination = destinations[(i * 7 + i / 3) % destinations.len()];
                if let Some(flush) = engine.accept(order(&i.to_string(), destination)).unwrap() {
                    flushes += 1;
                    emitted.extend(flush);
                }
            }
            emitted.extend(engine.finish().unwrap());

            assert_eq!(flushes, total / batch_size);

            let mut seen: Vec<usize> = Vec::new();
            for shipment in &emitted {
                let expected = shipment.id.trim_start_matches("cmb - ");
                for o in &shipment.orders_list {
                    assert_eq!(o.destination, expected);
                    seen.push(o.id.parse().unwrap());
                }
            }
            seen.sort_unstable();
            assert_eq!(seen, (0..total).collect::<Vec<_>>());
        }
    }
}

#[test]
fn terminated_engine_rejects_calls() {
    let mut engine = ShipmentConsolidator::new(batch(3));
    engine.finish().unwrap();

    assert!(matches!(
        engine.accept(order("1", SJ)),
        Err(Error::EngineTerminated)
    ));
    assert!(matches!(engine.finish(), Err(Error::EngineTerminated)));
}

#[test]
fn abort_discards_partial_epoch() {
    let mut engine = ShipmentConsolidator::new(batch(3));
    engine.accept(order("1", SJ)).unwrap();
    engine.accept(order("2", MV)).unwrap();

    assert_eq!(engine.abort(), 2);
    assert_eq!(engine.state(), EngineState::Terminated);
    assert_eq!(engine.pending_shipments(), 0);
    assert!(engine.finish().is_err());
}

use core::{hint::black_box, num::NonZeroUsize};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ordermgt_core::{OrderStore, ShipmentConsolidator, proto::Order};

const ORDERS: usize = 10_000;

fn destinations(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Destination {i}")).collect()
}

fn build_store(destinations: &[String]) -> OrderStore {
    OrderStore::from_orders((0..ORDERS).map(|i| Order {
        id: i.to_string(),
        items: vec![format!("Item {i}")],
        destination: destinations[i % destinations.len()].clone(),
        ..Order::default()
    }))
}

fn bench_consolidation(c: &mut Criterion) {
    let mut group = c.benchmark_group("consolidate");
    group.throughput(Throughput::Elements(ORDERS as u64));

    for distinct in [1, 16, 256] {
        let store = build_store(&destinations(distinct));
        let ids: Vec<String> = (0..ORDERS).map(|i| i.to_string()).collect();

        for batch_size in [3, 64, 1024] {
            let batch = NonZeroUsize::new(batch_size).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("destinations={distinct}"), batch_size),
                &batch,
                |b, &batch| {
                    b.iter(|| {
                        let mut engine = ShipmentConsolidator::new(batch);
                        let mut shipments = 0;
                        for id in &ids {
                            if let Some(flush) = engine.accept(store.resolve(id)).unwrap() {
                                shipments += flush.len();
                            }
                        }
                        shipments += engine.finish().unwrap().len();
                        black_box(shipments)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let store = build_store(&destinations(16));
    c.bench_function("search/10k orders", |b| {
        b.iter(|| black_box(store.search(black_box("Item 99")).count()));
    });
}

criterion_group!(benches, bench_consolidation, bench_search);
criterion_main!(benches);

//! # Telemetry Features
//!
//! Console logging through `tracing-subscriber` is always on. Metrics are
//! optional and exported through OpenTelemetry.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters, histograms).
//! - `stdout`: Enables the stdout metrics exporter (implies `metrics`).
//!
//! ## Log behavior
//!
//! - The filter comes from `RUST_LOG` and defaults to `info`.
//! - Per-message stream logs are emitted at `debug`.
//!
//! ## Metrics
//!
//! | Name                | Kind           | Meaning                                   |
//! |---------------------|----------------|-------------------------------------------|
//! | `orders_added`      | counter        | Successful `AddOrder` calls               |
//! | `orders_updated`    | counter        | Orders applied through `UpdateOrders`     |
//! | `search_matches`    | counter        | Orders streamed by `SearchOrders`         |
//! | `shipments_emitted` | counter        | Combined shipments sent by `ProcessOrders`|
//! | `streams_inflight`  | up-down count  | Streaming RPCs currently running          |
//! | `stream_errors`     | counter        | Streams that ended with an error          |
//! | `stream_duration`   | histogram (ms) | Lifetime of each streaming RPC            |
//!
//! With `metrics` disabled, the recording helpers compile to no-ops.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features stdout
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter, UpDownCounter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down any exporters.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = {
        let meter_provider = init_metrics();
        opentelemetry::global::set_meter_provider(meter_provider.clone());

        let scope = InstrumentationScope::builder("ordermgt")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
        meter_provider
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("ordermgt")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

#[cfg(feature = "metrics")]
static ORDERS_ADDED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ORDERS_UPDATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static SEARCH_MATCHES: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static SHIPMENTS_EMITTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STREAMS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STREAM_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static STREAM_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = ORDERS_ADDED.set(
        meter
            .u64_counter("orders_added")
            .with_description("Orders stored through AddOrder")
            .build(),
    );

    let _ = ORDERS_UPDATED.set(
        meter
            .u64_counter("orders_updated")
            .with_description("Orders applied through UpdateOrders")
            .build(),
    );

    let _ = SEARCH_MATCHES.set(
        meter
            .u64_counter("search_matches")
            .with_description("Orders streamed by SearchOrders")
            .build(),
    );

    let _ = SHIPMENTS_EMITTED.set(
        meter
            .u64_counter("shipments_emitted")
            .with_description("Combined shipments sent by ProcessOrders")
            .build(),
    );

    let _ = STREAMS_INFLIGHT.set(
        meter
            .i64_up_down_counter("streams_inflight")
            .with_description("Concurrent gRPC streams")
            .build(),
    );

    let _ = STREAM_ERRORS.set(
        meter
            .u64_counter("stream_errors")
            .with_description("Errored/cancelled streams")
            .build(),
    );

    let _ = STREAM_DURATION_MS.set(
        meter
            .f64_histogram("stream_duration")
            .with_unit("ms")
            .with_description("End-to-end stream duration")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_orders_added() {
    if let Some(counter) = ORDERS_ADDED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_orders_added() {}

#[cfg(feature = "metrics")]
pub fn add_orders_updated(count: usize) {
    if let Some(counter) = ORDERS_UPDATED.get() {
        counter.add(count as u64, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn add_orders_updated(_count: usize) {}

#[cfg(feature = "metrics")]
pub fn add_search_matches(count: usize) {
    if let Some(counter) = SEARCH_MATCHES.get() {
        counter.add(count as u64, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn add_search_matches(_count: usize) {}

#[cfg(feature = "metrics")]
pub fn add_shipments_emitted(count: usize) {
    if let Some(counter) = SHIPMENTS_EMITTED.get() {
        counter.add(count as u64, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn add_shipments_emitted(_count: usize) {}

#[cfg(feature = "metrics")]
pub fn increment_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_streams_inflight() {}

#[cfg(feature = "metrics")]
pub fn decrement_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn decrement_streams_inflight() {}

#[cfg(feature = "metrics")]
pub fn increment_stream_errors() {
    if let Some(counter) = STREAM_ERRORS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_stream_errors() {}

#[cfg(feature = "metrics")]
pub fn record_stream_duration(duration_ms: f64) {
    if let Some(histogram) = STREAM_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_stream_duration(_duration_ms: f64) {}

//! gRPC service implementations and stream lifecycle tracking.
//!
//! ## Structure
//!
//! - [`handler`] - `OrderManagement` entry point ([`OrderService`]).
//! - [`greeter`] - `Greeter` entry point used as a connectivity check.
//!
//! [`StreamTracker`] counts the streaming RPCs currently running so shutdown
//! can wait for them before cancelling whatever is left.
//!
//! [`OrderService`]: handler::OrderService

pub mod greeter;
pub mod handler;

use crate::server::telemetry::{
    decrement_streams_inflight, increment_streams_inflight, record_stream_duration,
};
use ordermgt_core::Error;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::{sync::Arc, time::Instant};

/// Admission control for streaming RPCs.
///
/// Each stream holds a [`StreamGuard`] for its whole lifetime. Once
/// [`begin_drain`](Self::begin_drain) is called, new streams are refused.
#[derive(Debug, Default)]
pub struct StreamTracker {
    inflight: AtomicUsize,
    draining: AtomicBool,
}

impl StreamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once draining has started.
    pub fn enter(self: &Arc<Self>) -> Result<StreamGuard, Error> {
        if self.is_draining() {
            return Err(Error::ServiceShutdown);
        }
        self.inflight.fetch_add(1, Ordering::AcqRel);
        increment_streams_inflight();

        Ok(StreamGuard {
            tracker: Arc::clone(self),
            started: Instant::now(),
        })
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Stops admitting new streams. Running streams are unaffected.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }
}

/// Keeps a stream counted as in-flight until dropped.
#[derive(Debug)]
pub struct StreamGuard {
    tracker: Arc<StreamTracker>,
    started: Instant,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.tracker.inflight.fetch_sub(1, Ordering::AcqRel);
        decrement_streams_inflight();
        record_stream_duration(self.started.elapsed().as_secs_f64() * 1000.0);
    }
}

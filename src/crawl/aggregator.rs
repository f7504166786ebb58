// src/crawl/aggregator.rs
// =============================================================================
// The aggregator collects what the workers produce.
//
// For every finished page it:
// 1. Records the error, if there was one
// 2. Adds the page's word counts into the global histogram
// 3. Forwards the page's links to the controller over the relief channel
//
// Steps 1-3 happen under one lock. Step 3 only *tries* to send: when the
// relief channel is full, the lock is released and the blocking send is
// handed to a short-lived spawned task. The worker that called submit() is
// free to pick up its next page right away.
//
// Relief tasks are not capped. Every outstanding relief task owns exactly
// one link batch the controller is still counting on, so the controller
// eventually drains all of them.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{trace, warn};

use crate::fetch::{Histogram, PageError, PageResult};

/// One failed page, as shown in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub url: String,
    pub error: PageError,
}

/// Relief channel diagnostics. No behavioral effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackpressureStats {
    /// Link batches the relief channel accepted immediately
    pub relief_accepted: u64,
    /// Link batches that had to be handed to a relief task
    pub relief_blocked: u64,
    /// Most relief tasks outstanding at the same time
    pub relief_peak_in_flight: usize,
}

// Everything the aggregator has collected so far
#[derive(Debug, Default)]
pub struct Aggregate {
    pub histogram: Histogram,
    pub errors: Vec<ErrorRecord>,
    pub stats: BackpressureStats,
    pub pages: usize,
}

pub struct Aggregator {
    state: Mutex<Aggregate>,
    relief_tx: mpsc::Sender<Vec<String>>,
    relief_in_flight: Arc<AtomicUsize>,
}

impl Aggregator {
    pub fn new(relief_tx: mpsc::Sender<Vec<String>>, dict_size: usize) -> Self {
        Self {
            state: Mutex::new(Aggregate {
                histogram: Histogram::with_capacity(dict_size),
                ..Aggregate::default()
            }),
            relief_tx,
            relief_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    // Must be called from inside a tokio runtime (relief tasks are spawned)
    pub fn submit(&self, page: PageResult) {
        let PageResult {
            url,
            error,
            histogram,
            links,
        } = page;

        let mut state = self.lock();

        if let Some(error) = error {
            state.errors.push(ErrorRecord { url, error });
        }
        merge_histogram(&mut state.histogram, histogram);
        state.pages += 1;

        match self.relief_tx.try_send(links) {
            Ok(()) => {
                state.stats.relief_accepted += 1;
            }
            Err(TrySendError::Full(links)) => {
                state.stats.relief_blocked += 1;
                let in_flight = self.relief_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                state.stats.relief_peak_in_flight = state.stats.relief_peak_in_flight.max(in_flight);
                drop(state);

                trace!(in_flight, "relief channel full, spawning relief send");
                self.spawn_relief(links);
            }
            Err(TrySendError::Closed(links)) => {
                warn!(dropped = links.len(), "relief channel closed, dropping link batch");
            }
        }
    }

    fn spawn_relief(&self, links: Vec<String>) {
        let relief_tx = self.relief_tx.clone();
        let in_flight = Arc::clone(&self.relief_in_flight);

        tokio::spawn(async move {
            if let Err(e) = relief_tx.send(links).await {
                warn!(dropped = e.0.len(), "relief channel closed before relief send");
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    // Moves everything collected so far out of the aggregator
    pub fn take(&self) -> Aggregate {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Aggregate> {
        // A panic while holding the lock leaves counts that are still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Adds one page's counts into the running totals.
pub fn merge_histogram(totals: &mut Histogram, page: Histogram) {
    for (word, count) in page {
        *totals.entry(word).or_insert(0) += count;
    }
}

//! Debounced product search.
//!
//! Every search takes a generation number. A search waits out the debounce
//! interval and is dropped if a newer one started meanwhile; a response that
//! arrives after a newer search started is discarded as well. Whatever is
//! displayed therefore always belongs to the latest search.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

/// Identifies one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// What became of a search.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    /// Latest search; the response may be shown.
    Current(T),
    /// A newer search started before this one was sent.
    Superseded,
    /// A newer search started while this one was in flight.
    Stale,
}

impl<T> SearchOutcome<T> {
    /// The response, if it may be shown.
    pub fn current(self) -> Option<T> {
        match self {
            Self::Current(value) => Some(value),
            Self::Superseded | Self::Stale => None,
        }
    }
}

/// Coordinates overlapping searches. Clones share the generation counter.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    latest: Arc<AtomicU64>,
    debounce: Duration,
}

impl SearchCoordinator {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Start a new generation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `generation` is still the latest.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Run `request` as a new search after the debounce interval.
    pub async fn run<F, Fut, T>(&self, request: F) -> SearchOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.begin();
        self.run_as(generation, self.debounce, request).await
    }

    /// Run `request` immediately as a new search.
    ///
    /// Used for filter changes that should not wait (brand, sort, paging);
    /// they still supersede any pending debounced search.
    pub async fn run_now<F, Fut, T>(&self, request: F) -> SearchOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.begin();
        self.run_as(generation, Duration::ZERO, request).await
    }

    async fn run_as<F, Fut, T>(
        &self,
        generation: Generation,
        delay: Duration,
        request: F,
    ) -> SearchOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            if !self.is_current(generation) {
                debug!(generation = generation.0, "Search superseded before sending");
                return SearchOutcome::Superseded;
            }
        }

        let response = request().await;

        if self.is_current(generation) {
            SearchOutcome::Current(response)
        } else {
            debug!(generation = generation.0, "Discarding stale search response");
            SearchOutcome::Stale
        }
    }
}

//! Counters for amortized-cost events

use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters shared by every rope operation run through one context
#[derive(Debug, Default)]
pub struct RopeMetrics {
    rebalances: AtomicU64,
    flattens: AtomicU64,
    combines: AtomicU64,
}

/// Point-in-time copy of [`RopeMetrics`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Corrective passes over an unbalanced node
    pub rebalances: u64,
    /// Unbalanced subtrees collapsed into a single leaf
    pub flattens: u64,
    /// Bulk builds assembled from leaf pieces
    pub combines: u64,
}

impl RopeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_rebalance(&self) {
        self.rebalances.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_flatten(&self) {
        self.flattens.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_combine(&self) {
        self.combines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rebalances(&self) -> u64 {
        self.rebalances.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rebalances: self.rebalances.load(Ordering::Relaxed),
            flattens: self.flattens.load(Ordering::Relaxed),
            combines: self.combines.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.rebalances.store(0, Ordering::Relaxed);
        self.flattens.store(0, Ordering::Relaxed);
        self.combines.store(0, Ordering::Relaxed);
    }
}

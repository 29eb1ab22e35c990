//! Resolution and synchronization metrics.
//!
//! Counters for how localized reads were served and how much the
//! synchronizer wrote.

use crate::i18n::resolver::Resolution;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

pub struct ResolutionMetrics {
    /// Reads served in the requested language
    requested_hits: AtomicUsize,

    /// Reads served from the default language
    fallbacks: AtomicUsize,

    /// Reads with no usable content at all
    unresolved: AtomicUsize,

    /// Placeholder rows inserted by the synchronizer
    rows_synced: AtomicUsize,

    /// Entities whose synchronization failed
    sync_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<ResolutionMetrics> = OnceLock::new();

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self {
            requested_hits: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            unresolved: AtomicUsize::new(0),
            rows_synced: AtomicUsize::new(0),
            sync_failures: AtomicUsize::new(0),
        }
    }

    /// Get the process-wide metrics instance.
    pub fn global() -> &'static ResolutionMetrics {
        METRICS.get_or_init(ResolutionMetrics::new)
    }

    /// Record how one localized read was served.
    pub fn record_resolution(&self, resolution: Resolution) {
        let counter = match resolution {
            Resolution::Requested => &self.requested_hits,
            Resolution::Fallback => &self.fallbacks,
            Resolution::Unresolved => &self.unresolved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rows_synced(&self, count: usize) {
        self.rows_synced.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_sync_failures(&self, count: usize) {
        self.sync_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn requested_hits(&self) -> usize {
        self.requested_hits.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn unresolved(&self) -> usize {
        self.unresolved.load(Ordering::Relaxed)
    }

    pub fn rows_synced(&self) -> usize {
        self.rows_synced.load(Ordering::Relaxed)
    }

    pub fn sync_failures(&self) -> usize {
        self.sync_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.requested_hits();
        let fallbacks = self.fallbacks();
        let unresolved = self.unresolved();
        let total = hits + fallbacks + unresolved;
        let fallback_rate = if total > 0 {
            (fallbacks as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            requested_hits: hits,
            fallbacks,
            unresolved,
            fallback_rate,
            rows_synced: self.rows_synced(),
            sync_failures: self.sync_failures(),
        }
    }
}

impl Default for ResolutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics report containing current counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub requested_hits: usize,
    pub fallbacks: usize,
    pub unresolved: usize,

    /// Share of reads served from the default language, as a percentage (0-100)
    pub fallback_rate: f64,

    pub rows_synced: usize,
    pub sync_failures: usize,
}

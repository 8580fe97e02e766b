// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Process-wide accuracy counters for the size estimator, plus `tracing`
//! events so a multiplication can be observed through a standard
//! `tracing-subscriber` without re-deriving anything from these counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Append-only counter registry, mirroring the reference implementation's
/// global tracing facility.
pub struct Sink {
    number_of_estimates: AtomicU64,
    number_of_correct_estimates: AtomicU64,
    accumulated_estimate_ratio_bits: Mutex<f64>,
}

impl Sink {
    pub fn new() -> Self {
        Self {
            number_of_estimates: AtomicU64::new(0),
            number_of_correct_estimates: AtomicU64::new(0),
            accumulated_estimate_ratio_bits: Mutex::new(0.0),
        }
    }

    pub fn number_of_estimates(&self) -> u64 {
        self.number_of_estimates.load(Ordering::Relaxed)
    }

    pub fn number_of_correct_estimates(&self) -> u64 {
        self.number_of_correct_estimates.load(Ordering::Relaxed)
    }

    pub fn accumulated_estimate_ratio(&self) -> f64 {
        *self.accumulated_estimate_ratio_bits.lock().unwrap()
    }

    /// Records that an estimate was produced. Accuracy against the real size
    /// is recorded separately via [`Sink::record_accuracy`] once the true
    /// cardinality is known (after the parallel phase completes).
    pub fn record_estimate(&self, estimate: u64) {
        self.number_of_estimates.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(estimate, "estimate recorded");
    }

    /// Records estimator accuracy against the now-known real size. A no-op
    /// when `real_size == 0`, avoiding a division by zero in the ratio.
    pub fn record_accuracy(&self, estimate: u64, real_size: u64) {
        if real_size == 0 {
            return;
        }
        if estimate >= real_size {
            self.number_of_correct_estimates.fetch_add(1, Ordering::Relaxed);
        }
        let ratio = estimate as f64 / real_size as f64;
        *self.accumulated_estimate_ratio_bits.lock().unwrap() += ratio;
        tracing::debug!(estimate, real_size, ratio, "estimate accuracy recorded");
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

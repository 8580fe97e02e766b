use std::env;

/// Tunables consumed by the parallel multiplier (C6), the blocked kernel (C5)
/// and the hash container's rehashing policy (C2).
///
/// Mirrors the reference implementation's `tuning`/`settings` globals, but as
/// an explicit, cheaply-cloneable struct rather than process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplierConfig {
    /// Side length `B` of the cache-blocking tile used by the blocked kernel.
    pub block_size: usize,
    /// Minimum amount of `n1 * n2` work a thread must be given before the
    /// thread pool is allowed to recommend another worker.
    pub min_work_per_thread: u128,
    /// Upper bound on the number of worker threads `recommend()` may return.
    pub max_threads: usize,
    /// Load factor above which the result table is rehashed after the
    /// parallel phase.
    pub max_load_factor: f64,
}

const DEFAULT_BLOCK_SIZE: usize = 128;
const DEFAULT_MIN_WORK_PER_THREAD: u128 = 500_000;
const DEFAULT_MAX_LOAD_FACTOR: f64 = 1.0;

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            min_work_per_thread: DEFAULT_MIN_WORK_PER_THREAD,
            max_threads: num_cpus::get(),
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl MultiplierConfig {
    /// Builds a configuration from environment variables, falling back to
    /// [`MultiplierConfig::default`] for any variable that is absent or
    /// fails to parse into a sensible value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            block_size: env_usize("SERIES_MULTIPLIER_BLOCK_SIZE").unwrap_or(defaults.block_size),
            min_work_per_thread: env_u128("SERIES_MULTIPLIER_MIN_WORK_PER_THREAD")
                .unwrap_or(defaults.min_work_per_thread),
            max_threads: env_usize("SERIES_MULTIPLIER_MAX_THREADS").unwrap_or(defaults.max_threads),
            max_load_factor: env_f64("SERIES_MULTIPLIER_MAX_LOAD_FACTOR")
                .unwrap_or(defaults.max_load_factor),
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0)
}

fn env_u128(key: &str) -> Option<u128> {
    env::var(key).ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0)
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| *v > 0.0 && v.is_finite())
}

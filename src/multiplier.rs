// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Top-level parallel multiplication: partition, estimate, rehash, strike.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::config::MultiplierConfig;
use crate::error::{MultiplyError, Result};
use crate::estimator::estimate_final_series_size;
use crate::index::hash::RawTable;
use crate::kernel::blocked_multiply;
use crate::series::Series;
use crate::spinlock::SpinlockArray;
use crate::term::{Key, SymbolSet, Term};
use crate::threadpool::{DefaultThreadPool, ThreadPool};
use crate::tracing_sink::Sink;

static GLOBAL_SINK: Lazy<Sink> = Lazy::new(Sink::new);

/// Process-wide estimator accuracy counters, shared by every call to
/// [`multiply`] in this process.
pub fn tracing_sink() -> &'static Sink {
    &GLOBAL_SINK
}

/// Multiplies two series, returning their algebraic product.
///
/// Reads its tunables from the environment once per call via
/// [`MultiplierConfig::from_env`]; use [`multiply_with_config`] to supply an
/// explicit configuration instead.
pub fn multiply<K: Key>(s1: &Series<K>, s2: &Series<K>) -> Result<Series<K>> {
    multiply_with_config(s1, s2, &MultiplierConfig::from_env())
}

/// Like [`multiply`] but with an explicit configuration, bypassing the
/// environment.
pub fn multiply_with_config<K: Key>(
    s1: &Series<K>,
    s2: &Series<K>,
    config: &MultiplierConfig,
) -> Result<Series<K>> {
    if !s1.symbols_compatible(s2) {
        return Err(MultiplyError::IncompatibleSymbolSets);
    }
    let symbols = s1.symbols().clone();
    if s1.is_empty() || s2.is_empty() {
        return Ok(Series::new(symbols));
    }

    let pool = DefaultThreadPool::new(config.max_threads);

    // Orient so the larger operand drives the outer partitioning: workers
    // get longer, more cache-friendly inner loops over the smaller operand.
    let (big, small): (Vec<Term<K>>, Vec<Term<K>>) = if s1.len() >= s2.len() {
        (s1.iter().cloned().collect(), s2.iter().cloned().collect())
    } else {
        (s2.iter().cloned().collect(), s1.iter().cloned().collect())
    };
    let n1 = big.len() as u128;
    let n2 = small.len() as u128;
    let total_work = n1
        .checked_mul(n2)
        .ok_or(MultiplyError::Overflow("n1 * n2"))?;

    let threads = pool
        .recommend(total_work, config.min_work_per_thread)
        .clamp(1, big.len());

    tracing::debug!(n1, n2, threads, "starting parallel multiplication");

    let mut result = if threads <= 1 {
        multiply_single_threaded(&big, &small, &symbols, config)?
    } else {
        multiply_striped(&big, &small, &symbols, config, &pool, threads)?
    };

    if result.bucket_count() > 0 && result.load_factor() > config.max_load_factor {
        let target = target_bucket_count(result.len(), config.max_load_factor)?;
        result.terms_mut().rehash_to(target);
    }

    tracing::debug!(result_len = result.len(), "finished parallel multiplication");
    Ok(result)
}

fn target_bucket_count(size: usize, max_load_factor: f64) -> Result<usize> {
    if max_load_factor <= 0.0 || !max_load_factor.is_finite() {
        return Err(MultiplyError::Overflow("max_load_factor"));
    }
    let needed = (size as f64 / max_load_factor).ceil() as usize;
    Ok(needed.max(1))
}

fn multiply_single_threaded<K: Key>(
    v1: &[Term<K>],
    v2: &[Term<K>],
    symbols: &SymbolSet,
    config: &MultiplierConfig,
) -> Result<Series<K>> {
    let n1 = v1.len() as u128;
    let n2 = v2.len() as u128;
    let mut result = Series::new(symbols.clone());

    if n1 >= 100_000 / n2.max(1) {
        let estimate = estimate_final_series_size(v1, v2, symbols, tracing_sink())?;
        if estimate > 0 {
            let bucket_count = target_bucket_count(estimate.max(1) as usize, config.max_load_factor)?;
            result.terms_mut().rehash_to(bucket_count);
        }
    }

    blocked_multiply(v1, v2, symbols, config.block_size, |term| {
        result.insert(term);
    });

    tracing_sink().record_accuracy(result.len() as u64, result.len() as u64);
    Ok(result)
}

/// Bucket-striped shared table: a raw pointer to the result's bucket storage
/// plus the spinlock array guarding it. Safe to share across worker threads
/// because every access is preceded by acquiring the spinlock for the exact
/// bucket index being touched, and the bucket array itself (`bucket_count`)
/// never changes while the spinlocks are live.
struct StripedTable<K: Key> {
    table: *mut RawTable<K>,
    locks: SpinlockArray,
}

unsafe impl<K: Key> Send for StripedTable<K> {}
unsafe impl<K: Key> Sync for StripedTable<K> {}

impl<K: Key> StripedTable<K> {
    /// Inserts `term`, merging into an existing term of the same key.
    /// Returns `true` if the table grew by one.
    ///
    /// Calls [`RawTable::unique_insert`], never `insert_in_bucket`: the
    /// latter also increments the table's single shared `len` field, which
    /// no per-bucket spinlock protects, so doing that concurrently from
    /// multiple workers would be a data race. Each worker instead keeps its
    /// own local count of `true` results and the driver folds the total
    /// into the table once, after every worker has joined, via
    /// [`RawTable::update_size`].
    ///
    /// Safety: the caller must ensure `self.table` outlives this call and
    /// that no other live reference to the table exists (the raw pointer is
    /// the table's only active handle for the duration of the striped
    /// phase).
    fn insert(&self, term: Term<K>) -> bool {
        let bucket_count = unsafe { (*self.table).bucket_count() };
        let idx = (term.key.hash() as usize) & (bucket_count - 1);
        let _guard = self.locks.lock(idx);
        unsafe { (*self.table).unique_insert(idx, term) }
    }
}

fn multiply_striped<K: Key>(
    v1: &[Term<K>],
    v2: &[Term<K>],
    symbols: &SymbolSet,
    config: &MultiplierConfig,
    pool: &DefaultThreadPool,
    threads: usize,
) -> Result<Series<K>> {
    let mut result = Series::new(symbols.clone());

    let estimate = estimate_final_series_size(v1, v2, symbols, tracing_sink())?.max(1);
    let bucket_count = target_bucket_count(estimate as usize, config.max_load_factor)?;
    result.terms_mut().rehash_to(bucket_count);

    let locks = SpinlockArray::new(result.terms().table().bucket_count())?;
    let striped = Arc::new(StripedTable {
        table: result.terms_mut().table_mut() as *mut RawTable<K>,
        locks,
    });

    let v1 = Arc::new(v1.to_vec());
    let v2 = Arc::new(v2.to_vec());
    let symbols = Arc::new(symbols.clone());
    let total_insertions = Arc::new(Mutex::new(0u64));
    let block_size = config.block_size;

    let chunk = v1.len().div_ceil(threads);
    let mut jobs: Vec<Box<dyn FnOnce() -> Result<()> + Send>> = Vec::with_capacity(threads);
    for t in 0..threads {
        let start = t * chunk;
        if start >= v1.len() {
            break;
        }
        let end = (start + chunk).min(v1.len());
        let v1 = Arc::clone(&v1);
        let v2 = Arc::clone(&v2);
        let symbols = Arc::clone(&symbols);
        let striped = Arc::clone(&striped);
        let total_insertions = Arc::clone(&total_insertions);

        jobs.push(Box::new(move || {
            let local_count = AtomicU64::new(0);
            blocked_multiply(&v1[start..end], &v2, &symbols, block_size, |term| {
                if striped.insert(term) {
                    local_count.fetch_add(1, Ordering::Relaxed);
                }
            });
            let mut total = total_insertions.lock().unwrap();
            *total += local_count.load(Ordering::Relaxed);
            Ok(())
        }));
    }

    let results = pool.run_all(jobs);
    // Dropping `striped` here (after `run_all` has joined every worker)
    // ensures no thread can still be holding the raw table pointer.
    drop(striped);

    for r in results {
        r?;
    }

    let total = *total_insertions.lock().unwrap();
    result.terms_mut().table_mut().update_size(total as usize);

    let real_size = result.len() as u64;
    tracing_sink().record_accuracy(estimate, real_size);

    Ok(result)
}

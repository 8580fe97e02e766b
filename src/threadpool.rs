// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Work dispatch abstraction used by the parallel multiplier.
//!
//! Grounded on the broader example corpus' use of `num_cpus` for default
//! parallelism sizing; dispatch itself is one `std::thread::spawn` per job.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use crate::error::{MultiplyError, Result};

/// Abstract work dispatch. `recommend` decides how many workers a given
/// amount of work merits; `run_all` executes a batch of closures and joins
/// every one of them, even if some panic.
pub trait ThreadPool {
    /// Suggests a worker count for `total_work` units of work, given that
    /// each worker should get at least `min_per_thread` units. Deterministic
    /// for a fixed pool size and fixed inputs.
    fn recommend(&self, total_work: u128, min_per_thread: u128) -> usize;

    /// Runs every closure in `jobs` to completion on its own OS thread and
    /// collects the results. Every job is joined regardless of whether an
    /// earlier one panicked; a panic is converted into
    /// [`MultiplyError::WorkerPanic`] for that job's slot rather than
    /// unwinding across the thread boundary.
    fn run_all(&self, jobs: Vec<Box<dyn FnOnce() -> Result<()> + Send>>) -> Vec<Result<()>>;
}

/// Default pool: one OS thread per job, sized once at construction and
/// reused across calls to `multiply` only in the sense that its `max_threads`
/// ceiling is fixed; each call still spawns fresh threads for its own jobs.
pub struct DefaultThreadPool {
    max_threads: usize,
}

impl DefaultThreadPool {
    pub fn new(max_threads: usize) -> Self {
        Self {
            max_threads: max_threads.max(1),
        }
    }
}

impl ThreadPool for DefaultThreadPool {
    fn recommend(&self, total_work: u128, min_per_thread: u128) -> usize {
        if min_per_thread == 0 {
            return self.max_threads;
        }
        let by_work = (total_work / min_per_thread).max(1);
        let by_work = by_work.min(self.max_threads as u128) as usize;
        by_work.max(1)
    }

    fn run_all(&self, jobs: Vec<Box<dyn FnOnce() -> Result<()> + Send>>) -> Vec<Result<()>> {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                thread::spawn(move || match catch_unwind(AssertUnwindSafe(job)) {
                    Ok(result) => result,
                    Err(payload) => Err(MultiplyError::WorkerPanic(panic_message(payload))),
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| Err(MultiplyError::WorkerPanic(panic_message(payload)))))
            .collect()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}

// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! One-bit atomic spinlocks, one per hash bucket.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::{MultiplyError, Result};

/// A fixed-size array of independent, cache-line-padded spinlocks.
///
/// Sized to the result series' bucket count at the time the parallel phase
/// begins and never resized while locks are live: the mapping from bucket
/// index to lock index must stay stable for the whole parallel phase.
pub struct SpinlockArray {
    flags: Vec<CachePadded<AtomicBool>>,
}

impl SpinlockArray {
    pub fn new(count: usize) -> Result<Self> {
        count
            .checked_mul(std::mem::size_of::<CachePadded<AtomicBool>>())
            .ok_or(MultiplyError::Overflow("spinlock array byte size"))?;
        let mut flags = Vec::new();
        flags
            .try_reserve_exact(count)
            .map_err(|_| MultiplyError::OutOfMemory("spinlock array"))?;
        flags.resize_with(count, || CachePadded::new(AtomicBool::new(false)));
        Ok(Self { flags })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Acquires the lock at `idx`, returning an RAII guard that releases it
    /// on drop (including unwinding drop during a panic).
    pub fn lock(&self, idx: usize) -> SpinlockGuard<'_> {
        let flag = &self.flags[idx];
        while flag
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        SpinlockGuard { flag }
    }
}

pub struct SpinlockGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SpinlockGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Bucket-addressed term storage.
//!
//! Terms are stored by separate chaining rather than open addressing: each
//! bucket owns an independent [`Chain`] of terms whose key hashes to that
//! bucket. This is a deliberate departure from the upstream project's
//! SIMD probe-sequence table, forced by the concurrency model: a worker
//! that holds bucket `i`'s spinlock must be the only thread able to touch
//! any term belonging to bucket `i`. Open addressing breaks that guarantee
//! because a key can be displaced into a neighbouring bucket's slot range
//! during insertion; chaining keeps every term pinned to its home bucket for
//! its entire lifetime.

use crate::index::hash::chain::Chain;
use crate::term::{Coeff, Key, Term};

/// Raw bucket array, addressed by `hash % bucket_count`.
///
/// `RawTable` has no notion of "series" semantics (symbol sets, coefficient
/// merging policy); it only knows how to place, find and remove terms by
/// key hash. [`super::HashSet`] layers the merge-on-collision semantics on
/// top.
pub struct RawTable<K: Key> {
    buckets: Vec<Chain<Term<K>>>,
    len: usize,
}

impl<K: Key> RawTable<K> {
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1).next_power_of_two();
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Chain::new);
        Self { buckets, len: 0 }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maps a key hash to its home bucket. `bucket_count` is always a power
    /// of two, so this is a mask rather than a modulo.
    #[inline]
    pub fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.bucket_count() - 1)
    }

    #[inline]
    pub fn chain(&self, idx: usize) -> &Chain<Term<K>> {
        &self.buckets[idx]
    }

    #[inline]
    pub fn chain_mut(&mut self, idx: usize) -> &mut Chain<Term<K>> {
        &mut self.buckets[idx]
    }

    /// Looks up `key` within bucket `idx` only. The caller is responsible
    /// for having computed `idx` from the key's hash and for holding
    /// whatever external lock protects bucket `idx`.
    pub fn find_in_bucket<'a>(&'a self, idx: usize, key: &K) -> Option<&'a Term<K>> {
        self.buckets[idx].iter().find(|t| t.key.key_eq(key))
    }

    pub fn find_in_bucket_mut<'a>(&'a mut self, idx: usize, key: &K) -> Option<&'a mut Term<K>> {
        self.buckets[idx].find_mut(|t| t.key.key_eq(key))
    }

    /// Inserts `term` into bucket `idx`, merging its coefficient into an
    /// existing term with the same key if one is present. Returns `true` if
    /// a new term was added (table grew by one), `false` if an existing
    /// term absorbed it.
    ///
    /// Not for use from the striped parallel phase: it touches `self.len`,
    /// a single field shared by every bucket, which no per-bucket lock
    /// protects. Use [`RawTable::unique_insert`] there instead.
    pub fn insert_in_bucket(&mut self, idx: usize, term: Term<K>) -> bool {
        if self.unique_insert(idx, term) {
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Low-level counterpart to [`RawTable::insert_in_bucket`] that never
    /// touches `self.len`. Safe to call concurrently from distinct threads
    /// as long as each thread holds the external lock for `idx` and no two
    /// threads ever hold the lock for the same `idx` at once: every field it
    /// touches (the bucket's own [`Chain`]) lives entirely inside bucket
    /// `idx`. Callers are responsible for folding the count of `true`
    /// results back into the table via [`RawTable::update_size`] once, after
    /// every concurrent caller has finished.
    pub fn unique_insert(&mut self, idx: usize, term: Term<K>) -> bool {
        if let Some(existing) = self.find_in_bucket_mut(idx, &term.key) {
            existing.cf.add_assign(term.cf);
            false
        } else {
            self.buckets[idx].push(term);
            true
        }
    }

    /// Removes the term with the given key from bucket `idx`, if present.
    pub fn erase(&mut self, idx: usize, key: &K) -> Option<Term<K>> {
        let removed = self.buckets[idx].remove_first(|t| t.key.key_eq(key));
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Rebuilds the table with `new_bucket_count` buckets, redistributing
    /// every term by its key hash. `new_bucket_count` is rounded up to the
    /// next power of two.
    pub fn rehash(&mut self, new_bucket_count: usize) {
        let new_bucket_count = new_bucket_count.max(1).next_power_of_two();
        if new_bucket_count == self.bucket_count() {
            return;
        }
        let mut new_buckets = Vec::with_capacity(new_bucket_count);
        new_buckets.resize_with(new_bucket_count, Chain::new);
        let mask = new_bucket_count - 1;
        for chain in self.buckets.drain(..) {
            for term in chain_into_iter(chain) {
                let idx = (term.key.hash() as usize) & mask;
                new_buckets[idx].push(term);
            }
        }
        self.buckets = new_buckets;
    }

    /// Iterates over every stored term, in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Term<K>> {
        self.buckets.iter().flat_map(|chain| chain.iter())
    }

    /// Overwrites the reported length without touching storage. Used after
    /// the parallel phase of a multiplication has populated every bucket's
    /// chain directly and the authoritative count must be refreshed from
    /// the bucket contents (see [`crate::multiplier`]).
    pub fn update_size(&mut self, new_size: usize) {
        self.len = new_size;
    }

    pub fn recount(&mut self) {
        self.len = self.buckets.iter().map(Chain::len).sum();
    }
}

fn chain_into_iter<T>(mut chain: Chain<T>) -> impl Iterator<Item = T> {
    let mut out = Vec::with_capacity(chain.len());
    while let Some(item) = chain.remove_first(|_| true) {
        out.push(item);
    }
    out.into_iter()
}

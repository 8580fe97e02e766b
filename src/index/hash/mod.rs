// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

mod chain;
mod table;

pub use table::RawTable;

use crate::term::{Key, Term};

/// Owning term container used by [`crate::Series`].
///
/// Wraps [`RawTable`] with the bucket-hash bookkeeping every caller would
/// otherwise have to repeat: callers that need bucket-local access (the
/// parallel multiplier, iterating the spinlock array in lockstep) reach
/// through [`HashSet::table`] / [`HashSet::table_mut`] directly.
pub struct HashSet<K: Key> {
    table: RawTable<K>,
}

impl<K: Key> HashSet<K> {
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self {
            table: RawTable::with_bucket_count(bucket_count),
        }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn table(&self) -> &RawTable<K> {
        &self.table
    }

    #[inline]
    pub fn table_mut(&mut self) -> &mut RawTable<K> {
        &mut self.table
    }

    /// Load factor: `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.table.len() as f64 / self.table.bucket_count() as f64
    }

    /// Inserts a term, merging with any existing term of the same key.
    /// Returns `true` if the table grew.
    pub fn insert(&mut self, term: Term<K>) -> bool {
        let idx = self.table.bucket_of(term.key.hash());
        self.table.insert_in_bucket(idx, term)
    }

    pub fn get(&self, key: &K) -> Option<&Term<K>> {
        let idx = self.table.bucket_of(key.hash());
        self.table.find_in_bucket(idx, key)
    }

    pub fn remove(&mut self, key: &K) -> Option<Term<K>> {
        let idx = self.table.bucket_of(key.hash());
        self.table.erase(idx, key)
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn rehash_to(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term<K>> {
        self.table.iter()
    }
}

// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! The top-level series container.

use std::fmt;

use crate::index::hash::HashSet;
use crate::term::{Key, SymbolSet, Term};

/// A finite formal sum of terms over a shared symbol set.
///
/// Invariants:
/// - I1: no two stored terms compare equal by key.
/// - I2: no stored term is ignorable under `symbols`.
pub struct Series<K: Key> {
    symbols: SymbolSet,
    terms: HashSet<K>,
    max_load_factor: f64,
}

impl<K: Key> Series<K> {
    pub fn new(symbols: SymbolSet) -> Self {
        Self::with_bucket_count(symbols, 8)
    }

    pub fn with_bucket_count(symbols: SymbolSet, bucket_count: usize) -> Self {
        Self {
            symbols,
            terms: HashSet::with_bucket_count(bucket_count),
            max_load_factor: 1.0,
        }
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.terms.bucket_count()
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.terms.load_factor()
    }

    #[inline]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn set_max_load_factor(&mut self, factor: f64) {
        self.max_load_factor = factor;
    }

    #[inline]
    pub(crate) fn terms(&self) -> &HashSet<K> {
        &self.terms
    }

    #[inline]
    pub(crate) fn terms_mut(&mut self) -> &mut HashSet<K> {
        &mut self.terms
    }

    /// Inserts a term, enforcing I2 by silently dropping ignorable terms and
    /// I1 by merging into any existing term with an equal key.
    pub fn insert(&mut self, term: Term<K>) {
        if term.key.is_ignorable(&self.symbols) {
            return;
        }
        self.terms.insert(term);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term<K>> {
        self.terms.iter()
    }

    /// `true` if both series were built over the same symbols, by identity
    /// of content rather than the backing `Arc` pointer.
    pub fn symbols_compatible(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<K: Key> fmt::Debug for Series<K>
where
    K: fmt::Debug,
    K::Coeff: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series")
            .field("symbols", &self.symbols)
            .field("len", &self.len())
            .field("terms", &self.terms.iter().collect::<Vec<_>>())
            .finish()
    }
}

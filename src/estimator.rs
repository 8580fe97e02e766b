// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Statistical estimation of the result series' cardinality.
//!
//! Mirrors the upstream project's `estimate_final_series_size`: rather than
//! actually multiplying every pair of terms up front, run a handful of
//! birthday-problem-style trials and extrapolate. Multiplying `n1` by `n2`
//! terms is exactly the cost we are trying to avoid paying twice.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{MultiplyError, Result};
use crate::term::{Key, SymbolSet, Term};
use crate::tracing_sink::Sink;

const NTRIALS: u64 = 10;
const MULTIPLIER: u64 = 2;
const ESTIMATE_THRESHOLD: u128 = 100_000;
const SEED: u64 = 0xC0FF_EE15_BADF_00D;

/// Returns `0` when the estimator should not be trusted (too little total
/// work to amortise the trials), otherwise a statistical estimate of
/// `|v1 × v2|`'s unique-key count.
pub fn estimate_final_series_size<K: Key>(
    v1: &[Term<K>],
    v2: &[Term<K>],
    symbols: &SymbolSet,
    sink: &Sink,
) -> Result<u64> {
    let n1 = v1.len() as u128;
    let n2 = v2.len() as u128;
    if n1 == 0 || n2 == 0 {
        return Ok(0);
    }
    if n1 < ESTIMATE_THRESHOLD / n2.max(1) {
        return Ok(0);
    }

    let max_m = (((n1 * n2) / MULTIPLIER as u128) as f64).sqrt().floor() as u64;

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut p1: Vec<usize> = (0..v1.len()).collect();
    let mut p2: Vec<usize> = (0..v2.len()).collect();

    let mut total_count: u64 = 0;
    for _ in 0..NTRIALS {
        p1.shuffle(&mut rng);
        p2.shuffle(&mut rng);
        let count = run_trial(v1, v2, &p1, &p2, symbols, max_m)?;
        total_count = total_count
            .checked_add(count)
            .ok_or(MultiplyError::Overflow("estimator trial accumulation"))?;
    }

    let mean = total_count / NTRIALS;
    let estimate = mean
        .checked_mul(mean)
        .and_then(|sq| sq.checked_mul(MULTIPLIER))
        .ok_or(MultiplyError::Overflow("estimator mean-squared extrapolation"))?;

    sink.record_estimate(estimate);
    tracing::debug!(estimate, n1 = n1 as u64, n2 = n2 as u64, "series size estimated");
    Ok(estimate)
}

/// Runs one shuffle-and-walk trial, returning the number of terms inserted
/// into a scratch container before the walk stopped.
///
/// Walk semantics mirror the reference implementation: `it1`/`it2` advance
/// in lockstep over the shuffled permutations; when `it2` wraps, it simply
/// restarts; when `it1` also wraps (i.e. `it2` wrapped on the step that
/// exhausted `it1`), the whole trial ends. The trial additionally stops the
/// moment an inserted product fails to add a brand-new key (a collision) or
/// once `max_m` multiplications have been performed.
fn run_trial<K: Key>(
    v1: &[Term<K>],
    v2: &[Term<K>],
    p1: &[usize],
    p2: &[usize],
    symbols: &SymbolSet,
    max_m: u64,
) -> Result<u64> {
    let mut scratch: Vec<Term<K>> = Vec::new();
    let mut out: Vec<Term<K>> = Vec::with_capacity(K::MULTIPLY_ARITY);
    let arity = K::MULTIPLY_ARITY;

    let mut i1 = 0usize;
    let mut i2 = 0usize;
    let mut steps: u64 = 0;
    let mut count: u64 = 0;

    while steps < max_m {
        out.clear();
        K::multiply(&mut out, &v1[p1[i1]], &v2[p2[i2]], symbols);
        steps += 1;

        let mut added = 0usize;
        for term in out.drain(..) {
            if !term.key.is_ignorable(symbols) && insert_unique(&mut scratch, term) {
                added += 1;
            }
        }
        count = count
            .checked_add(added as u64)
            .ok_or(MultiplyError::Overflow("estimator trial insertion count"))?;
        if added != arity {
            break;
        }

        i2 += 1;
        if i2 >= p2.len() {
            i2 = 0;
            i1 += 1;
            if i1 >= p1.len() {
                break;
            }
        }
    }
    Ok(count)
}

fn insert_unique<K: Key>(scratch: &mut Vec<Term<K>>, term: Term<K>) -> bool {
    if scratch.iter().any(|t| t.key.key_eq(&term.key)) {
        false
    } else {
        scratch.push(term);
        true
    }
}

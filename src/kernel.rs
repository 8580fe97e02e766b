// Modifications Copyright (c) KTH Royal Institute of Technology
// SPDX-License-Identifier: MIT

//! Cache-blocked double loop over two term arrays.
//!
//! Visits every `(i, j)` pair in `[0, n1) × [0, n2)` exactly once, tiled
//! into `block_size × block_size` squares so that, for a fixed first-operand
//! block, the same slice of the second operand is revisited while it is
//! still hot in cache. Partial blocks at either edge fall out of the same
//! loop naturally (the block bounds are clamped to `n1`/`n2`) rather than
//! needing separate tail-handling code.

use crate::term::{Key, SymbolSet, Term};

/// Multiplies every term in `v1` by every term in `v2`, handing each
/// non-ignorable product term to `emit` as it is produced.
pub fn blocked_multiply<K: Key>(
    v1: &[Term<K>],
    v2: &[Term<K>],
    symbols: &SymbolSet,
    block_size: usize,
    mut emit: impl FnMut(Term<K>),
) {
    let n1 = v1.len();
    let n2 = v2.len();
    if n1 == 0 || n2 == 0 {
        return;
    }
    let b = block_size.max(1);
    let mut out: Vec<Term<K>> = Vec::with_capacity(K::MULTIPLY_ARITY);

    let mut block_i = 0;
    while block_i < n1 {
        let i_end = (block_i + b).min(n1);
        let mut block_j = 0;
        while block_j < n2 {
            let j_end = (block_j + b).min(n2);
            for i in block_i..i_end {
                for j in block_j..j_end {
                    out.clear();
                    K::multiply(&mut out, &v1[i], &v2[j], symbols);
                    for term in out.drain(..) {
                        if !term.key.is_ignorable(symbols) {
                            emit(term);
                        }
                    }
                }
            }
            block_j = j_end;
        }
        block_i = i_end;
    }
}

// src/engine/maps.rs

//! Index permutation generators. Each fills `ctx.map` and records how it is read.

use super::codelet::{CodeletOptions, MapDirection};
use super::context::{TxContext, try_alloc};
use crate::common::TxError;
use crate::math::{gcd, mulinv};
use crate::sample::TxSample;

#[inline]
fn requested(opts: Option<&CodeletOptions>) -> MapDirection {
    opts.map_or(MapDirection::Gather, |o| o.map_dir)
}

#[inline]
fn wants_scatter(opts: Option<&CodeletOptions>) -> bool {
    opts.is_some_and(|o| o.map_dir == MapDirection::Scatter)
}

/// Good-Thomas input map for blocks of `d1 * d2` points, repeated over `ctx.len`.
pub fn gen_pfa_input_map<T: TxSample>(
    ctx: &mut TxContext<T>,
    opts: Option<&CodeletOptions>,
    d1: usize,
    d2: usize,
) -> Result<(), TxError> {
    let sl = d1 * d2;
    if sl == 0 || ctx.len % sl != 0 {
        return Err(TxError::InvalidArgument);
    }
    let mut map = try_alloc::<usize>(ctx.len)?;

    for k in (0..ctx.len).step_by(sl) {
        let block = &mut map[k..k + sl];
        if ctx.inverse || wants_scatter(opts) {
            for m in 0..d2 {
                for n in 0..d1 {
                    block[(m * d1 + n * d2) % sl] = m * d1 + n;
                }
            }
        } else {
            for m in 0..d2 {
                for n in 0..d1 {
                    block[m * d1 + n] = (m * d1 + n * d2) % sl;
                }
            }
        }
        if ctx.inverse {
            for w in 1..=(sl >> 1) {
                block.swap(w, sl - w);
            }
        }
    }

    ctx.map = map;
    ctx.map_dir = requested(opts);
    Ok(())
}

/// Chinese-remainder map for a transform of `n * m` points. The map holds
/// the input permutation followed by the output permutation.
pub fn gen_compound_map<T: TxSample>(
    ctx: &mut TxContext<T>,
    opts: Option<&CodeletOptions>,
    inverse: bool,
    n: usize,
    m: usize,
) -> Result<(), TxError> {
    if n == 0 || m == 0 || gcd(n, m) != 1 {
        return Err(TxError::InvalidArgument);
    }
    let len = n * m;
    let m_inv = mulinv(m, n);
    let n_inv = mulinv(n, m);

    let mut map = try_alloc::<usize>(2 * len)?;
    let (in_map, out_map) = map.split_at_mut(len);
    let scatter = wants_scatter(opts);

    for j in 0..m {
        for i in 0..n {
            if scatter {
                in_map[(i * m + j * n) % len] = j * n + i;
            } else {
                in_map[j * n + i] = (i * m + j * n) % len;
            }
            out_map[(i * m * m_inv + j * n * n_inv) % len] = i * m + j;
        }
    }

    if inverse {
        for i in 0..m {
            // DC stays put
            let row = &mut in_map[i * n + 1..(i + 1) * n];
            row.reverse();
        }
    }

    ctx.map = map;
    ctx.map_dir = requested(opts);
    Ok(())
}

/// Split-radix position of index `i` in a power-of-two transform of `len`.
fn split_radix_permutation(i: usize, len: usize, inverse: bool) -> isize {
    let len = len >> 1;
    if len <= 1 {
        return (i & 1) as isize;
    }
    if i & len == 0 {
        return split_radix_permutation(i, len, inverse) * 2;
    }
    let len = len >> 1;
    let sign = ((i & len == 0) ^ inverse) as isize;
    split_radix_permutation(i, len, inverse) * 4 + 1 - 2 * sign
}

/// Split-radix input ordering for a power-of-two `ctx.len`.
pub fn gen_ptwo_revtab<T: TxSample>(
    ctx: &mut TxContext<T>,
    opts: Option<&CodeletOptions>,
) -> Result<(), TxError> {
    let len = ctx.len;
    if !len.is_power_of_two() {
        return Err(TxError::InvalidArgument);
    }
    let mask = len - 1;
    let mut map = try_alloc::<usize>(len)?;
    let scatter = wants_scatter(opts);

    for i in 0..len {
        let pos = (-split_radix_permutation(i, len, ctx.inverse)) as usize & mask;
        if scatter {
            map[pos] = i;
        } else {
            map[i] = pos;
        }
    }

    ctx.map = map;
    ctx.map_dir = requested(opts);
    Ok(())
}

/// Cycle entry points for applying the first child's scatter map in place.
/// Each listed index starts one cycle, the list ends with a 0 sentinel.
pub fn gen_inplace_map<T: TxSample>(ctx: &mut TxContext<T>, len: usize) -> Result<(), TxError> {
    let src_map = match ctx.sub.first() {
        Some(sub) if sub.map.len() >= len => &sub.map,
        _ => return Err(TxError::InvalidArgument),
    };
    let mut out = try_alloc::<usize>(len.max(1))?;
    let mut count = 0usize;

    // Index 0 is always in place.
    for src in 1..len {
        let mut dst = src_map[src];
        if dst <= src {
            continue;
        }
        let mut found = false;
        loop {
            if out[..count].contains(&dst) {
                found = true;
            }
            dst = src_map[dst];
            if dst == src || found {
                break;
            }
        }
        if !found {
            out[count] = src;
            count += 1;
        }
    }
    out[count] = 0;
    out.truncate(count + 1);

    ctx.map = out;
    Ok(())
}

/// Identity map, or index negation for inverse transforms.
pub fn gen_default_map<T: TxSample>(
    ctx: &mut TxContext<T>,
    opts: Option<&CodeletOptions>,
) -> Result<(), TxError> {
    let len = ctx.len;
    let mut map = try_alloc::<usize>(len)?;
    for (i, slot) in map.iter_mut().enumerate().skip(1) {
        *slot = if ctx.inverse { len - i } else { i };
    }

    ctx.map = map;
    ctx.map_dir = requested(opts);
    Ok(())
}

#[cfg(test)]
#[path = "maps_tests.rs"]
mod tests;

// src/codelets/pfa.rs

//! Prime-factor FFT of two coprime sub-FFTs.

use alloc::vec::Vec;

use crate::common::{PRIO_BASE, TxError, TxFlags, TxKind, TxType};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::maps::gen_compound_map;
use crate::engine::{
    CodeletDescriptor, CodeletOptions, CodeletType, Factor, InitArgs, MapDirection, TxContext,
    TxIo, TxRegistry, decompose_length, init_subtx,
};
use crate::sample::{self, TxSample, cplx_scaled};

const FACTORS: &[Factor] = &[
    Factor::Of(7),
    Factor::Of(5),
    Factor::Of(3),
    Factor::Of(2),
    Factor::Any,
];

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    let flags = TxFlags::UNALIGNED | TxFlags::INPLACE | TxFlags::OUT_OF_PLACE;
    [("fft_pfa", flags), ("fft_pfa_ns", flags | TxFlags::PRESHUFFLE)]
        .into_iter()
        .map(|(name, flags)| CodeletDescriptor {
            name,
            ty: CodeletType::Kind(TxKind::Fft),
            factors: FACTORS,
            nb_factors: 2,
            min_len: 2 * 3,
            max_len: None,
            flags,
            cpu_flags: CpuFlags::ALL,
            prio: PRIO_BASE,
            init: Some(pfa_init::<T>),
            uninit: None,
            function: pfa_tx::<T>,
        })
        .collect()
}

fn pfa_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let (ty, len, inverse) = (ctx.ty, ctx.len, ctx.inverse);
    let preshuffled = ctx.flags.contains(TxFlags::PRESHUFFLE);

    let mut found = Err(TxError::NotSupported);
    for d in decompose_length(args.registry, ty, len, inverse)? {
        let mut len1 = d.consumed;
        let mut len2 = len / len1;
        // The column transform is better off with the power of two.
        if !len2.is_power_of_two() {
            core::mem::swap(&mut len1, &mut len2);
        }

        ctx.clear_subs();
        found = init_pair(ctx, args.registry, ty, args.flags, len1, len2, inverse);
        match found {
            Ok(()) => break,
            Err(err) if err.is_fatal() => return Err(err),
            Err(_) => continue,
        }
    }
    found?;

    let n = ctx.sub[0].len;
    let m = ctx.sub[1].len;
    gen_compound_map(ctx, None, false, n, m)?;

    // Fold the row transform's input permutation into the gather map.
    {
        let TxContext { map, sub, .. } = &mut *ctx;
        if let Some(row_map) = preshuffle_map(&sub[0]) {
            let mut row = try_alloc::<usize>(n)?;
            for block in map[..len].chunks_exact_mut(n) {
                row.copy_from_slice(block);
                for (slot, &src) in block.iter_mut().zip(row_map.iter()) {
                    *slot = row[src];
                }
            }
        }
    }

    // Built as a gather map; a preshuffled parent may want it turned around.
    let scatter = preshuffled && args.map_dir() == MapDirection::Scatter;
    if scatter {
        let mut gather = try_alloc::<usize>(len)?;
        gather.copy_from_slice(&ctx.map[..len]);
        for (i, &src) in gather.iter().enumerate() {
            ctx.map[src] = i;
        }
    }
    ctx.map_dir = if scatter {
        MapDirection::Scatter
    } else {
        MapDirection::Gather
    };

    let extra = if !ctx.sub[1].flags.contains(TxFlags::INPLACE) {
        len
    } else if !preshuffled {
        n
    } else {
        0
    };
    ctx.tmp = try_alloc(len)?;
    ctx.exp = try_alloc(extra + n)?;
    Ok(())
}

/// Builds the row transform (gather, out of place) and then the column
/// transform (scatter, in place if possible), dropping the preshuffle
/// requirement when nothing can honour it.
fn init_pair<T: TxSample>(
    ctx: &mut TxContext<T>,
    registry: &TxRegistry<T>,
    ty: TxType,
    base: TxFlags,
    len1: usize,
    len2: usize,
    inverse: bool,
) -> Result<(), TxError> {
    let gather = CodeletOptions::new(MapDirection::Gather);
    let scatter = CodeletOptions::new(MapDirection::Scatter);

    let mut flags = base;
    flags.remove(TxFlags::INPLACE);
    flags.insert(TxFlags::OUT_OF_PLACE | TxFlags::PRESHUFFLE);
    if let Err(err) = init_subtx(ctx, registry, ty, flags, Some(&gather), len1, inverse, None) {
        if err.is_fatal() {
            return Err(err);
        }
        flags.remove(TxFlags::PRESHUFFLE);
        init_subtx(ctx, registry, ty, flags, Some(&gather), len1, inverse, None)?;
    }

    flags.insert(TxFlags::PRESHUFFLE);
    loop {
        flags.remove(TxFlags::OUT_OF_PLACE);
        flags.insert(TxFlags::INPLACE);
        match init_subtx(ctx, registry, ty, flags, Some(&scatter), len2, inverse, None) {
            Err(err) if !err.is_fatal() => {}
            res => return res,
        }

        flags.remove(TxFlags::INPLACE);
        flags.insert(TxFlags::OUT_OF_PLACE);
        match init_subtx(ctx, registry, ty, flags, Some(&scatter), len2, inverse, None) {
            Err(err) if !err.is_fatal() && flags.contains(TxFlags::PRESHUFFLE) => {
                flags.remove(TxFlags::PRESHUFFLE);
            }
            res => return res,
        }
    }
}

#[inline]
fn preshuffle_map<T: TxSample>(sub: &TxContext<T>) -> Option<&[usize]> {
    sub.flags
        .contains(TxFlags::PRESHUFFLE)
        .then_some(sub.map.as_slice())
}

fn pfa_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let preshuffled = ctx.flags.contains(TxFlags::PRESHUFFLE);
    let scale = ctx.scale_f64();
    let len = ctx.len;
    let TxContext {
        sub, map, tmp, exp, ..
    } = ctx;
    let [sub0, sub1] = sub.as_mut_slice() else {
        return;
    };
    let (in_map, out_map) = map.split_at(len);

    let (done, out) = match io {
        TxIo::InPlace(buf) => {
            let buf = sample::as_complex_mut::<T>(buf);
            let done = pfa_columns(sub0, sub1, in_map, preshuffled, tmp, exp, buf);
            (done, buf)
        }
        TxIo::OutOfPlace { out, input } => {
            let input = sample::as_complex::<T>(input);
            let done = pfa_columns(sub0, sub1, in_map, preshuffled, tmp, exp, input);
            (done, sample::as_complex_mut::<T>(out))
        }
    };

    for (o, &src) in out[..len].iter_mut().zip(out_map.iter()) {
        *o = match scale {
            Some(s) if s != 1.0 => cplx_scaled::<T>(done[src], s),
            _ => done[src],
        };
    }
}

/// Row transforms into `tmp`, then column transforms. Returns the buffer
/// holding the result in CRT order.
fn pfa_columns<'s, T: TxSample>(
    sub0: &mut TxContext<T>,
    sub1: &mut TxContext<T>,
    in_map: &[usize],
    preshuffled: bool,
    tmp: &'s mut [T::Complex],
    exp: &'s mut [T::Complex],
    input: &[T::Complex],
) -> &'s [T::Complex] {
    let n = sub0.len;
    let m = sub1.len;
    let len = n * m;
    let sub1_inplace = sub1.flags.contains(TxFlags::INPLACE);

    let row_off = if !sub1_inplace {
        len
    } else if !preshuffled {
        n
    } else {
        0
    };
    let (scratch, row) = exp.split_at_mut(row_off);
    let row = &mut row[..n];

    {
        let col_map = preshuffle_map(sub1);
        for i in 0..m {
            if preshuffled {
                sub0.call_complex(row, &input[i * n..(i + 1) * n]);
            } else {
                for (s, &src) in scratch[..n].iter_mut().zip(&in_map[i * n..(i + 1) * n]) {
                    *s = input[src];
                }
                sub0.call_complex(row, &scratch[..n]);
            }
            let col = col_map.map_or(i, |map| map[i]);
            for (k, &v) in row.iter().enumerate() {
                tmp[col + k * m] = v;
            }
        }
    }

    if sub1_inplace {
        for chunk in tmp[..len].chunks_exact_mut(m) {
            sub1.call_complex_in_place(chunk);
        }
        let done: &'s [T::Complex] = tmp;
        done
    } else {
        for (dst, src) in scratch[..len].chunks_exact_mut(m).zip(tmp.chunks_exact(m)) {
            sub1.call_complex(dst, src);
        }
        let done: &'s [T::Complex] = scratch;
        &done[..len]
    }
}

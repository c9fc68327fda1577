// src/codelets/mdct.rs

//! MDCT and IMDCT: direct sums, the FFT-based fast path and the full-window IMDCT.

use alloc::vec::Vec;
use core::f64::consts::{FRAC_PI_2, PI};

use crate::common::{PRIO_BASE, PRIO_MIN, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::{
    CodeletDescriptor, CodeletOptions, CodeletType, Factor, InitArgs, InitFn, MapDirection,
    TxContext, TxFn, TxIo, init_subtx,
};
use crate::math;
use crate::sample::{self, TxComplex, TxSample};

const NAIVE_FACTORS: &[Factor] = &[Factor::Of(2), Factor::Any];
const FAST_FACTORS: &[Factor] = &[Factor::Of(4), Factor::Any];

#[allow(clippy::too_many_arguments)]
fn descriptor<T: TxSample>(
    name: &'static str,
    factors: &'static [Factor],
    min_len: usize,
    flags: TxFlags,
    prio: i32,
    init: Option<InitFn<T>>,
    function: TxFn<T>,
) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(TxKind::Mdct),
        factors,
        nb_factors: 2,
        min_len,
        max_len: None,
        flags,
        cpu_flags: CpuFlags::ALL,
        prio,
        init,
        uninit: None,
        function,
    }
}

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    let oop = TxFlags::UNALIGNED | TxFlags::OUT_OF_PLACE;
    alloc::vec![
        descriptor(
            "mdct_naive_fwd",
            NAIVE_FACTORS,
            2,
            oop | TxFlags::FORWARD_ONLY,
            PRIO_MIN,
            None,
            mdct_naive_fwd_tx::<T>,
        ),
        descriptor(
            "mdct_naive_inv",
            NAIVE_FACTORS,
            2,
            oop | TxFlags::INVERSE_ONLY,
            PRIO_MIN,
            None,
            mdct_naive_inv_tx::<T>,
        ),
        descriptor(
            "mdct_fwd",
            FAST_FACTORS,
            4,
            oop | TxFlags::FORWARD_ONLY,
            PRIO_BASE,
            Some(mdct_init::<T>),
            mdct_fwd_tx::<T>,
        ),
        descriptor(
            "mdct_inv",
            FAST_FACTORS,
            4,
            oop | TxFlags::INVERSE_ONLY,
            PRIO_BASE,
            Some(mdct_init::<T>),
            mdct_inv_tx::<T>,
        ),
        descriptor(
            "mdct_inv_full",
            NAIVE_FACTORS,
            2,
            oop | TxFlags::INPLACE | TxFlags::FULL_IMDCT,
            PRIO_BASE,
            Some(mdct_inv_full_init::<T>),
            mdct_inv_full_tx::<T>,
        ),
    ]
}

#[inline]
fn scale_or_unit<T: TxSample>(ctx: &TxContext<T>) -> f64 {
    ctx.scale_f64().unwrap_or(1.0)
}

fn mdct_naive_fwd_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input } = io else { return };
    let len = ctx.len;
    let scale = scale_or_unit(ctx);
    let phase = PI / (4 * len) as f64;

    for i in 0..len {
        let mut sum = 0.0;
        for (j, &x) in input[..2 * len].iter().enumerate() {
            let a = (2 * j + 1 + len) as f64 * (2 * i + 1) as f64;
            sum += x.to_f64() * math::cos(a * phase);
        }
        out[i * stride] = T::from_f64(sum * scale);
    }
}

fn mdct_naive_inv_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input } = io else { return };
    let len = ctx.len;
    let len2 = len / 2;
    let scale = scale_or_unit(ctx);
    let phase = PI / (4 * len) as f64;

    for i in 0..len2 {
        let i_d = phase * (2 * len - 2 * i - 1) as f64;
        let i_u = phase * (3 * len + 2 * i + 1) as f64;
        let (mut sum_d, mut sum_u) = (0.0, 0.0);
        for j in 0..len {
            let x = input[j * stride].to_f64();
            let a = (2 * j + 1) as f64;
            sum_d += x * math::cos(a * i_d);
            sum_u += x * math::cos(a * i_u);
        }
        out[i] = T::from_f64(sum_d * scale);
        out[len2 + i] = T::from_f64(-sum_u * scale);
    }
}

/// Pre and post rotation table. The inverse keeps a copy reordered by the
/// FFT's input map in front of the natural-order table.
fn gen_exp<T: TxSample>(
    len: usize,
    scale: f64,
    pre_map: Option<&[usize]>,
) -> Result<Vec<T::Complex>, TxError> {
    let len4 = len / 2;
    let theta = if scale < 0.0 { len4 as f64 } else { 0.0 } + 1.0 / 8.0;
    let mag = math::sqrt(scale.abs());
    let off = if pre_map.is_some() { len4 } else { 0 };

    let mut exp = try_alloc::<T::Complex>(off + len4)?;
    for i in 0..len4 {
        let alpha = FRAC_PI_2 * (i as f64 + theta) / len4 as f64;
        let (sin, cos) = math::sin_cos(alpha);
        exp[off + i] = T::Complex::new(T::from_f64(cos * mag), T::from_f64(sin * mag));
    }
    if let Some(pre) = pre_map {
        for i in 0..len4 {
            exp[i] = exp[len4 + pre[i]];
        }
    }
    Ok(exp)
}

fn mdct_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let (len, inverse) = (ctx.len, ctx.inverse);
    let half = len / 2;
    let fft = ctx.ty.with_kind(TxKind::Fft);
    let opts = CodeletOptions::new(if inverse {
        MapDirection::Gather
    } else {
        MapDirection::Scatter
    });

    let mut flags = args.flags;
    flags.remove(TxFlags::OUT_OF_PLACE);
    flags.insert(TxFlags::INPLACE | TxFlags::PRESHUFFLE);
    if let Err(err) = init_subtx(ctx, args.registry, fft, flags, Some(&opts), half, inverse, None)
    {
        if err.is_fatal() {
            return Err(err);
        }
        flags.remove(TxFlags::PRESHUFFLE);
        init_subtx(ctx, args.registry, fft, flags, Some(&opts), half, inverse, None)?;
    }

    let mut map = try_alloc::<usize>(half)?;
    let sub = &ctx.sub[0];
    if sub.flags.contains(TxFlags::PRESHUFFLE) {
        map.copy_from_slice(&sub.map[..half]);
    } else {
        for (i, slot) in map.iter_mut().enumerate() {
            *slot = i;
        }
    }

    ctx.exp = gen_exp::<T>(len, scale_or_unit(ctx), inverse.then_some(map.as_slice()))?;
    if inverse {
        // Indexes samples, two per complex value.
        for slot in map.iter_mut() {
            *slot <<= 1;
        }
    } else {
        ctx.tmp = try_alloc(half)?;
    }
    ctx.map = map;
    Ok(())
}

fn mdct_fwd_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input: src } = io else { return };
    let len = ctx.len;
    let (len2, len4) = (len / 2, len / 4);
    let len3 = len2 * 3;
    let TxContext {
        sub, map, exp, tmp, ..
    } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let z = &mut tmp[..len2];

    for i in 0..len2 {
        let k = 2 * i;
        let (re, im) = if k < len2 {
            (
                -src[len2 + k] + src[len2 - 1 - k],
                -src[len3 + k] - src[len3 - 1 - k],
            )
        } else {
            (
                -src[len2 + k] - src[5 * len2 - 1 - k],
                src[k - len2] - src[len3 - 1 - k],
            )
        };
        let folded = T::Complex::new(re, im) * exp[i];
        z[map[i]] = folded.swapped();
    }

    sub.call_complex_in_place(z);

    for i in 0..len4 {
        let i0 = len4 + i;
        let i1 = len4 - i - 1;
        let o0 = z[i0] * exp[i0].swapped();
        let o1 = z[i1] * exp[i1].swapped();
        out[(2 * i1 + 1) * stride] = o0.re();
        out[2 * i0 * stride] = o0.im();
        out[(2 * i0 + 1) * stride] = o1.re();
        out[2 * i1 * stride] = o1.im();
    }
}

fn mdct_inv_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input } = io else { return };
    let len = ctx.len;
    let (len2, len4) = (len / 2, len / 4);
    let TxContext { sub, map, exp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let z = &mut sample::as_complex_mut::<T>(out)[..len2];

    for (i, (slot, &k)) in z.iter_mut().zip(map.iter()).enumerate() {
        let x = T::Complex::new(input[(len - 1 - k) * stride], input[k * stride]);
        *slot = x * exp[i];
    }

    sub.call_complex_in_place(z);

    let post = &exp[len2..];
    for i in 0..len4 {
        let i0 = len4 + i;
        let i1 = len4 - i - 1;
        let o1 = z[i1].swapped() * post[i1].swapped();
        let o0 = z[i0].swapped() * post[i0].swapped();
        z[i1] = T::Complex::new(o1.re(), o0.im());
        z[i0] = T::Complex::new(o0.re(), o1.im());
    }
}

fn mdct_inv_full_init<T: TxSample>(
    ctx: &mut TxContext<T>,
    args: &InitArgs<'_, T>,
) -> Result<(), TxError> {
    let (ty, len) = (ctx.ty, ctx.len);
    let mut flags = args.flags;
    flags.remove(TxFlags::FULL_IMDCT | TxFlags::INPLACE);
    flags.insert(TxFlags::OUT_OF_PLACE);
    init_subtx(ctx, args.registry, ty, flags, None, len, true, args.scale)?;
    // Holds the coefficients while an in-place call overwrites them.
    ctx.tmp = try_alloc(len.div_ceil(2))?;
    Ok(())
}

fn mdct_inv_full_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let TxContext { sub, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };

    let out = match io {
        TxIo::OutOfPlace { out, input } => {
            sub.call(
                TxIo::OutOfPlace {
                    out: &mut out[len2..len2 + len],
                    input,
                },
                stride,
            );
            out
        }
        TxIo::InPlace(buf) => {
            let saved = &mut sample::as_samples_mut::<T>(tmp)[..len];
            saved.copy_from_slice(&buf[..len]);
            sub.call(
                TxIo::OutOfPlace {
                    out: &mut buf[len2..len2 + len],
                    input: saved,
                },
                1,
            );
            buf
        }
    };

    for i in 0..len2 {
        out[i] = -out[len - i - 1];
        out[2 * len - i - 1] = out[len + i];
    }
}

#[cfg(test)]
#[path = "mdct_tests.rs"]
mod tests;

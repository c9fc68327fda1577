// src/codelets/dct.rs

//! DCT-II/III through a real DFT of the even/odd reordered input, with a
//! direct fallback for odd lengths. DCT-I and DST-I go through a real DFT
//! of the symmetric extension.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::common::{PRIO_BASE, PRIO_MIN, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::{
    CodeletDescriptor, CodeletType, Factor, InitArgs, InitFn, TxContext, TxFn, TxIo, init_subtx,
};
use crate::math;
use crate::sample::{self, TxComplex, TxSample, expi};

use super::ANY;

const EVEN_FACTORS: &[Factor] = &[Factor::Of(2), Factor::Any];

fn descriptor<T: TxSample>(
    name: &'static str,
    kind: TxKind,
    flags: TxFlags,
    init: InitFn<T>,
    function: TxFn<T>,
) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(kind),
        factors: ANY,
        nb_factors: 1,
        min_len: 2,
        max_len: None,
        flags: TxFlags::UNALIGNED | TxFlags::INPLACE | TxFlags::OUT_OF_PLACE | flags,
        cpu_flags: CpuFlags::ALL,
        prio: PRIO_BASE,
        init: Some(init),
        uninit: None,
        function,
    }
}

fn even_descriptor<T: TxSample>(
    name: &'static str,
    flags: TxFlags,
    function: TxFn<T>,
) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        factors: EVEN_FACTORS,
        nb_factors: 2,
        ..descriptor(name, TxKind::Dct, flags, dct_init::<T>, function)
    }
}

fn naive_descriptor<T: TxSample>(name: &'static str, flags: TxFlags) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        prio: PRIO_MIN,
        ..descriptor(name, TxKind::Dct, flags, dct_naive_init::<T>, dct_naive_tx::<T>)
    }
}

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    alloc::vec![
        even_descriptor("dctII", TxFlags::FORWARD_ONLY, dct2_tx::<T>),
        even_descriptor("dctIII", TxFlags::INVERSE_ONLY, dct3_tx::<T>),
        naive_descriptor("dctII_naive", TxFlags::FORWARD_ONLY),
        naive_descriptor("dctIII_naive", TxFlags::INVERSE_ONLY),
        descriptor("dctI", TxKind::DctI, TxFlags::NONE, dct1_init::<T>, dct1_tx::<T>),
        descriptor("dstI", TxKind::DstI, TxFlags::NONE, dct1_init::<T>, dct1_tx::<T>),
    ]
}

/// Builds the length `len` real DFT and the quarter-wave rotations
/// `exp(-+ i * pi * k / (2 * len))` for `k <= len / 2`.
///
/// Scratch layout: `len / 2 + 1` spectrum bins, then `len` reordered samples.
fn dct_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let (len, inverse) = (ctx.len, ctx.inverse);
    let len2 = len / 2;

    let mut flags = args.flags;
    flags.remove(
        TxFlags::INPLACE
            | TxFlags::OUT_OF_PLACE
            | TxFlags::REAL_TO_REAL
            | TxFlags::REAL_TO_IMAGINARY,
    );
    // c2r sums the mirrored bins, so the inverse runs it at half scale.
    let scale = if inverse {
        Some(T::scale_from_f64(0.5 * args.scale_f64().unwrap_or(1.0)))
    } else {
        args.scale
    };
    let rdft = ctx.ty.with_kind(TxKind::Rdft);
    init_subtx(ctx, args.registry, rdft, flags, None, len, inverse, scale)?;

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut table = try_alloc::<T::Complex>(len2 + 1)?;
    for (k, w) in table.iter_mut().enumerate() {
        *w = expi::<T>(sign * PI * k as f64 / (2 * len) as f64);
    }
    ctx.exp = table;
    ctx.tmp = try_alloc(len + 1)?;
    Ok(())
}

/// Even samples ascending, then odd samples descending.
fn fold_even_odd<T: TxSample>(line: &mut [T], src: &[T]) {
    let len = src.len();
    for (n, pair) in src.chunks_exact(2).enumerate() {
        line[n] = pair[0];
        line[len - 1 - n] = pair[1];
    }
}

fn unfold_even_odd<T: TxSample>(out: &mut [T], line: &[T]) {
    let len = line.len();
    for (n, pair) in out.chunks_exact_mut(2).enumerate() {
        pair[0] = line[n];
        pair[1] = line[len - 1 - n];
    }
}

fn dct2_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let TxContext { sub, exp, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let (spectrum, rest) = tmp.split_at_mut(len2 + 1);
    let line = &mut sample::as_samples_mut::<T>(rest)[..len];

    let out = match io {
        TxIo::InPlace(buf) => {
            fold_even_odd::<T>(line, &buf[..len]);
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            fold_even_odd::<T>(line, &input[..len]);
            out
        }
    };
    sub.call(
        TxIo::OutOfPlace {
            out: sample::as_samples_mut::<T>(spectrum),
            input: line,
        },
        1,
    );

    out[0] = spectrum[0].re();
    for k in 1..=len2 {
        let z = spectrum[k] * exp[k];
        out[k] = z.re();
        if k < len2 {
            out[len - k] = -z.im();
        }
    }
}

/// Bin `k` of the reordered sequence is `(X[k] - i X[len - k]) * exp(i pi k / (2 len))`.
fn pack_spectrum<T: TxSample>(spectrum: &mut [T::Complex], src: &[T], exp: &[T::Complex]) {
    let len = src.len();
    for (k, (bin, &w)) in spectrum.iter_mut().zip(exp.iter()).enumerate() {
        let mirror = if k == 0 { T::default() } else { -src[len - k] };
        *bin = T::Complex::new(src[k], mirror) * w;
    }
}

fn dct3_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let TxContext { sub, exp, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let (spectrum, rest) = tmp.split_at_mut(len2 + 1);
    let line = &mut sample::as_samples_mut::<T>(rest)[..len];

    let out = match io {
        TxIo::InPlace(buf) => {
            pack_spectrum::<T>(spectrum, &buf[..len], exp);
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            pack_spectrum::<T>(spectrum, &input[..len], exp);
            out
        }
    };
    sub.call(
        TxIo::OutOfPlace {
            out: &mut *line,
            input: sample::as_samples::<T>(spectrum),
        },
        1,
    );
    unfold_even_odd::<T>(&mut out[..len], line);
}

/// Cosine table over a full period, `cos(pi * j / (2 * len))` for `j < 4 * len`.
fn dct_naive_init<T: TxSample>(
    ctx: &mut TxContext<T>,
    _args: &InitArgs<'_, T>,
) -> Result<(), TxError> {
    let len = ctx.len;
    let mut table = try_alloc::<T::Complex>(2 * len)?;
    for (j, c) in sample::as_samples_mut::<T>(&mut table).iter_mut().enumerate() {
        *c = T::from_f64(math::cos(PI * j as f64 / (2 * len) as f64));
    }
    ctx.exp = table;
    ctx.tmp = try_alloc(len.div_ceil(2))?;
    Ok(())
}

fn dct_naive_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let inverse = ctx.inverse;
    let scale = ctx.scale_f64().unwrap_or(1.0);
    let TxContext { exp, tmp, .. } = ctx;
    let cos = sample::as_samples::<T>(exp);
    let src = &mut sample::as_samples_mut::<T>(tmp)[..len];

    let out = match io {
        TxIo::InPlace(buf) => {
            src.copy_from_slice(&buf[..len]);
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            src.copy_from_slice(&input[..len]);
            out
        }
    };

    let period = 4 * len;
    for (k, o) in out[..len].iter_mut().enumerate() {
        let acc = if inverse {
            let mut acc = src[0].scaled(0.5);
            for (j, &x) in src.iter().enumerate().skip(1) {
                acc = acc + x * cos[((2 * k + 1) * j) % period];
            }
            acc
        } else {
            let mut acc = T::default();
            for (n, &x) in src.iter().enumerate() {
                acc = acc + x * cos[((2 * n + 1) * k) % period];
            }
            acc
        };
        *o = if scale != 1.0 { acc.scaled(scale) } else { acc };
    }
}

#[inline]
fn extension_len(kind: TxKind, len: usize) -> usize {
    if kind == TxKind::DstI {
        2 * (len + 1)
    } else {
        2 * (len - 1)
    }
}

/// Both directions run the same computation; the transforms are their own
/// inverse up to scale.
fn dct1_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let kind = ctx.ty.kind();
    let ext = extension_len(kind, ctx.len);
    let rdft = ctx.ty.with_kind(TxKind::Rdft);

    let mut flags = args.flags;
    flags.remove(
        TxFlags::INPLACE
            | TxFlags::OUT_OF_PLACE
            | TxFlags::REAL_TO_REAL
            | TxFlags::REAL_TO_IMAGINARY,
    );
    flags.insert(if kind == TxKind::DstI {
        TxFlags::REAL_TO_IMAGINARY
    } else {
        TxFlags::REAL_TO_REAL
    });
    init_subtx(ctx, args.registry, rdft, flags, None, ext, false, args.scale)?;
    ctx.tmp = try_alloc(ext / 2)?;
    Ok(())
}

fn extend<T: TxSample>(ext: &mut [T], src: &[T], odd: bool) {
    let n = src.len();
    let total = ext.len();
    if odd {
        ext[0] = T::default();
        for (i, &x) in src.iter().enumerate() {
            ext[i + 1] = -x;
            ext[total - i - 1] = x;
        }
        ext[n + 1] = T::default();
    } else {
        ext[..n].copy_from_slice(src);
        for i in 1..n - 1 {
            ext[total - i] = src[i];
        }
    }
}

fn dct1_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let odd = ctx.ty.kind() == TxKind::DstI;
    let TxContext { sub, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let ext = sample::as_samples_mut::<T>(tmp);

    let out = match io {
        TxIo::InPlace(buf) => {
            extend::<T>(ext, &buf[..len], odd);
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            extend::<T>(ext, &input[..len], odd);
            out
        }
    };
    sub.call(
        TxIo::OutOfPlace {
            out: &mut out[..len],
            input: ext,
        },
        1,
    );
}

#[cfg(test)]
#[path = "dct_tests.rs"]
mod tests;

// src/codelets/rdft.rs

//! Real-input DFTs: half-length complex FFT with a twiddle pass, and a direct fallback.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::common::{PRIO_BASE, PRIO_MIN, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::{
    CodeletDescriptor, CodeletType, Factor, InitArgs, InitFn, TxContext, TxFn, TxIo, init_subtx,
};
use crate::math;
use crate::sample::{self, TxComplex, TxSample, expi, mul_real};

const FAST_FACTORS: &[Factor] = &[Factor::Of(4), Factor::Any];
const NAIVE_FACTORS: &[Factor] = &[Factor::Of(2), Factor::Any];

fn descriptor<T: TxSample>(
    name: &'static str,
    fast: bool,
    flags: TxFlags,
    function: TxFn<T>,
) -> CodeletDescriptor<T> {
    let base = TxFlags::UNALIGNED | TxFlags::INPLACE | TxFlags::OUT_OF_PLACE;
    let init: InitFn<T> = if fast {
        rdft_init::<T>
    } else {
        rdft_naive_init::<T>
    };
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(TxKind::Rdft),
        factors: if fast { FAST_FACTORS } else { NAIVE_FACTORS },
        nb_factors: 2,
        min_len: if fast { 4 } else { 2 },
        max_len: None,
        flags: base | flags,
        cpu_flags: CpuFlags::ALL,
        prio: if fast { PRIO_BASE } else { PRIO_MIN },
        init: Some(init),
        uninit: None,
        function,
    }
}

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    let fwd = TxFlags::FORWARD_ONLY;
    alloc::vec![
        descriptor("rdft_r2c", true, fwd, rdft_fwd_tx::<T>),
        descriptor("rdft_c2r", true, TxFlags::INVERSE_ONLY, rdft_inv_tx::<T>),
        descriptor("rdft_r2r", true, fwd | TxFlags::REAL_TO_REAL, rdft_fwd_tx::<T>),
        descriptor("rdft_r2i", true, fwd | TxFlags::REAL_TO_IMAGINARY, rdft_fwd_tx::<T>),
        descriptor("rdft_naive", false, TxFlags::NONE, rdft_naive_tx::<T>),
        descriptor("rdft_naive_r2r", false, fwd | TxFlags::REAL_TO_REAL, rdft_naive_tx::<T>),
        descriptor("rdft_naive_r2i", false, fwd | TxFlags::REAL_TO_IMAGINARY, rdft_naive_tx::<T>),
    ]
}

/// Table layout in samples: eight butterfly factors, then `len / 4` cosines,
/// then `len / 4` sines.
fn rdft_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let (len, inverse) = (ctx.len, ctx.inverse);
    let len4 = len / 4;
    let scale = args.scale_f64().unwrap_or(1.0);

    let mut flags = args.flags;
    flags.remove(
        TxFlags::REAL_TO_REAL
            | TxFlags::REAL_TO_IMAGINARY
            | TxFlags::INPLACE
            | TxFlags::OUT_OF_PLACE,
    );
    let fft = ctx.ty.with_kind(TxKind::Fft);
    init_subtx(ctx, args.registry, fft, flags, None, len / 2, inverse, None)?;

    let mut tables = try_alloc::<T::Complex>(4 + len4)?;
    {
        let t = sample::as_samples_mut::<T>(&mut tables);
        let m = if inverse { 2.0 * scale } else { scale };
        let dc = if inverse { 0.5 * m } else { m };
        let mix = if inverse { -0.5 } else { 0.5 };
        let fact = [dc, dc, m, -m, 0.5 * m, -0.5 * m, mix * m, -mix * m];
        for (slot, f) in t[..8].iter_mut().zip(fact) {
            *slot = T::from_f64(f);
        }
        let sign = if inverse { 1.0 } else { -1.0 };
        for i in 0..len4 {
            let (sin, cos) = math::sin_cos(2.0 * PI * i as f64 / len as f64);
            t[8 + i] = T::from_f64(cos);
            t[8 + len4 + i] = T::from_f64(sin * sign);
        }
    }
    ctx.exp = tables;
    ctx.tmp = try_alloc(len / 2 + 1)?;
    Ok(())
}

/// Splits the half-length FFT of the even/odd samples into the spectrum of
/// the real signal, or the reverse.
fn twist<T: TxSample>(data: &mut [T::Complex], tables: &[T::Complex], len: usize) {
    let (len2, len4) = (len / 2, len / 4);
    let t = sample::as_samples::<T>(tables);
    let (fact, rest) = t.split_at(8);
    let (tcos, tsin) = rest.split_at(len4);

    let t0 = data[0].re();
    let (sum, diff) = (t0 + data[0].im(), t0 - data[0].im());
    data[0] = T::Complex::new(fact[0] * sum, fact[1] * diff);
    data[len4] = T::Complex::new(fact[2] * data[len4].re(), fact[3] * data[len4].im());

    for i in 1..len4 {
        let a = data[i];
        let b = data[len2 - i];
        let t0 = T::Complex::new(fact[4] * (a.re() + b.re()), fact[5] * (a.im() - b.im()));
        let t1 = T::Complex::new(fact[6] * (a.im() + b.im()), fact[7] * (a.re() - b.re()));
        let t2 = t1 * T::Complex::new(tcos[i], tsin[i]);
        data[i] = T::Complex::new(t0.re() + t2.re(), t2.im() - t0.im());
        data[len2 - i] = T::Complex::new(t0.re() - t2.re(), t2.im() + t0.im());
    }
}

/// Writes the `len / 2 + 1` bins in the layout the node was built for.
fn emit<T: TxSample>(out: &mut [T], spectrum: &[T::Complex], flags: TxFlags) {
    let len2 = spectrum.len() - 1;
    if flags.contains(TxFlags::REAL_TO_REAL) {
        for (o, c) in out.iter_mut().zip(spectrum.iter()) {
            *o = c.re();
        }
    } else if flags.contains(TxFlags::REAL_TO_IMAGINARY) {
        for (o, c) in out.iter_mut().zip(spectrum[1..len2].iter()) {
            *o = c.im();
        }
    } else {
        let samples = sample::as_samples::<T>(spectrum);
        out[..samples.len()].copy_from_slice(samples);
    }
}

fn rdft_fwd_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let flags = ctx.flags;
    let TxContext { sub, exp, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let data = &mut tmp[..len2 + 1];

    let out = match io {
        TxIo::InPlace(buf) => {
            sub.call_complex(&mut data[..len2], sample::as_complex::<T>(&buf[..len]));
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            sub.call_complex(&mut data[..len2], sample::as_complex::<T>(&input[..len]));
            out
        }
    };

    data[len2] = T::Complex::default();
    twist::<T>(data, exp, len);
    let dc = data[0];
    data[len2] = T::Complex::new(dc.im(), T::default());
    data[0] = T::Complex::new(dc.re(), T::default());
    emit::<T>(out, data, flags);
}

fn rdft_inv_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let TxContext { sub, exp, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let data = &mut tmp[..len2 + 1];

    let out = match io {
        TxIo::InPlace(buf) => {
            data.copy_from_slice(sample::as_complex::<T>(&buf[..len + 2]));
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            data.copy_from_slice(sample::as_complex::<T>(&input[..len + 2]));
            out
        }
    };

    // Nyquist rides in the imaginary part of DC.
    data[0] = T::Complex::new(data[0].re(), data[len2].re());
    twist::<T>(data, exp, len);
    sub.call_complex(sample::as_complex_mut::<T>(&mut out[..len]), &data[..len2]);
}

fn rdft_naive_init<T: TxSample>(
    ctx: &mut TxContext<T>,
    _args: &InitArgs<'_, T>,
) -> Result<(), TxError> {
    let len = ctx.len;
    let mut roots = try_alloc::<T::Complex>(len)?;
    for (j, w) in roots.iter_mut().enumerate() {
        *w = expi::<T>(-2.0 * PI * j as f64 / len as f64);
    }
    ctx.exp = roots;
    ctx.tmp = try_alloc(len / 2 + 1)?;
    Ok(())
}

fn rdft_naive_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let len2 = len / 2;
    let scale = ctx.scale_f64().unwrap_or(1.0);
    let (inverse, flags) = (ctx.inverse, ctx.flags);
    let TxContext { exp: roots, tmp, .. } = ctx;
    let data = &mut tmp[..len2 + 1];

    if !inverse {
        let out = match io {
            TxIo::InPlace(buf) => {
                naive_r2c::<T>(data, &buf[..len], roots);
                buf
            }
            TxIo::OutOfPlace { out, input } => {
                naive_r2c::<T>(data, &input[..len], roots);
                out
            }
        };
        if scale != 1.0 {
            sample::scale_in_place::<T>(data, Some(scale));
        }
        emit::<T>(out, data, flags);
        return;
    }

    let out = match io {
        TxIo::InPlace(buf) => {
            data.copy_from_slice(sample::as_complex::<T>(&buf[..len + 2]));
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            data.copy_from_slice(sample::as_complex::<T>(&input[..len + 2]));
            out
        }
    };
    for (n, o) in out[..len].iter_mut().enumerate() {
        let mut acc = data[0].re();
        acc = if n % 2 == 1 {
            acc - data[len2].re()
        } else {
            acc + data[len2].re()
        };
        for (k, x) in data.iter().enumerate().take(len2).skip(1) {
            let w = roots[(n * k) % len];
            let term = x.re() * w.re() + x.im() * w.im();
            acc = acc + term + term;
        }
        *o = if scale != 1.0 { acc.scaled(scale) } else { acc };
    }
}

fn naive_r2c<T: TxSample>(data: &mut [T::Complex], input: &[T], roots: &[T::Complex]) {
    let len = input.len();
    for (k, bin) in data.iter_mut().enumerate() {
        let mut acc = T::Complex::default();
        for (n, &x) in input.iter().enumerate() {
            acc = acc + mul_real::<T>(roots[(n * k) % len], x);
        }
        *bin = acc;
    }
}

#[cfg(test)]
#[path = "rdft_tests.rs"]
mod tests;

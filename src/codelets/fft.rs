// src/codelets/fft.rs

//! Generic FFT wrappers around a preshuffled core, plus naive fallbacks.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::common::{PRIO_BASE, PRIO_MIN, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::maps::gen_inplace_map;
use crate::engine::{
    CodeletDescriptor, CodeletOptions, CodeletType, InitArgs, InitFn, MapDirection, TxContext, TxFn,
    TxIo, init_subtx,
};
use crate::sample::{self, TxSample, cplx_scaled, expi};

use super::ANY;

fn descriptor<T: TxSample>(
    name: &'static str,
    flags: TxFlags,
    min_len: usize,
    max_len: Option<usize>,
    prio: i32,
    init: Option<InitFn<T>>,
    function: TxFn<T>,
) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(TxKind::Fft),
        factors: ANY,
        nb_factors: 1,
        min_len,
        max_len,
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
        descriptor("fft", oop, 2, None, PRIO_BASE, Some(fft_init::<T>), fft_tx::<T>),
        descriptor(
            "fft_inplace_small",
            oop | TxFlags::INPLACE,
            2,
            Some(65536),
            PRIO_BASE - 256,
            Some(fft_inplace_small_init::<T>),
            fft_inplace_small_tx::<T>,
        ),
        descriptor(
            "fft_inplace",
            TxFlags::UNALIGNED | TxFlags::INPLACE,
            2,
            None,
            PRIO_BASE - 512,
            Some(fft_init::<T>),
            fft_inplace_tx::<T>,
        ),
        descriptor(
            "fft_naive_small",
            oop,
            2,
            Some(1024),
            PRIO_MIN / 2,
            Some(fft_naive_small_init::<T>),
            fft_naive_small_tx::<T>,
        ),
        descriptor("fft_naive", oop, 2, None, PRIO_MIN, None, fft_naive_tx::<T>),
    ]
}

/// Requests a preshuffled core of the same length. In-place callers get a
/// scatter map walked by cycles, the rest gather while copying.
fn fft_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let (ty, len, inverse) = (ctx.ty, ctx.len, ctx.inverse);
    let inplace = args.flags.contains(TxFlags::INPLACE);
    let opts = CodeletOptions::new(if inplace {
        MapDirection::Scatter
    } else {
        MapDirection::Gather
    });

    let mut flags = args.flags;
    flags.remove(TxFlags::OUT_OF_PLACE);
    flags.insert(TxFlags::INPLACE | TxFlags::PRESHUFFLE);
    init_subtx(ctx, args.registry, ty, flags, Some(&opts), len, inverse, None)?;

    if inplace {
        gen_inplace_map(ctx, len)?;
    }
    Ok(())
}

fn fft_inplace_small_init<T: TxSample>(
    ctx: &mut TxContext<T>,
    args: &InitArgs<'_, T>,
) -> Result<(), TxError> {
    ctx.tmp = try_alloc(ctx.len)?;
    let mut flags = args.flags;
    flags.remove(TxFlags::INPLACE);
    fft_init(ctx, &InitArgs { flags, ..*args })
}

fn fft_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let scale = ctx.scale_f64();
    let len = ctx.len;
    let Some(sub) = ctx.sub.first_mut() else { return };
    // Only ever selected for out-of-place requests.
    let TxIo::OutOfPlace { out, input } = io else { return };

    let out = &mut sample::as_complex_mut::<T>(out)[..len];
    let input = sample::as_complex::<T>(input);
    for (o, &src) in out.iter_mut().zip(sub.map.iter()) {
        *o = input[src];
    }
    sub.call_complex_in_place(out);
    sample::scale_in_place::<T>(out, scale);
}

fn fft_inplace_small_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let scale = ctx.scale_f64();
    let len = ctx.len;
    let TxContext { sub, tmp, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };
    let tmp = &mut tmp[..len];

    let out = match io {
        TxIo::InPlace(buf) => {
            let buf = sample::as_complex_mut::<T>(buf);
            for (t, &src) in tmp.iter_mut().zip(sub.map.iter()) {
                *t = buf[src];
            }
            buf
        }
        TxIo::OutOfPlace { out, input } => {
            let input = sample::as_complex::<T>(input);
            for (t, &src) in tmp.iter_mut().zip(sub.map.iter()) {
                *t = input[src];
            }
            sample::as_complex_mut::<T>(out)
        }
    };
    let out = &mut out[..len];
    sub.call_complex(out, tmp);
    sample::scale_in_place::<T>(out, scale);
}

fn fft_inplace_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let scale = ctx.scale_f64();
    let len = ctx.len;
    let TxContext { sub, map, .. } = ctx;
    let Some(sub) = sub.first_mut() else { return };

    let buf = match io {
        TxIo::InPlace(buf) => sample::as_complex_mut::<T>(buf),
        TxIo::OutOfPlace { out, input } => {
            out[..2 * len].copy_from_slice(&input[..2 * len]);
            sample::as_complex_mut::<T>(out)
        }
    };
    let buf = &mut buf[..len];

    let scatter = &sub.map;
    for &start in map.iter().take_while(|&&i| i != 0) {
        let mut held = buf[start];
        let mut dst = scatter[start];
        loop {
            core::mem::swap(&mut held, &mut buf[dst]);
            dst = scatter[dst];
            if dst == start {
                break;
            }
        }
        buf[start] = held;
    }

    sub.call_complex_in_place(buf);
    sample::scale_in_place::<T>(buf, scale);
}

#[inline]
fn phase(len: usize, inverse: bool) -> f64 {
    if inverse {
        2.0 * PI / len as f64
    } else {
        -2.0 * PI / len as f64
    }
}

fn fft_naive_small_init<T: TxSample>(
    ctx: &mut TxContext<T>,
    _args: &InitArgs<'_, T>,
) -> Result<(), TxError> {
    let len = ctx.len;
    let step = phase(len, ctx.inverse);
    let mut roots = try_alloc::<T::Complex>(len)?;
    for (j, w) in roots.iter_mut().enumerate() {
        *w = expi::<T>(step * j as f64);
    }
    ctx.exp = roots;
    Ok(())
}

fn fft_naive_small_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input } = io else { return };
    let len = ctx.len;
    let scale = ctx.scale_f64();
    let out = sample::as_complex_mut::<T>(out);
    let input = &sample::as_complex::<T>(input)[..len];

    for i in 0..len {
        let mut acc = T::Complex::default();
        for (j, &x) in input.iter().enumerate() {
            acc = acc + x * ctx.exp[(i * j) % len];
        }
        out[i * stride] = scale.map_or(acc, |s| cplx_scaled::<T>(acc, s));
    }
}

fn fft_naive_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, stride: usize) {
    let TxIo::OutOfPlace { out, input } = io else { return };
    let len = ctx.len;
    let scale = ctx.scale_f64();
    let step = phase(len, ctx.inverse);
    let out = sample::as_complex_mut::<T>(out);
    let input = &sample::as_complex::<T>(input)[..len];

    for i in 0..len {
        let mut acc = T::Complex::default();
        for (j, &x) in input.iter().enumerate() {
            acc = acc + x * expi::<T>(step * ((i * j) % len) as f64);
        }
        out[i * stride] = scale.map_or(acc, |s| cplx_scaled::<T>(acc, s));
    }
}

#[cfg(test)]
#[path = "fft_tests.rs"]
mod tests;

// src/codelets/factor.rs

//! Small odd-length FFTs: 3, 5, 7, 9 and 15 points.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::common::{PRIO_BASE, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::maps::{gen_default_map, gen_pfa_input_map};
use crate::engine::{CodeletDescriptor, CodeletType, Factor, InitArgs, TxContext, TxIo};
use crate::sample::{self, TxComplex, TxSample, expi, mul_real};

const SIZES: [(usize, &str, &str); 4] = [
    (3, "fft3_ns", "fft3_fwd"),
    (5, "fft5_ns", "fft5_fwd"),
    (7, "fft7_ns", "fft7_fwd"),
    (9, "fft9_ns", "fft9_fwd"),
];

const F3: &[Factor] = &[Factor::Of(3)];
const F5: &[Factor] = &[Factor::Of(5)];
const F7: &[Factor] = &[Factor::Of(7)];
const F9: &[Factor] = &[Factor::Of(9)];
const F15: &[Factor] = &[Factor::Of(15)];

fn factors_of(n: usize) -> &'static [Factor] {
    match n {
        3 => F3,
        5 => F5,
        7 => F7,
        9 => F9,
        _ => F15,
    }
}

fn descriptor<T: TxSample>(name: &'static str, len: usize, flags: TxFlags) -> CodeletDescriptor<T> {
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(TxKind::Fft),
        factors: factors_of(len),
        nb_factors: 1,
        min_len: len,
        max_len: Some(len),
        flags,
        cpu_flags: CpuFlags::ALL,
        prio: PRIO_BASE,
        init: Some(factor_init::<T>),
        uninit: None,
        function: factor_tx::<T>,
    }
}

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    let shuffled =
        TxFlags::INPLACE | TxFlags::OUT_OF_PLACE | TxFlags::UNALIGNED | TxFlags::PRESHUFFLE;
    let natural = TxFlags::INPLACE
        | TxFlags::OUT_OF_PLACE
        | TxFlags::UNALIGNED
        | TxFlags::FORWARD_ONLY;

    let mut list = Vec::new();
    for (len, ns, _) in SIZES {
        list.push(descriptor::<T>(ns, len, shuffled));
    }
    list.push(descriptor::<T>("fft15_ns", 15, shuffled));
    for (len, _, fwd) in SIZES {
        list.push(descriptor::<T>(fwd, len, natural));
    }
    list
}

fn factor_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    let len = ctx.len;
    // 15 runs as 3x5, only the 5-point roots are needed.
    let n = if len == 15 { 5 } else { len };
    let mut roots = try_alloc::<T::Complex>(n)?;
    for (j, w) in roots.iter_mut().enumerate() {
        *w = expi::<T>(-2.0 * PI * j as f64 / n as f64);
    }
    ctx.exp = roots;

    if len == 15 {
        gen_pfa_input_map(ctx, args.opts.as_ref(), 3, 5)
    } else if args.flags.contains(TxFlags::PRESHUFFLE) {
        gen_default_map(ctx, args.opts.as_ref())
    } else {
        Ok(())
    }
}

fn factor_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let mut input = [T::Complex::default(); 15];
    let out = match io {
        TxIo::InPlace(buf) => {
            let buf = sample::as_complex_mut::<T>(buf);
            input[..len].copy_from_slice(&buf[..len]);
            buf
        }
        TxIo::OutOfPlace { out, input: src } => {
            input[..len].copy_from_slice(&sample::as_complex::<T>(src)[..len]);
            sample::as_complex_mut::<T>(out)
        }
    };
    let out = &mut out[..len];

    match len {
        3 => out.copy_from_slice(&dft3::<T>(input[0], input[1], input[2])),
        15 => fft15::<T>(out, &input[..15], &ctx.exp),
        _ => dft::<T>(out, &input[..len], &ctx.exp),
    }
    sample::scale_in_place::<T>(out, ctx.scale_f64());
}

fn dft3<T: TxSample>(
    x0: T::Complex,
    x1: T::Complex,
    x2: T::Complex,
) -> [T::Complex; 3] {
    let sum = x1 + x2;
    let mid = x0 - mul_real::<T>(sum, T::from_f64(0.5));
    let rot = mul_real::<T>((x1 - x2).mul_neg_i(), T::from_f64(0.866_025_403_784_438_6));
    [x0 + sum, mid + rot, mid - rot]
}

/// Direct DFT against a root table of the same length.
fn dft<T: TxSample>(out: &mut [T::Complex], input: &[T::Complex], roots: &[T::Complex]) {
    let n = input.len();
    for (k, o) in out.iter_mut().enumerate() {
        let mut acc = input[0];
        for (j, &x) in input.iter().enumerate().skip(1) {
            acc = acc + x * roots[(j * k) % n];
        }
        *o = acc;
    }
}

/// Good-Thomas 3x5 on input already in PFA order.
fn fft15<T: TxSample>(out: &mut [T::Complex], input: &[T::Complex], roots5: &[T::Complex]) {
    let mut tmp = [T::Complex::default(); 15];
    for m in 0..5 {
        let col = dft3::<T>(input[3 * m], input[3 * m + 1], input[3 * m + 2]);
        for (k1, v) in col.into_iter().enumerate() {
            tmp[m + 5 * k1] = v;
        }
    }
    let mut row = [T::Complex::default(); 5];
    for k1 in 0..3 {
        dft::<T>(&mut row, &tmp[5 * k1..5 * k1 + 5], roots5);
        for (k2, &v) in row.iter().enumerate() {
            out[(10 * k1 + 6 * k2) % 15] = v;
        }
    }
}

// src/codelets/split_radix.rs

//! Power-of-two split-radix FFTs on preshuffled input.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::common::{PRIO_BASE, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::context::try_alloc;
use crate::engine::maps::gen_ptwo_revtab;
use crate::engine::{CodeletDescriptor, CodeletType, Factor, InitArgs, TxContext, TxIo};
use crate::sample::{self, TxComplex, TxSample, expi};

const NAMES: [&str; 21] = [
    "fft2_ns",
    "fft4_ns",
    "fft8_ns",
    "fft16_ns",
    "fft32_ns",
    "fft64_ns",
    "fft128_ns",
    "fft256_ns",
    "fft512_ns",
    "fft1024_ns",
    "fft2048_ns",
    "fft4096_ns",
    "fft8192_ns",
    "fft16384_ns",
    "fft32768_ns",
    "fft65536_ns",
    "fft131072_ns",
    "fft262144_ns",
    "fft524288_ns",
    "fft1048576_ns",
    "fft2097152_ns",
];

const FACTORS: &[Factor] = &[Factor::Of(2)];

pub(super) fn codelets<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            let len = 2usize << i;
            CodeletDescriptor {
                name,
                ty: CodeletType::Kind(TxKind::Fft),
                factors: FACTORS,
                nb_factors: 1,
                min_len: len,
                max_len: Some(len),
                flags: TxFlags::OUT_OF_PLACE
                    | TxFlags::INPLACE
                    | TxFlags::UNALIGNED
                    | TxFlags::PRESHUFFLE,
                cpu_flags: CpuFlags::ALL,
                prio: PRIO_BASE,
                init: Some(sr_init::<T>),
                uninit: None,
                function: sr_tx::<T>,
            }
        })
        .collect()
}

fn sr_init<T: TxSample>(ctx: &mut TxContext<T>, args: &InitArgs<'_, T>) -> Result<(), TxError> {
    gen_ptwo_revtab(ctx, args.opts.as_ref())?;

    // Quarter-wave table, deeper levels read it with a stride.
    let len = ctx.len;
    let mut tw = try_alloc::<T::Complex>(len / 4)?;
    for (j, w) in tw.iter_mut().enumerate() {
        *w = expi::<T>(-2.0 * PI * j as f64 / len as f64);
    }
    ctx.exp = tw;
    Ok(())
}

fn sr_tx<T: TxSample>(ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    let len = ctx.len;
    let buf = match io {
        TxIo::InPlace(buf) => sample::as_complex_mut::<T>(buf),
        TxIo::OutOfPlace { out, input } => {
            out[..2 * len].copy_from_slice(&input[..2 * len]);
            sample::as_complex_mut::<T>(out)
        }
    };
    let buf = &mut buf[..len];
    split_radix::<T>(buf, &ctx.exp, 1);
    sample::scale_in_place::<T>(buf, ctx.scale_f64());
}

/// Forward transform of `z`, laid out as `[even | 4k+1 | 4k-1]` at every level.
fn split_radix<T: TxSample>(z: &mut [T::Complex], tw: &[T::Complex], stride: usize) {
    let n = z.len();
    if n < 2 {
        return;
    }
    if n == 2 {
        let (a, b) = (z[0], z[1]);
        z[0] = a + b;
        z[1] = a - b;
        return;
    }

    let (n2, n4) = (n / 2, n / 4);
    {
        let (even, odd) = z.split_at_mut(n2);
        let (odd1, odd3) = odd.split_at_mut(n4);
        split_radix::<T>(even, tw, stride * 2);
        split_radix::<T>(odd1, tw, stride * 4);
        split_radix::<T>(odd3, tw, stride * 4);
    }

    for k in 0..n4 {
        let w = tw[k * stride];
        let a = w * z[n2 + k];
        let b = w.conj() * z[n2 + n4 + k];
        let sum = a + b;
        let diff = (a - b).mul_neg_i();

        let (e0, e1) = (z[k], z[k + n4]);
        z[k] = e0 + sum;
        z[k + n2] = e0 - sum;
        z[k + n4] = e1 + diff;
        z[k + n2 + n4] = e1 - diff;
    }
}

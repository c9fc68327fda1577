//! Built-in codelets, generic over the sample domain.

use alloc::vec;
use alloc::vec::Vec;

use crate::common::{PRIO_MAX, TxError, TxFlags, TxKind};
use crate::cpu::CpuFlags;
use crate::engine::{CodeletDescriptor, CodeletType, Factor, InitArgs, TxContext, TxIo};
use crate::sample::TxSample;

mod dct;
mod factor;
mod fft;
mod mdct;
mod pfa;
mod rdft;
mod split_radix;

const ANY: &[Factor] = &[Factor::Any];

fn null_init<T: TxSample>(ctx: &mut TxContext<T>, _args: &InitArgs<'_, T>) -> Result<(), TxError> {
    // One sample in, one sample out only.
    match ctx.ty.kind() {
        TxKind::Mdct | TxKind::Rdft => Err(TxError::InvalidArgument),
        _ => Ok(()),
    }
}

fn null_tx<T: TxSample>(_ctx: &mut TxContext<T>, io: TxIo<'_, T>, _stride: usize) {
    if let TxIo::OutOfPlace { out, input } = io {
        let n = out.len().min(input.len());
        out[..n].copy_from_slice(&input[..n]);
    }
}

/// Length-1 passthrough for every type.
pub(crate) fn null_list<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    vec![CodeletDescriptor {
        name: "null",
        ty: CodeletType::Any,
        factors: ANY,
        nb_factors: 1,
        min_len: 1,
        max_len: Some(1),
        flags: TxFlags::UNALIGNED
            | TxFlags::ALIGNED
            | TxFlags::OUT_OF_PLACE
            | TxFlags::INPLACE,
        cpu_flags: CpuFlags::ALL,
        prio: PRIO_MAX,
        init: Some(null_init::<T>),
        uninit: None,
        function: null_tx::<T>,
    }]
}

/// Portable codelets in scan order.
pub(crate) fn c_list<T: TxSample>() -> Vec<CodeletDescriptor<T>> {
    let mut list = Vec::new();
    list.extend(split_radix::codelets::<T>());
    list.extend(factor::codelets::<T>());
    list.extend(fft::codelets::<T>());
    list.extend(pfa::codelets::<T>());
    list.extend(mdct::codelets::<T>());
    list.extend(rdft::codelets::<T>());
    list.extend(dct::codelets::<T>());
    list
}

// src/engine/context.rs

use alloc::vec::Vec;

use super::codelet::{CodeletDescriptor, MapDirection, TxFn, TxIo};
use crate::common::{TxError, TxFlags, TxType};
use crate::sample::{self, TxSample};

/// One node of a transform tree. A node exclusively owns its subtransforms.
pub struct TxContext<T: TxSample> {
    pub(crate) ty: TxType,
    pub(crate) inverse: bool,
    pub(crate) len: usize,
    pub(crate) flags: TxFlags,
    pub(crate) scale: Option<T::Scale>,

    pub(crate) map: Vec<usize>,
    pub(crate) map_dir: MapDirection,

    pub(crate) sub: Vec<TxContext<T>>,
    pub(crate) cd_self: Option<CodeletDescriptor<T>>,
    pub(crate) func: Option<TxFn<T>>,

    pub(crate) tmp: Vec<T::Complex>,
    pub(crate) exp: Vec<T::Complex>,
}

impl<T: TxSample> TxContext<T> {
    pub(crate) fn new(
        ty: TxType,
        inverse: bool,
        len: usize,
        flags: TxFlags,
        scale: Option<T::Scale>,
    ) -> Self {
        Self {
            ty,
            inverse,
            len,
            flags,
            scale,
            map: Vec::new(),
            map_dir: MapDirection::None,
            sub: Vec::new(),
            cd_self: None,
            func: None,
            tmp: Vec::new(),
            exp: Vec::new(),
        }
    }

    /// An empty node used as the parent of a top-level request.
    pub(crate) fn root(ty: TxType) -> Self {
        Self::new(ty, false, 0, TxFlags::NONE, None)
    }

    #[inline]
    pub fn tx_type(&self) -> TxType {
        self.ty
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn inverse(&self) -> bool {
        self.inverse
    }

    #[inline]
    pub fn flags(&self) -> TxFlags {
        self.flags
    }

    #[inline]
    pub fn scale(&self) -> Option<T::Scale> {
        self.scale
    }

    pub fn codelet_name(&self) -> Option<&'static str> {
        self.cd_self.as_ref().map(|cd| cd.name)
    }

    /// The permutation map, empty when the codelet built none.
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    pub fn map_direction(&self) -> MapDirection {
        self.map_dir
    }

    pub fn subs(&self) -> &[TxContext<T>] {
        &self.sub
    }

    #[inline]
    pub(crate) fn scale_f64(&self) -> Option<f64> {
        self.scale.map(T::scale_to_f64)
    }

    /// Frees maps and scratch tables, tears down every child and runs the
    /// codelet's uninit hook once. The child array itself is only released
    /// when `free_sub` is set.
    pub(crate) fn reset(&mut self, free_sub: bool) {
        for sub in self.sub.iter_mut() {
            sub.reset(true);
        }
        if let Some(cd) = self.cd_self.take() {
            if let Some(uninit) = cd.uninit {
                uninit(self);
            }
        }
        if free_sub {
            self.sub = Vec::new();
        } else {
            self.sub.clear();
        }
        self.map = Vec::new();
        self.map_dir = MapDirection::None;
        self.tmp = Vec::new();
        self.exp = Vec::new();
        self.func = None;
    }

    /// Tears down all children but keeps this node and its child array.
    pub(crate) fn clear_subs(&mut self) {
        for sub in self.sub.iter_mut() {
            sub.reset(true);
        }
        self.sub.clear();
    }

    /// Runs the node. An out-of-place call on an in-place-only node copies
    /// the input into `out` first.
    pub(crate) fn call(&mut self, io: TxIo<'_, T>, stride: usize) {
        let Some(func) = self.func else { return };
        match io {
            TxIo::OutOfPlace { out, input }
                if !self.flags.contains(TxFlags::OUT_OF_PLACE)
                    && self.flags.contains(TxFlags::INPLACE) =>
            {
                let n = out.len().min(input.len());
                out[..n].copy_from_slice(&input[..n]);
                func(self, TxIo::InPlace(out), stride)
            }
            io => func(self, io, stride),
        }
    }

    #[inline]
    pub(crate) fn call_complex(&mut self, out: &mut [T::Complex], input: &[T::Complex]) {
        self.call(
            TxIo::OutOfPlace {
                out: sample::as_samples_mut::<T>(out),
                input: sample::as_samples::<T>(input),
            },
            1,
        );
    }

    #[inline]
    pub(crate) fn call_complex_in_place(&mut self, buf: &mut [T::Complex]) {
        self.call(TxIo::InPlace(sample::as_samples_mut::<T>(buf)), 1);
    }
}

impl<T: TxSample> core::fmt::Debug for TxContext<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TxContext")
            .field("codelet", &self.codelet_name())
            .field("ty", &self.ty)
            .field("len", &self.len)
            .field("inverse", &self.inverse)
            .field("flags", &self.flags)
            .field("map_dir", &self.map_dir)
            .field("sub", &self.sub)
            .finish()
    }
}

/// Allocates a zeroed vector, reporting failure instead of aborting.
pub(crate) fn try_alloc<V: Copy + Default>(len: usize) -> Result<Vec<V>, TxError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, V::default());
    Ok(v)
}

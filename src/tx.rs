// src/tx.rs

//! Public entry point: builds a transform tree and runs it.

use crate::common::{TxError, TxFlags, TxKind, TxType};
use crate::engine::{TxContext, TxFn, TxIo, TxRegistry, init_subtx};
use crate::sample::{self, TxSample};

/// An initialized transform: the root of a codelet tree and the function that runs it.
pub struct Tx<T: TxSample> {
    ctx: TxContext<T>,
    func: TxFn<T>,
}

impl<T: TxSample> Tx<T> {
    /// Selects and initializes the best codelet tree for the request.
    ///
    /// `scale` defaults to 1.0 for every type but FFT, which is left
    /// unscaled. `flags` takes the public flags (`INPLACE`, `UNALIGNED`,
    /// `FULL_IMDCT`, `REAL_TO_REAL`, `REAL_TO_IMAGINARY`).
    pub fn new(
        registry: &TxRegistry<T>,
        ty: TxType,
        inverse: bool,
        len: usize,
        scale: Option<T::Scale>,
        flags: TxFlags,
    ) -> Result<Self, TxError> {
        if len == 0 || ty.domain() != T::DOMAIN {
            return Err(TxError::InvalidArgument);
        }

        let mut flags = flags;
        if !flags.contains(TxFlags::UNALIGNED) {
            flags.insert(TxFlags::ALIGNED);
        }
        if !flags.contains(TxFlags::INPLACE) {
            flags.insert(TxFlags::OUT_OF_PLACE);
        }
        let scale = scale.or_else(|| (ty.kind() != TxKind::Fft).then(|| T::scale_from_f64(1.0)));

        let mut root = TxContext::root(ty);
        init_subtx(&mut root, registry, ty, flags, None, len, inverse, scale)?;
        let ctx = root.sub.pop().ok_or(TxError::NotSupported)?;
        let func = ctx.func.ok_or(TxError::NotSupported)?;

        log::debug!(
            "{:?} len {} inv {}: root {}",
            ty,
            len,
            inverse,
            ctx.codelet_name().unwrap_or("?")
        );
        Ok(Self { ctx, func })
    }

    /// Releases the tree and clears the handle. Safe on an empty handle.
    pub fn uninit(tx: &mut Option<Tx<T>>) {
        if let Some(mut tx) = tx.take() {
            tx.ctx.reset(true);
        }
    }

    /// The root node, for inspecting the selected codelets.
    pub fn context(&self) -> &TxContext<T> {
        &self.ctx
    }

    pub fn compute_fn(&self) -> TxFn<T> {
        self.func
    }

    #[inline]
    pub fn tx_type(&self) -> TxType {
        self.ctx.ty
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ctx.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ctx.len == 0
    }

    #[inline]
    pub fn inverse(&self) -> bool {
        self.ctx.inverse
    }

    /// Samples the transform reads, ignoring stride.
    pub fn input_len(&self) -> usize {
        let n = self.ctx.len;
        match self.ctx.ty.kind() {
            TxKind::Fft => 2 * n,
            TxKind::Mdct if self.ctx.inverse => n,
            TxKind::Mdct => 2 * n,
            TxKind::Rdft if self.ctx.inverse => n + 2,
            TxKind::Rdft => n,
            TxKind::Dct | TxKind::DctI | TxKind::DstI => n,
        }
    }

    /// Samples the transform writes, ignoring stride.
    pub fn output_len(&self) -> usize {
        let n = self.ctx.len;
        let flags = self.ctx.flags;
        match self.ctx.ty.kind() {
            TxKind::Fft => 2 * n,
            TxKind::Mdct if flags.contains(TxFlags::FULL_IMDCT) => 2 * n,
            TxKind::Mdct => n,
            TxKind::Rdft if self.ctx.inverse => n,
            TxKind::Rdft if flags.contains(TxFlags::REAL_TO_REAL) => n / 2 + 1,
            TxKind::Rdft if flags.contains(TxFlags::REAL_TO_IMAGINARY) => n / 2 - 1,
            TxKind::Rdft => n + 2,
            TxKind::Dct | TxKind::DctI | TxKind::DstI => n,
        }
    }

    /// Samples needed on the side `stride` applies to.
    fn strided(len: usize, stride: usize) -> usize {
        if len == 0 { 0 } else { (len - 1) * stride + 1 }
    }

    fn check_stride(&self, stride: usize) -> Result<usize, TxError> {
        if stride == 0 {
            return Err(TxError::InvalidArgument);
        }
        // Only MDCT has a strided side.
        Ok(if self.ctx.ty.kind() == TxKind::Mdct {
            stride
        } else {
            1
        })
    }

    /// Runs the transform out of place. For MDCT, `stride` is the element
    /// step of the coefficient side; every other type ignores it.
    pub fn transform(&mut self, out: &mut [T], input: &[T], stride: usize) -> Result<(), TxError> {
        let stride = self.check_stride(stride)?;
        let (mut need_in, mut need_out) = (self.input_len(), self.output_len());
        if self.ctx.ty.kind() == TxKind::Mdct {
            if self.ctx.inverse {
                need_in = Self::strided(need_in, stride);
            } else {
                need_out = Self::strided(need_out, stride);
            }
        }
        if input.len() < need_in || out.len() < need_out {
            return Err(TxError::SizeMismatch);
        }

        let flags = self.ctx.flags;
        if !flags.contains(TxFlags::OUT_OF_PLACE) {
            // In-place only root: run it over a copy of the input.
            let n = need_in.max(need_out);
            if out.len() < n {
                return Err(TxError::SizeMismatch);
            }
            out[..need_in].copy_from_slice(&input[..need_in]);
            (self.func)(&mut self.ctx, TxIo::InPlace(&mut out[..n]), stride);
            return Ok(());
        }
        (self.func)(&mut self.ctx, TxIo::OutOfPlace { out, input }, stride);
        Ok(())
    }

    /// Runs the transform in place. `buf` must hold the larger of the input
    /// and output sizes. Strided in-place calls are rejected.
    pub fn transform_in_place(&mut self, buf: &mut [T], stride: usize) -> Result<(), TxError> {
        if stride != 1 && self.ctx.ty.kind() == TxKind::Mdct {
            return Err(TxError::InvalidArgument);
        }
        self.check_stride(stride)?;
        if !self.ctx.flags.contains(TxFlags::INPLACE) {
            return Err(TxError::NotSupported);
        }
        if buf.len() < self.input_len().max(self.output_len()) {
            return Err(TxError::SizeMismatch);
        }
        (self.func)(&mut self.ctx, TxIo::InPlace(buf), 1);
        Ok(())
    }

    /// Complex-valued convenience for FFTs.
    pub fn fft(&mut self, out: &mut [T::Complex], input: &[T::Complex]) -> Result<(), TxError> {
        if self.ctx.ty.kind() != TxKind::Fft {
            return Err(TxError::InvalidArgument);
        }
        self.transform(
            sample::as_samples_mut::<T>(out),
            sample::as_samples::<T>(input),
            1,
        )
    }
}

impl<T: TxSample> Drop for Tx<T> {
    fn drop(&mut self) {
        self.ctx.reset(true);
    }
}

impl<T: TxSample> core::fmt::Debug for Tx<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tx").field("ctx", &self.ctx).finish()
    }
}

#[cfg(test)]
#[path = "tx_tests.rs"]
mod tests;

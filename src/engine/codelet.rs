// src/engine/codelet.rs

use core::fmt;

use super::context::TxContext;
use super::registry::TxRegistry;
use crate::common::{TxError, TxFlags, TxKind, TxType};
use crate::cpu::CpuFlags;
use crate::sample::TxSample;

/// One factor a codelet consumes from the transform length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    /// Absorbs whatever length remains.
    Any,
    Of(usize),
}

/// Transform family a codelet applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeletType {
    Any,
    Kind(TxKind),
}

impl CodeletType {
    #[inline]
    pub fn matches(self, ty: TxType) -> bool {
        match self {
            CodeletType::Any => true,
            CodeletType::Kind(kind) => ty.kind() == kind,
        }
    }
}

/// How a permutation map is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapDirection {
    #[default]
    None,
    /// `out[i] = in[map[i]]`
    Gather,
    /// `out[map[i]] = in[i]`
    Scatter,
}

/// Options a parent passes down when requesting a subtransform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeletOptions {
    pub map_dir: MapDirection,
}

impl CodeletOptions {
    pub const fn new(map_dir: MapDirection) -> Self {
        Self { map_dir }
    }
}

/// Buffers handed to a compute function, in samples of the domain.
pub enum TxIo<'a, T> {
    InPlace(&'a mut [T]),
    OutOfPlace { out: &'a mut [T], input: &'a [T] },
}

/// Compute callback. The `usize` is the element stride of the frequency-domain side.
pub type TxFn<T> = fn(&mut TxContext<T>, TxIo<'_, T>, usize);

/// Initialization callback, may build subtransforms and maps on the context.
pub type InitFn<T> = fn(&mut TxContext<T>, &InitArgs<'_, T>) -> Result<(), TxError>;

pub type UninitFn<T> = fn(&mut TxContext<T>);

/// Everything an init callback gets besides the context it fills.
pub struct InitArgs<'a, T: TxSample> {
    pub registry: &'a TxRegistry<T>,
    pub codelet: &'a CodeletDescriptor<T>,
    /// The normalized request flags. The node itself carries these merged
    /// with the codelet's own flags.
    pub flags: TxFlags,
    pub opts: Option<CodeletOptions>,
    pub len: usize,
    pub inverse: bool,
    pub scale: Option<T::Scale>,
}

impl<T: TxSample> InitArgs<'_, T> {
    #[inline]
    pub fn scale_f64(&self) -> Option<f64> {
        self.scale.map(T::scale_to_f64)
    }

    /// The requested map direction, `None` when the parent did not ask for one.
    #[inline]
    pub fn map_dir(&self) -> MapDirection {
        self.opts.map(|o| o.map_dir).unwrap_or_default()
    }
}

/// Static description of a codelet.
pub struct CodeletDescriptor<T: TxSample> {
    pub name: &'static str,
    pub ty: CodeletType,
    pub factors: &'static [Factor],
    /// How many entries of `factors` must match.
    pub nb_factors: usize,
    pub min_len: usize,
    /// `None` means unlimited.
    pub max_len: Option<usize>,
    pub flags: TxFlags,
    pub cpu_flags: CpuFlags,
    pub prio: i32,
    pub init: Option<InitFn<T>>,
    pub uninit: Option<UninitFn<T>>,
    pub function: TxFn<T>,
}

impl<T: TxSample> Clone for CodeletDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TxSample> Copy for CodeletDescriptor<T> {}

impl<T: TxSample> fmt::Debug for CodeletDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeletDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("factors", &self.factors)
            .field("min_len", &self.min_len)
            .field("max_len", &self.max_len)
            .field("flags", &self.flags)
            .field("prio", &self.prio)
            .finish()
    }
}

impl<T: TxSample> CodeletDescriptor<T> {
    /// Whether the codelet's direction restrictions exclude this direction.
    pub fn rejects_direction(&self, inverse: bool) -> bool {
        let flags = self.flags;
        (flags.contains(TxFlags::FORWARD_ONLY) && inverse)
            || (flags.intersects(TxFlags::INVERSE_ONLY | TxFlags::FULL_IMDCT) && !inverse)
            || (flags.intersects(TxFlags::FORWARD_ONLY | TxFlags::REAL_TO_REAL) && inverse)
            || (flags.intersects(TxFlags::FORWARD_ONLY | TxFlags::REAL_TO_IMAGINARY) && inverse)
    }

    #[inline]
    pub fn supports_len(&self, len: usize) -> bool {
        len >= self.min_len && self.max_len.is_none_or(|max| len <= max)
    }

    /// Largest concrete factor among the first few, used by scoring.
    pub(crate) fn max_factor(&self) -> usize {
        self.factors
            .iter()
            .take(crate::common::TX_MAX_SUB)
            .filter_map(|f| match f {
                Factor::Of(n) => Some(*n),
                Factor::Any => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// src/common.rs

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use thiserror::Error;

/// Maximum number of subtransforms a single context may own.
pub const TX_MAX_SUB: usize = 4;

/// Maximum number of factors a codelet may declare.
pub const TX_MAX_FACTORS: usize = 16;

/// Upper bound on the candidate splits returned by the length decomposer.
pub const TX_MAX_DECOMPOSITIONS: usize = 512;

pub const PRIO_BASE: i32 = 0;
pub const PRIO_MIN: i32 = -131072;
pub const PRIO_MAX: i32 = 32768;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum TxError {
    /// Zero length, unknown type, incoherent flags or non-coprime factors.
    #[error("invalid argument")]
    InvalidArgument,
    /// The request is well formed but no codelet can build it.
    #[error("no codelet supports the requested transform")]
    NotSupported,
    /// An allocation failed while building a transform.
    #[error("out of memory while building a transform")]
    OutOfMemory,
    /// A caller buffer does not match the transform length.
    #[error("buffer size does not match the transform length")]
    SizeMismatch,
}

impl TxError {
    /// Errors that abort a candidate search instead of moving on to the next codelet.
    #[inline]
    pub fn is_fatal(self) -> bool {
        matches!(self, TxError::OutOfMemory)
    }
}

impl From<alloc::collections::TryReserveError> for TxError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        TxError::OutOfMemory
    }
}

/// Numeric domain a transform operates in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Domain {
    Float,
    Double,
    Int32,
}

/// Transform family, independent of the numeric domain.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TxKind {
    Fft,
    Mdct,
    Rdft,
    Dct,
    DctI,
    DstI,
}

/// A concrete transform type. Discriminants are stable raw codes.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u32)]
pub enum TxType {
    FloatFft = 0,
    FloatMdct = 1,
    DoubleFft = 2,
    DoubleMdct = 3,
    Int32Fft = 4,
    Int32Mdct = 5,
    FloatRdft = 6,
    DoubleRdft = 7,
    Int32Rdft = 8,
    FloatDct = 9,
    DoubleDct = 10,
    Int32Dct = 11,
    FloatDctI = 12,
    DoubleDctI = 13,
    Int32DctI = 14,
    FloatDstI = 15,
    DoubleDstI = 16,
    Int32DstI = 17,
}

impl TxType {
    const ALL: [TxType; 18] = [
        TxType::FloatFft,
        TxType::FloatMdct,
        TxType::DoubleFft,
        TxType::DoubleMdct,
        TxType::Int32Fft,
        TxType::Int32Mdct,
        TxType::FloatRdft,
        TxType::DoubleRdft,
        TxType::Int32Rdft,
        TxType::FloatDct,
        TxType::DoubleDct,
        TxType::Int32Dct,
        TxType::FloatDctI,
        TxType::DoubleDctI,
        TxType::Int32DctI,
        TxType::FloatDstI,
        TxType::DoubleDstI,
        TxType::Int32DstI,
    ];

    pub fn new(kind: TxKind, domain: Domain) -> Self {
        use Domain::*;
        use TxKind::*;
        match (kind, domain) {
            (Fft, Float) => TxType::FloatFft,
            (Fft, Double) => TxType::DoubleFft,
            (Fft, Int32) => TxType::Int32Fft,
            (Mdct, Float) => TxType::FloatMdct,
            (Mdct, Double) => TxType::DoubleMdct,
            (Mdct, Int32) => TxType::Int32Mdct,
            (Rdft, Float) => TxType::FloatRdft,
            (Rdft, Double) => TxType::DoubleRdft,
            (Rdft, Int32) => TxType::Int32Rdft,
            (Dct, Float) => TxType::FloatDct,
            (Dct, Double) => TxType::DoubleDct,
            (Dct, Int32) => TxType::Int32Dct,
            (DctI, Float) => TxType::FloatDctI,
            (DctI, Double) => TxType::DoubleDctI,
            (DctI, Int32) => TxType::Int32DctI,
            (DstI, Float) => TxType::FloatDstI,
            (DstI, Double) => TxType::DoubleDstI,
            (DstI, Int32) => TxType::Int32DstI,
        }
    }

    pub fn kind(self) -> TxKind {
        match self {
            TxType::FloatFft | TxType::DoubleFft | TxType::Int32Fft => TxKind::Fft,
            TxType::FloatMdct | TxType::DoubleMdct | TxType::Int32Mdct => TxKind::Mdct,
            TxType::FloatRdft | TxType::DoubleRdft | TxType::Int32Rdft => TxKind::Rdft,
            TxType::FloatDct | TxType::DoubleDct | TxType::Int32Dct => TxKind::Dct,
            TxType::FloatDctI | TxType::DoubleDctI | TxType::Int32DctI => TxKind::DctI,
            TxType::FloatDstI | TxType::DoubleDstI | TxType::Int32DstI => TxKind::DstI,
        }
    }

    pub fn domain(self) -> Domain {
        match self as u32 {
            0 | 1 | 6 | 9 | 12 | 15 => Domain::Float,
            2 | 3 | 7 | 10 | 13 | 16 => Domain::Double,
            _ => Domain::Int32,
        }
    }

    /// Same family, other domain.
    pub fn with_kind(self, kind: TxKind) -> Self {
        TxType::new(kind, self.domain())
    }
}

impl TryFrom<u32> for TxType {
    type Error = TxError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        TxType::ALL
            .get(raw as usize)
            .copied()
            .ok_or(TxError::InvalidArgument)
    }
}

/// Capability flags shared by requests, codelets and contexts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxFlags(u64);

impl TxFlags {
    pub const NONE: Self = Self(0);

    /// Transform runs on a single buffer.
    pub const INPLACE: Self = Self(1 << 0);
    /// Buffers need not be aligned.
    pub const UNALIGNED: Self = Self(1 << 1);
    /// Inverse MDCT produces the full 2N output instead of the half.
    pub const FULL_IMDCT: Self = Self(1 << 2);
    /// RDFT outputs only the real half of the spectrum.
    pub const REAL_TO_REAL: Self = Self(1 << 3);
    /// RDFT outputs only the imaginary half of the spectrum.
    pub const REAL_TO_IMAGINARY: Self = Self(1 << 4);

    pub const OUT_OF_PLACE: Self = Self(1 << 63);
    pub const ALIGNED: Self = Self(1 << 62);
    /// Input arrives already permuted by the codelet's map.
    pub const PRESHUFFLE: Self = Self(1 << 61);
    pub const INVERSE_ONLY: Self = Self(1 << 60);
    pub const FORWARD_ONLY: Self = Self(1 << 59);
    pub const ASM_CALL: Self = Self(1 << 58);

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// All bits of `other` are set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Any bit of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for TxFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for TxFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl BitAnd for TxFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for TxFlags {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for TxFlags {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for TxFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TxFlags, &str); 11] = [
            (TxFlags::INPLACE, "INPLACE"),
            (TxFlags::UNALIGNED, "UNALIGNED"),
            (TxFlags::FULL_IMDCT, "FULL_IMDCT"),
            (TxFlags::REAL_TO_REAL, "REAL_TO_REAL"),
            (TxFlags::REAL_TO_IMAGINARY, "REAL_TO_IMAGINARY"),
            (TxFlags::OUT_OF_PLACE, "OUT_OF_PLACE"),
            (TxFlags::ALIGNED, "ALIGNED"),
            (TxFlags::PRESHUFFLE, "PRESHUFFLE"),
            (TxFlags::INVERSE_ONLY, "INVERSE_ONLY"),
            (TxFlags::FORWARD_ONLY, "FORWARD_ONLY"),
            (TxFlags::ASM_CALL, "ASM_CALL"),
        ];

        write!(f, "TxFlags(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        write!(f, ")")
    }
}

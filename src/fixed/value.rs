// src/fixed/value.rs

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

/// Generic fixed-point value with FRAC fractional bits stored in an i32.
/// Addition and subtraction wrap, like the integer transforms they feed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct Fixed<const FRAC: u32>(i32);

/// Q31, the sample format of the int32 transform domain.
pub type Q31 = Fixed<31>;

// SAFETY: repr(transparent) over i32, every bit pattern is valid.
unsafe impl<const FRAC: u32> bytemuck::Zeroable for Fixed<FRAC> {}
unsafe impl<const FRAC: u32> bytemuck::Pod for Fixed<FRAC> {}

impl<const FRAC: u32> Fixed<FRAC> {
    pub const ZERO: Self = Self(0);

    /// Creates a Fixed from the raw integer value (without shift).
    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Converts an f64 with rounding. Out of range values saturate.
    pub fn from_f64(value: f64) -> Self {
        let scaling_factor = (1u64 << FRAC) as f64;
        Self(crate::math::round(value * scaling_factor) as i32)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << FRAC) as f64
    }

    #[inline]
    pub fn to_bits(self) -> i32 {
        self.0
    }
}

impl<const FRAC: u32> Add for Fixed<FRAC> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl<const FRAC: u32> Sub for Fixed<FRAC> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl<const FRAC: u32> Mul for Fixed<FRAC> {
    type Output = Self;

    /// Full 64-bit product rounded back to FRAC fractional bits.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let product = self.0 as i64 * rhs.0 as i64;
        let rounded = if FRAC > 0 {
            (product + (1i64 << (FRAC - 1))) >> FRAC
        } else {
            product
        };
        Fixed(rounded as i32)
    }
}

impl<const FRAC: u32> Neg for Fixed<FRAC> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Fixed(self.0.wrapping_neg())
    }
}

impl<const FRAC: u32> fmt::Display for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

impl<const FRAC: u32> fmt::Debug for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} (raw: {})", self.to_f64(), self.0)
    }
}

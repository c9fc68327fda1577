// src/fixed/complex.rs

use super::value::Fixed;
use core::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ComplexFixed<const FRAC: u32> {
    pub re: Fixed<FRAC>,
    pub im: Fixed<FRAC>,
}

// SAFETY: two i32-sized fields, repr(C), no padding.
unsafe impl<const FRAC: u32> bytemuck::Zeroable for ComplexFixed<FRAC> {}
unsafe impl<const FRAC: u32> bytemuck::Pod for ComplexFixed<FRAC> {}

impl<const FRAC: u32> ComplexFixed<FRAC> {
    #[inline]
    pub fn new(re: Fixed<FRAC>, im: Fixed<FRAC>) -> Self {
        Self { re, im }
    }
}

impl<const FRAC: u32> Add for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        ComplexFixed {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<const FRAC: u32> Sub for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        ComplexFixed {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<const FRAC: u32> Mul for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let re = (self.re * rhs.re) - (self.im * rhs.im);
        let im = (self.re * rhs.im) + (self.im * rhs.re);
        ComplexFixed { re, im }
    }
}

impl<const FRAC: u32> Neg for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        ComplexFixed {
            re: -self.re,
            im: -self.im,
        }
    }
}

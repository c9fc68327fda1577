// src/sample.rs

//! Numeric domains the engine is generic over.

use crate::common::Domain;
use crate::fixed::{ComplexFixed, Q31};
use crate::math;
use bytemuck::Pod;
use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};
use num_complex::Complex;

/// Complex value of a sample domain, laid out as `[re, im]`.
pub trait TxComplex<R>:
    Copy
    + Default
    + Debug
    + PartialEq
    + Pod
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
where
    R: Copy + Neg<Output = R>,
{
    fn new(re: R, im: R) -> Self;
    fn re(self) -> R;
    fn im(self) -> R;

    #[inline]
    fn conj(self) -> Self {
        Self::new(self.re(), -self.im())
    }

    /// `(im, re)`
    #[inline]
    fn swapped(self) -> Self {
        Self::new(self.im(), self.re())
    }

    /// Multiplies by -i.
    #[inline]
    fn mul_neg_i(self) -> Self {
        Self::new(self.im(), -self.re())
    }
}

/// A real sample type: `f32`, `f64` or Q31 fixed point.
pub trait TxSample:
    Copy
    + Default
    + Debug
    + PartialEq
    + Pod
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    type Complex: TxComplex<Self>;
    /// Scale factor type passed at initialization.
    type Scale: Copy + Debug + PartialEq + Send + Sync + 'static;

    const DOMAIN: Domain;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn scale_to_f64(scale: Self::Scale) -> f64;
    fn scale_from_f64(value: f64) -> Self::Scale;

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        Self::from_f64(self.to_f64() * factor)
    }
}

macro_rules! impl_float_sample {
    ($t:ty, $domain:expr) => {
        impl TxComplex<$t> for Complex<$t> {
            #[inline]
            fn new(re: $t, im: $t) -> Self {
                Complex::new(re, im)
            }

            #[inline]
            fn re(self) -> $t {
                self.re
            }

            #[inline]
            fn im(self) -> $t {
                self.im
            }
        }

        impl TxSample for $t {
            type Complex = Complex<$t>;
            type Scale = $t;

            const DOMAIN: Domain = $domain;

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn scale_to_f64(scale: $t) -> f64 {
                scale as f64
            }

            #[inline]
            fn scale_from_f64(value: f64) -> $t {
                value as $t
            }

            #[inline]
            fn scaled(self, factor: f64) -> Self {
                self * factor as $t
            }
        }
    };
}

impl_float_sample!(f32, Domain::Float);
impl_float_sample!(f64, Domain::Double);

impl TxComplex<Q31> for ComplexFixed<31> {
    #[inline]
    fn new(re: Q31, im: Q31) -> Self {
        ComplexFixed::new(re, im)
    }

    #[inline]
    fn re(self) -> Q31 {
        self.re
    }

    #[inline]
    fn im(self) -> Q31 {
        self.im
    }
}

impl TxSample for Q31 {
    type Complex = ComplexFixed<31>;
    type Scale = f32;

    const DOMAIN: Domain = Domain::Int32;

    #[inline]
    fn from_f64(value: f64) -> Self {
        Q31::from_f64(value)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        Q31::to_f64(self)
    }

    #[inline]
    fn scale_to_f64(scale: f32) -> f64 {
        scale as f64
    }

    #[inline]
    fn scale_from_f64(value: f64) -> f32 {
        value as f32
    }
}

/// `e^(i * angle)` in the sample domain.
#[inline]
pub(crate) fn expi<T: TxSample>(angle: f64) -> T::Complex {
    let (sin, cos) = math::sin_cos(angle);
    T::Complex::new(T::from_f64(cos), T::from_f64(sin))
}

#[inline]
pub(crate) fn cplx_scaled<T: TxSample>(value: T::Complex, factor: f64) -> T::Complex {
    T::Complex::new(value.re().scaled(factor), value.im().scaled(factor))
}

#[inline]
pub(crate) fn mul_real<T: TxSample>(value: T::Complex, factor: T) -> T::Complex {
    T::Complex::new(value.re() * factor, value.im() * factor)
}

/// Multiplies every element by `factor`, skipping the neutral scale.
pub(crate) fn scale_in_place<T: TxSample>(buf: &mut [T::Complex], factor: Option<f64>) {
    let Some(factor) = factor else { return };
    if factor == 1.0 {
        return;
    }
    for value in buf.iter_mut() {
        *value = cplx_scaled::<T>(*value, factor);
    }
}

#[inline]
pub(crate) fn as_complex<T: TxSample>(samples: &[T]) -> &[T::Complex] {
    bytemuck::cast_slice(samples)
}

#[inline]
pub(crate) fn as_complex_mut<T: TxSample>(samples: &mut [T]) -> &mut [T::Complex] {
    bytemuck::cast_slice_mut(samples)
}

#[inline]
pub(crate) fn as_samples<T: TxSample>(values: &[T::Complex]) -> &[T] {
    bytemuck::cast_slice(values)
}

#[inline]
pub(crate) fn as_samples_mut<T: TxSample>(values: &mut [T::Complex]) -> &mut [T] {
    bytemuck::cast_slice_mut(values)
}

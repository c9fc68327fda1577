// src/math.rs

//! Scalar helpers that switch between std and libm.

#[inline]
pub(crate) fn sin_cos(angle: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    return (angle.sin(), angle.cos());

    #[cfg(not(feature = "std"))]
    return (libm::sin(angle), libm::cos(angle));
}

#[inline]
pub(crate) fn cos(angle: f64) -> f64 {
    sin_cos(angle).1
}

#[inline]
pub(crate) fn sqrt(value: f64) -> f64 {
    #[cfg(feature = "std")]
    return value.sqrt();

    #[cfg(not(feature = "std"))]
    return libm::sqrt(value);
}

#[inline]
pub(crate) fn round(value: f64) -> f64 {
    #[cfg(feature = "std")]
    return value.round();

    #[cfg(not(feature = "std"))]
    return libm::round(value);
}

pub(crate) fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Modular multiplicative inverse of `n` modulo `m`, or 0 if none exists.
pub(crate) fn mulinv(n: usize, m: usize) -> usize {
    if m <= 1 {
        return 0;
    }
    let n = n % m;
    (1..m).find(|x| (n * x) % m == 1).unwrap_or(0)
}

use super::*;
use crate::common::TxType;
use crate::engine::TxRegistry;
use crate::fixed::Q31;
use crate::tx::Tx;
use alloc::vec;

const EPSILON: f64 = 1e-4;

fn assert_close(got: &[f64], want: &[f64], tolerance: f64, what: &str) {
    assert_eq!(got.len(), want.len(), "{}: length", what);
    for (i, (a, b)) in got.iter().zip(want.iter()).enumerate() {
        assert!(
            (a - b).abs() < tolerance,
            "{}: sample {} mismatch: {} vs {}",
            what,
            i,
            a,
            b
        );
    }
}

fn signal(len: usize, amp: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            amp * (0.6 * (0.37 * t).sin() + 0.4 * (2.1 * t + 0.3).cos())
        })
        .collect()
}

/// `X[k] = scale * sum x[n] cos(pi / N (n + 1/2 + N/2) (k + 1/2))`
fn mdct_ref(input: &[f64], scale: f64) -> Vec<f64> {
    let n = input.len() / 2;
    (0..n)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(j, &x)| {
                    x * (PI / n as f64 * (j as f64 + 0.5 + n as f64 / 2.0) * (k as f64 + 0.5)).cos()
                })
                .sum();
            sum * scale
        })
        .collect()
}

/// Full IMDCT window as produced by the transforms: the textbook sum, negated.
fn imdct_full_ref(coeffs: &[f64], scale: f64) -> Vec<f64> {
    let n = coeffs.len();
    (0..2 * n)
        .map(|t| {
            let sum: f64 = coeffs
                .iter()
                .enumerate()
                .map(|(k, &x)| {
                    x * (PI / n as f64 * (t as f64 + 0.5 + n as f64 / 2.0) * (k as f64 + 0.5)).cos()
                })
                .sum();
            -sum * scale
        })
        .collect()
}

/// The half-length IMDCT is the middle of the full window.
fn imdct_ref(coeffs: &[f64], scale: f64) -> Vec<f64> {
    let n = coeffs.len();
    imdct_full_ref(coeffs, scale)[n / 2..n / 2 + n].to_vec()
}

fn to_samples<T: TxSample>(values: &[f64]) -> Vec<T> {
    values.iter().map(|&v| T::from_f64(v)).collect()
}

fn from_samples<T: TxSample>(samples: &[T]) -> Vec<f64> {
    samples.iter().map(|s| s.to_f64()).collect()
}

fn mdct_type<T: TxSample>() -> TxType {
    TxType::new(TxKind::Mdct, T::DOMAIN)
}

fn forward<T: TxSample>(
    registry: &TxRegistry<T>,
    len: usize,
    scale: f64,
    input: &[f64],
) -> (Vec<f64>, &'static str) {
    let mut tx = Tx::new(
        registry,
        mdct_type::<T>(),
        false,
        len,
        Some(T::scale_from_f64(scale)),
        TxFlags::NONE,
    )
    .unwrap();
    let mut out = vec![T::default(); len];
    tx.transform(&mut out, &to_samples::<T>(input), 1).unwrap();
    (from_samples(&out), tx.context().codelet_name().unwrap_or("-"))
}

fn inverse<T: TxSample>(
    registry: &TxRegistry<T>,
    len: usize,
    scale: f64,
    coeffs: &[f64],
    flags: TxFlags,
) -> (Vec<f64>, &'static str) {
    let mut tx = Tx::new(
        registry,
        mdct_type::<T>(),
        true,
        len,
        Some(T::scale_from_f64(scale)),
        flags,
    )
    .unwrap();
    let mut out = vec![T::default(); tx.output_len()];
    tx.transform(&mut out, &to_samples::<T>(coeffs), 1).unwrap();
    (from_samples(&out), tx.context().codelet_name().unwrap_or("-"))
}

#[test]
fn test_forward_matches_direct_sum() {
    let registry = TxRegistry::<f64>::with_cpu_flags(CpuFlags::NONE);
    for len in [4, 8, 12, 16, 32, 60, 120, 256] {
        for scale in [1.0, -0.5, 1.0 / len as f64] {
            let input = signal(2 * len, 1.0);
            let (out, name) = forward(&registry, len, scale, &input);
            assert_eq!(name, "mdct_fwd");
            assert_close(
                &out,
                &mdct_ref(&input, scale),
                EPSILON,
                &alloc::format!("mdct len {} scale {}", len, scale),
            );
        }
    }
}

#[test]
fn test_inverse_matches_direct_sum() {
    let registry = TxRegistry::<f64>::with_cpu_flags(CpuFlags::NONE);
    for len in [4, 8, 12, 16, 40, 64, 240] {
        for scale in [1.0, 1.0 / len as f64] {
            let coeffs = signal(len, 1.0);
            let (out, name) = inverse(&registry, len, scale, &coeffs, TxFlags::NONE);
            assert_eq!(name, "mdct_inv");
            assert_close(
                &out,
                &imdct_ref(&coeffs, scale),
                EPSILON,
                &alloc::format!("imdct len {} scale {}", len, scale),
            );
        }
    }
}

#[test]
fn test_lengths_without_fast_path() {
    let registry = TxRegistry::<f64>::with_cpu_flags(CpuFlags::NONE);
    for len in [2, 6, 10, 18] {
        let input = signal(2 * len, 1.0);
        let (out, name) = forward(&registry, len, 1.0, &input);
        assert_eq!(name, "mdct_naive_fwd");
        assert_close(&out, &mdct_ref(&input, 1.0), EPSILON, "naive mdct");

        let coeffs = signal(len, 1.0);
        let (out, name) = inverse(&registry, len, 0.5, &coeffs, TxFlags::NONE);
        assert_eq!(name, "mdct_naive_inv");
        assert_close(&out, &imdct_ref(&coeffs, 0.5), EPSILON, "naive imdct");
    }
}

#[test]
fn test_strided_coefficients() {
    let registry = TxRegistry::<f64>::with_cpu_flags(CpuFlags::NONE);
    let stride = 3;
    for len in [6, 16] {
        let input = signal(2 * len, 1.0);
        let mut fwd = Tx::new(&registry, TxType::DoubleMdct, false, len, Some(1.0), TxFlags::NONE)
            .unwrap();
        let mut out = vec![0.0f64; (len - 1) * stride + 1];
        assert_eq!(
            fwd.transform(&mut out[..len], &input, stride),
            Err(TxError::SizeMismatch)
        );
        fwd.transform(&mut out, &input, stride).unwrap();
        let picked: Vec<f64> = out.iter().step_by(stride).copied().collect();
        assert_close(&picked, &mdct_ref(&input, 1.0), EPSILON, "strided mdct");

        let mut inv = Tx::new(&registry, TxType::DoubleMdct, true, len, Some(1.0), TxFlags::NONE)
            .unwrap();
        let mut time = vec![0.0f64; len];
        inv.transform(&mut time, &out, stride).unwrap();
        let coeffs = mdct_ref(&input, 1.0);
        assert_close(&time, &imdct_ref(&coeffs, 1.0), EPSILON, "strided imdct");
    }
}

#[test]
fn test_full_imdct() {
    let registry = TxRegistry::<f64>::with_cpu_flags(CpuFlags::NONE);
    for len in [2, 8, 12, 32] {
        let coeffs = signal(len, 1.0);
        let (out, name) = inverse(&registry, len, 0.25, &coeffs, TxFlags::FULL_IMDCT);
        assert_eq!(name, "mdct_inv_full");
        assert_eq!(out.len(), 2 * len);
        assert_close(&out, &imdct_full_ref(&coeffs, 0.25), EPSILON, "full imdct");

        // Same result in place, with the coefficients at the front.
        let mut tx = Tx::new(
            &registry,
            TxType::DoubleMdct,
            true,
            len,
            Some(0.25),
            TxFlags::FULL_IMDCT | TxFlags::INPLACE,
        )
        .unwrap();
        let mut buf = vec![0.0f64; 2 * len];
        buf[..len].copy_from_slice(&coeffs);
        tx.transform_in_place(&mut buf, 1).unwrap();
        assert_close(&buf, &out, 1e-12, "in-place full imdct");
        assert_eq!(tx.transform_in_place(&mut buf, 2), Err(TxError::InvalidArgument));
    }

    assert_eq!(
        Tx::new(&registry, TxType::DoubleMdct, false, 8, None, TxFlags::FULL_IMDCT).err(),
        Some(TxError::NotSupported)
    );
}

#[test]
fn test_overlap_add_reconstructs_signal() {
    let registry = TxRegistry::<f32>::with_cpu_flags(CpuFlags::NONE);
    let len = 32;
    let window: Vec<f64> = (0..2 * len)
        .map(|n| (PI * (n as f64 + 0.5) / (2 * len) as f64).sin())
        .collect();
    let signal = signal(3 * len, 1.0);

    let mut fwd = Tx::new(&registry, TxType::FloatMdct, false, len, Some(-1.0), TxFlags::NONE)
        .unwrap();
    let mut inv = Tx::new(
        &registry,
        TxType::FloatMdct,
        true,
        len,
        Some(2.0 / len as f32),
        TxFlags::FULL_IMDCT,
    )
    .unwrap();

    let mut blocks = Vec::new();
    for start in [0, len] {
        let windowed: Vec<f32> = (0..2 * len)
            .map(|n| (signal[start + n] * window[n]) as f32)
            .collect();
        let mut coeffs = vec![0.0f32; len];
        let mut time = vec![0.0f32; 2 * len];
        fwd.transform(&mut coeffs, &windowed, 1).unwrap();
        inv.transform(&mut time, &coeffs, 1).unwrap();
        blocks.push(time);
    }

    let rebuilt: Vec<f64> = (0..len)
        .map(|n| {
            blocks[0][len + n] as f64 * window[len + n] + blocks[1][n] as f64 * window[n]
        })
        .collect();
    assert_close(&rebuilt, &signal[len..2 * len], 1e-4, "overlap-add");
}

#[test]
fn test_fixed_point_mdct() {
    let registry = TxRegistry::<Q31>::with_cpu_flags(CpuFlags::NONE);
    for len in [8, 16, 64] {
        let amp = 0.25 / len as f64;
        let input = signal(2 * len, amp);
        let exact: Vec<f64> = to_samples::<Q31>(&input).iter().map(|s| s.to_f64()).collect();
        let (out, name) = forward(&registry, len, 1.0, &input);
        assert_eq!(name, "mdct_fwd");
        assert_close(&out, &mdct_ref(&exact, 1.0), 1e-6, "q31 mdct");

        let coeffs = signal(len, amp);
        let exact: Vec<f64> = to_samples::<Q31>(&coeffs).iter().map(|s| s.to_f64()).collect();
        let (out, _) = inverse(&registry, len, 1.0, &coeffs, TxFlags::NONE);
        assert_close(&out, &imdct_ref(&exact, 1.0), 1e-6, "q31 imdct");
    }
}

#[test]
fn test_buffer_sizes() {
    let registry = TxRegistry::<f32>::with_cpu_flags(CpuFlags::NONE);
    let fwd = Tx::new(&registry, TxType::FloatMdct, false, 16, None, TxFlags::NONE).unwrap();
    assert_eq!((fwd.input_len(), fwd.output_len()), (32, 16));
    let inv = Tx::new(&registry, TxType::FloatMdct, true, 16, None, TxFlags::NONE).unwrap();
    assert_eq!((inv.input_len(), inv.output_len()), (16, 16));
    let full = Tx::new(&registry, TxType::FloatMdct, true, 16, None, TxFlags::FULL_IMDCT).unwrap();
    assert_eq!((full.input_len(), full.output_len()), (16, 32));
    // Scale defaults to one.
    assert_eq!(fwd.context().scale(), Some(1.0));
}

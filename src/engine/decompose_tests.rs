use super::*;
use crate::codelets;
use crate::cpu::CpuFlags;
use crate::engine::registry::CodeletList;
use alloc::vec;
use alloc::vec::Vec;

fn registry() -> TxRegistry<f32> {
    TxRegistry::with_cpu_flags(CpuFlags::NONE)
}

fn consumed(list: &[LengthDecomposition<'_, f32>]) -> Vec<usize> {
    list.iter().map(|d| d.consumed).collect()
}

#[test]
fn test_fifteen_splits_into_five_and_three() {
    let reg = registry();
    let found = decompose_length(&reg, TxType::FloatFft, 15, true).unwrap();
    // The 5-point codelet carries the larger factor bonus.
    assert_eq!(consumed(&found), vec![5, 3]);
    assert_eq!(found[0].remainder, 3);
    assert_eq!(found[1].remainder, 5);
}

#[test]
fn test_forward_only_codelets_raise_priority() {
    let reg = registry();
    let inv = decompose_length(&reg, TxType::FloatFft, 12, true).unwrap();
    let fwd = decompose_length(&reg, TxType::FloatFft, 12, false).unwrap();

    // fft4_ns (64 + 32) * 4 beats fft3_ns (64 + 48) * 3 ...
    assert_eq!(consumed(&inv), vec![4, 3]);
    assert_eq!(inv[0].priority, 384);
    // ... until fft3_fwd adds its direction bonus.
    assert_eq!(consumed(&fwd), vec![3, 4]);
    assert_eq!(fwd[0].priority, 528);
}

#[test]
fn test_consumed_lengths_are_unique() {
    let reg = registry();
    // fft9_ns and fft9_fwd both consume 9 out of 45.
    let found = decompose_length(&reg, TxType::FloatFft, 45, false).unwrap();
    let lens = consumed(&found);
    for (i, a) in lens.iter().enumerate() {
        assert!(!lens[i + 1..].contains(a), "duplicate {} in {:?}", a, lens);
    }
    assert_eq!(lens[0], 9);
    assert_eq!(found[0].priority, (64 + 144 + 64) * 9);
}

#[test]
fn test_every_split_is_coprime_and_exact() {
    let reg = registry();
    let lens = [
        6usize, 10, 12, 14, 15, 20, 21, 24, 28, 30, 35, 36, 40, 45, 48, 60, 63, 80, 96, 105,
    ];
    for len in lens {
        for inverse in [false, true] {
            let found = decompose_length(&reg, TxType::FloatFft, len, inverse).unwrap();
            assert!(!found.is_empty());
            for d in &found {
                assert_eq!(d.consumed * d.remainder, len, "len {}", len);
                assert_eq!(gcd(d.consumed, d.remainder), 1, "len {}", len);
                assert!(d.consumed < len);
            }
            for pair in found.windows(2) {
                assert!(pair[0].priority >= pair[1].priority);
            }
        }
    }
}

#[test]
fn test_no_split_for_primes_and_powers_of_two() {
    let reg = registry();
    for len in [7usize, 11, 13, 64, 1024] {
        assert_eq!(
            decompose_length(&reg, TxType::FloatFft, len, false).unwrap_err(),
            TxError::InvalidArgument,
            "len {}",
            len
        );
    }
}

#[test]
fn test_decomposition_respects_type() {
    let reg = registry();
    // MDCT codelets consume whole lengths only.
    assert!(decompose_length(&reg, TxType::FloatMdct, 12, false).is_err());
}

#[test]
fn test_empty_registry_finds_nothing() {
    let reg = TxRegistry::<f32>::from_lists(
        vec![CodeletList::new("null", codelets::null_list())],
        CpuFlags::NONE,
    );
    assert_eq!(
        decompose_length(&reg, TxType::FloatFft, 12, false).unwrap_err(),
        TxError::InvalidArgument
    );
}

#[test]
fn test_check_factors() {
    let reg = registry();
    let fft_pfa = reg.find("fft_pfa").unwrap();
    assert!(check_factors(fft_pfa, 15));
    assert!(check_factors(fft_pfa, 22));
    // A single factor, but two are required.
    assert!(!check_factors(fft_pfa, 25));

    let mdct = reg.find("mdct_fwd").unwrap();
    assert!(check_factors(mdct, 4));
    assert!(check_factors(mdct, 12));
    assert!(!check_factors(mdct, 6));

    let sr = reg.find("fft16_ns").unwrap();
    assert!(check_factors(sr, 16));
    assert!(!check_factors(sr, 12));
}

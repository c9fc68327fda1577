use super::*;
use crate::common::TxKind;
use crate::cpu::CpuFlags;
use crate::engine::codelet::{CodeletType, Factor, InitFn, TxIo, UninitFn};
use crate::engine::registry::CodeletList;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

fn noop(_: &mut TxContext<f32>, _: TxIo<'_, f32>, _: usize) {}

fn stub(
    name: &'static str,
    prio: i32,
    flags: TxFlags,
    init: Option<InitFn<f32>>,
    uninit: Option<UninitFn<f32>>,
) -> CodeletDescriptor<f32> {
    CodeletDescriptor {
        name,
        ty: CodeletType::Kind(TxKind::Fft),
        factors: &[Factor::Any],
        nb_factors: 1,
        min_len: 1,
        max_len: None,
        flags: flags | TxFlags::UNALIGNED | TxFlags::OUT_OF_PLACE,
        cpu_flags: CpuFlags::ALL,
        prio,
        init,
        uninit,
        function: noop,
    }
}

fn registry(list: Vec<CodeletDescriptor<f32>>) -> TxRegistry<f32> {
    TxRegistry::from_lists(vec![CodeletList::new("stub", list)], CpuFlags::NONE)
}

fn parent() -> TxContext<f32> {
    TxContext::root(TxType::FloatFft)
}

fn request(reg: &TxRegistry<f32>, p: &mut TxContext<f32>, len: usize) -> Result<(), TxError> {
    init_subtx(p, reg, TxType::FloatFft, TxFlags::NONE, None, len, false, None)
}

fn tree_names(ctx: &TxContext<f32>, out: &mut Vec<(&'static str, usize)>) {
    out.push((ctx.codelet_name().unwrap_or("-"), ctx.len()));
    for sub in ctx.subs() {
        tree_names(sub, out);
    }
}

#[test]
fn test_highest_priority_wins() {
    let reg = registry(vec![
        stub("low", -10, TxFlags::NONE, None, None),
        stub("high", 10, TxFlags::NONE, None, None),
    ]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    assert_eq!(p.subs().len(), 1);
    assert_eq!(p.subs()[0].codelet_name(), Some("high"));
    assert_eq!(
        p.subs()[0].flags(),
        TxFlags::UNALIGNED | TxFlags::OUT_OF_PLACE
    );
}

#[test]
fn test_equal_priority_keeps_scan_order() {
    let reg = registry(vec![
        stub("first", 0, TxFlags::NONE, None, None),
        stub("second", 0, TxFlags::NONE, None, None),
    ]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    assert_eq!(p.subs()[0].codelet_name(), Some("first"));
}

fn fail_invalid(_: &mut TxContext<f32>, _: &InitArgs<'_, f32>) -> Result<(), TxError> {
    Err(TxError::InvalidArgument)
}

#[test]
fn test_failed_candidate_falls_through() {
    let reg = registry(vec![
        stub("broken", 10, TxFlags::NONE, Some(fail_invalid), None),
        stub("fallback", 0, TxFlags::NONE, None, None),
    ]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    assert_eq!(p.subs()[0].codelet_name(), Some("fallback"));
}

static OOM_FALLBACK_INITS: AtomicUsize = AtomicUsize::new(0);

fn fail_oom(_: &mut TxContext<f32>, _: &InitArgs<'_, f32>) -> Result<(), TxError> {
    Err(TxError::OutOfMemory)
}

fn count_oom_fallback(_: &mut TxContext<f32>, _: &InitArgs<'_, f32>) -> Result<(), TxError> {
    OOM_FALLBACK_INITS.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

#[test]
fn test_out_of_memory_stops_the_search() {
    let reg = registry(vec![
        stub("oom", 10, TxFlags::NONE, Some(fail_oom), None),
        stub("never", 0, TxFlags::NONE, Some(count_oom_fallback), None),
    ]);
    let mut p = parent();
    assert_eq!(request(&reg, &mut p, 8), Err(TxError::OutOfMemory));
    assert_eq!(OOM_FALLBACK_INITS.load(Ordering::SeqCst), 0);
    assert!(p.subs().is_empty());
    assert_eq!(p.sub.capacity(), 0);
}

#[test]
fn test_last_error_is_reported() {
    let reg = registry(vec![stub(
        "broken",
        0,
        TxFlags::NONE,
        Some(fail_invalid),
        None,
    )]);
    let mut p = parent();
    assert_eq!(request(&reg, &mut p, 8), Err(TxError::InvalidArgument));
    assert!(p.subs().is_empty());
}

#[test]
fn test_no_candidate_is_not_supported() {
    let reg = registry(vec![stub("plain", 0, TxFlags::NONE, None, None)]);
    let mut p = parent();
    // Nothing offers preshuffled input.
    assert_eq!(
        init_subtx(
            &mut p,
            &reg,
            TxType::FloatFft,
            TxFlags::PRESHUFFLE,
            None,
            8,
            false,
            None
        ),
        Err(TxError::NotSupported)
    );
    // Wrong type.
    assert_eq!(
        init_subtx(&mut p, &reg, TxType::FloatMdct, TxFlags::NONE, None, 8, false, None),
        Err(TxError::NotSupported)
    );
}

#[test]
fn test_bad_requests() {
    let reg = registry(vec![stub("plain", 0, TxFlags::NONE, None, None)]);
    let mut p = parent();
    assert_eq!(request(&reg, &mut p, 0), Err(TxError::InvalidArgument));

    for _ in 0..TX_MAX_SUB {
        request(&reg, &mut p, 4).unwrap();
    }
    assert_eq!(request(&reg, &mut p, 4), Err(TxError::InvalidArgument));
    assert_eq!(p.subs().len(), TX_MAX_SUB);
}

#[test]
fn test_exclusive_flags_must_match() {
    let reg = registry(vec![
        stub("r2r", 100, TxFlags::REAL_TO_REAL, None, None),
        stub("plain", 0, TxFlags::NONE, None, None),
    ]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    assert_eq!(p.subs()[0].codelet_name(), Some("plain"));

    init_subtx(
        &mut p,
        &reg,
        TxType::FloatFft,
        TxFlags::REAL_TO_REAL,
        None,
        8,
        false,
        None,
    )
    .unwrap();
    assert_eq!(p.subs()[1].codelet_name(), Some("r2r"));
}

#[test]
fn test_inplace_and_out_of_place_means_either() {
    let reg = registry(vec![stub("oop", 0, TxFlags::NONE, None, None)]);
    let mut p = parent();
    init_subtx(
        &mut p,
        &reg,
        TxType::FloatFft,
        TxFlags::INPLACE | TxFlags::OUT_OF_PLACE | TxFlags::ALIGNED,
        None,
        8,
        false,
        None,
    )
    .unwrap();
    assert_eq!(
        init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::INPLACE, None, 8, false, None),
        Err(TxError::NotSupported)
    );
}

static UNINITS: AtomicUsize = AtomicUsize::new(0);

fn count_uninit(_: &mut TxContext<f32>) {
    UNINITS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_uninit_runs_once_per_node() {
    let reg = registry(vec![stub("tracked", 0, TxFlags::NONE, None, Some(count_uninit))]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    request(&reg, &mut p, 4).unwrap();
    assert_eq!(UNINITS.load(Ordering::SeqCst), 0);

    p.reset(true);
    assert_eq!(UNINITS.load(Ordering::SeqCst), 2);
    p.reset(true);
    assert_eq!(UNINITS.load(Ordering::SeqCst), 2);
    assert!(p.subs().is_empty());
}

static FAILED_UNINITS: AtomicUsize = AtomicUsize::new(0);

fn count_failed_uninit(_: &mut TxContext<f32>) {
    FAILED_UNINITS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_failed_candidate_is_torn_down() {
    let reg = registry(vec![
        stub("broken", 10, TxFlags::NONE, Some(fail_invalid), Some(count_failed_uninit)),
        stub("fallback", 0, TxFlags::NONE, None, None),
    ]);
    let mut p = parent();
    request(&reg, &mut p, 8).unwrap();
    assert_eq!(FAILED_UNINITS.load(Ordering::SeqCst), 1);
}

fn rotate_map(ctx: &mut TxContext<f32>, _: &InitArgs<'_, f32>) -> Result<(), TxError> {
    let len = ctx.len;
    ctx.map = (0..len).map(|i| (i + 1) % len).collect();
    ctx.map_dir = MapDirection::Gather;
    Ok(())
}

#[test]
fn test_map_is_turned_to_requested_direction() {
    let reg = registry(vec![stub(
        "rotate",
        0,
        TxFlags::PRESHUFFLE,
        Some(rotate_map),
        None,
    )]);
    let mut p = parent();
    let scatter = CodeletOptions::new(MapDirection::Scatter);
    let gather = CodeletOptions::new(MapDirection::Gather);
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::PRESHUFFLE, Some(&scatter), 3, false, None)
        .unwrap();
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::PRESHUFFLE, Some(&gather), 3, false, None)
        .unwrap();

    assert_eq!(p.subs()[0].map(), &[2, 0, 1]);
    assert_eq!(p.subs()[0].map_direction(), MapDirection::Scatter);
    assert_eq!(p.subs()[1].map(), &[1, 2, 0]);
    assert_eq!(p.subs()[1].map_direction(), MapDirection::Gather);
}

#[test]
fn test_missing_map_becomes_identity() {
    let reg = registry(vec![stub("plain", 0, TxFlags::NONE, None, None)]);
    let mut p = parent();
    let scatter = CodeletOptions::new(MapDirection::Scatter);
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::NONE, Some(&scatter), 4, false, None)
        .unwrap();
    assert_eq!(p.subs()[0].map(), &[0, 1, 2, 3]);
    assert_eq!(p.subs()[0].map_direction(), MapDirection::Scatter);

    request(&reg, &mut p, 4).unwrap();
    assert!(p.subs()[1].map().is_empty());
    assert_eq!(p.subs()[1].map_direction(), MapDirection::None);
}

#[test]
fn test_private_map_of_unshuffled_node_is_kept() {
    let reg = registry(vec![stub("private", 0, TxFlags::NONE, Some(rotate_map), None)]);
    let mut p = parent();
    let scatter = CodeletOptions::new(MapDirection::Scatter);
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::NONE, Some(&scatter), 3, false, None)
        .unwrap();
    assert_eq!(p.subs()[0].map(), &[1, 2, 0]);
    assert_eq!(p.subs()[0].map_direction(), MapDirection::Gather);
}

/// Walks two trees in step and checks every node made the same choices.
fn assert_same_tree(a: &TxContext<f32>, b: &TxContext<f32>, what: &str) {
    assert_eq!(a.codelet_name(), b.codelet_name(), "{}: codelet", what);
    assert_eq!(a.len(), b.len(), "{}: len", what);
    assert_eq!(a.flags(), b.flags(), "{}: flags", what);
    assert_eq!(a.map(), b.map(), "{}: map", what);
    assert_eq!(a.map_direction(), b.map_direction(), "{}: map direction", what);
    assert_eq!(a.subs().len(), b.subs().len(), "{}: subs", what);
    for (sa, sb) in a.subs().iter().zip(b.subs()) {
        assert_same_tree(sa, sb, what);
    }
}

#[test]
fn test_selection_is_deterministic() {
    let reg = TxRegistry::<f32>::with_cpu_flags(CpuFlags::NONE);
    let gather = CodeletOptions::new(MapDirection::Gather);
    let scatter = CodeletOptions::new(MapDirection::Scatter);
    let fft_requests = [
        (TxFlags::OUT_OF_PLACE, None),
        (TxFlags::INPLACE, None),
        (TxFlags::OUT_OF_PLACE, Some(&scatter)),
        (TxFlags::INPLACE | TxFlags::PRESHUFFLE, Some(&scatter)),
        (TxFlags::OUT_OF_PLACE | TxFlags::PRESHUFFLE, Some(&gather)),
    ];

    let mut built = 0;
    for len in [1usize, 2, 8, 15, 30, 45, 60, 64, 97, 120, 1000] {
        for inverse in [false, true] {
            for (flags, opts) in fft_requests {
                let ty = TxType::FloatFft;
                let mut a = parent();
                let mut b = parent();
                let ra = init_subtx(&mut a, &reg, ty, flags, opts, len, inverse, None);
                let rb = init_subtx(&mut b, &reg, ty, flags, opts, len, inverse, None);
                let what = alloc::format!("len {} inv {} {:?} {:?}", len, inverse, flags, opts);
                assert_eq!(ra, rb, "{}", what);
                if ra.is_ok() {
                    assert_same_tree(&a.subs()[0], &b.subs()[0], &what);
                    built += 1;
                }
            }
        }
    }
    assert!(built >= 44, "only {} trees built", built);

    for ty in [TxType::FloatMdct, TxType::FloatRdft, TxType::FloatDct, TxType::FloatDctI] {
        for inverse in [false, true] {
            let mut a = parent();
            let mut b = parent();
            let scale = Some(1.0);
            init_subtx(&mut a, &reg, ty, TxFlags::OUT_OF_PLACE, None, 60, inverse, scale).unwrap();
            init_subtx(&mut b, &reg, ty, TxFlags::OUT_OF_PLACE, None, 60, inverse, scale).unwrap();
            assert_same_tree(&a.subs()[0], &b.subs()[0], &alloc::format!("{:?}", ty));
        }
    }
}

#[test]
fn test_real_registry_tree_shapes() {
    let reg = TxRegistry::<f32>::with_cpu_flags(CpuFlags::NONE);
    let mut p = parent();
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::OUT_OF_PLACE, None, 64, false, None)
        .unwrap();
    let mut names = Vec::new();
    tree_names(&p.subs()[0], &mut names);
    assert_eq!(names, vec![("fft", 64), ("fft64_ns", 64)]);

    let mut p = parent();
    init_subtx(&mut p, &reg, TxType::FloatFft, TxFlags::OUT_OF_PLACE, None, 1, false, None)
        .unwrap();
    assert_eq!(p.subs()[0].codelet_name(), Some("null"));
}

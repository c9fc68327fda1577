// src/engine/score.rs

use super::codelet::CodeletDescriptor;
use crate::common::TxFlags;
use crate::cpu::CpuFlags;
use crate::sample::TxSample;

const BONUS: i32 = 64;

/// Ranking heuristic for a codelet handling `len` on a host with `cpu_flags`.
pub fn codelet_priority<T: TxSample>(
    cd: &CodeletDescriptor<T>,
    cpu_flags: CpuFlags,
    len: usize,
) -> i32 {
    let mut prio = cd.prio - cpu_flags.slow_penalty(cd.cpu_flags);

    // Aligned-only codelets skip the runtime alignment branches.
    if cd.flags.contains(TxFlags::ALIGNED) && !cd.flags.contains(TxFlags::UNALIGNED) {
        prio += BONUS;
    }

    if len == cd.min_len && cd.max_len == Some(len) {
        prio += BONUS;
    }

    if cd.flags.intersects(TxFlags::FORWARD_ONLY | TxFlags::INVERSE_ONLY) {
        prio += BONUS;
    }

    prio + 16 * cd.max_factor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{PRIO_BASE, TxKind};
    use crate::engine::codelet::{CodeletType, Factor, TxIo};
    use crate::engine::context::TxContext;

    fn noop(_: &mut TxContext<f64>, _: TxIo<'_, f64>, _: usize) {}

    fn descriptor(flags: TxFlags, factors: &'static [Factor]) -> CodeletDescriptor<f64> {
        CodeletDescriptor {
            name: "stub",
            ty: CodeletType::Kind(TxKind::Fft),
            factors,
            nb_factors: 1,
            min_len: 8,
            max_len: Some(8),
            flags,
            cpu_flags: CpuFlags::ALL,
            prio: PRIO_BASE,
            init: None,
            uninit: None,
            function: noop,
        }
    }

    #[test]
    fn test_bonuses() {
        let cd = descriptor(TxFlags::UNALIGNED, &[Factor::Any]);
        assert_eq!(codelet_priority(&cd, CpuFlags::NONE, 16), 0);
        // exact length match
        assert_eq!(codelet_priority(&cd, CpuFlags::NONE, 8), 64);

        let aligned = descriptor(TxFlags::ALIGNED, &[Factor::Any]);
        assert_eq!(codelet_priority(&aligned, CpuFlags::NONE, 16), 64);

        let both = descriptor(TxFlags::ALIGNED | TxFlags::UNALIGNED, &[Factor::Any]);
        assert_eq!(codelet_priority(&both, CpuFlags::NONE, 16), 0);

        let fwd = descriptor(TxFlags::FORWARD_ONLY, &[Factor::Of(2)]);
        assert_eq!(codelet_priority(&fwd, CpuFlags::NONE, 16), 64 + 32);
    }

    #[test]
    fn test_largest_of_first_four_factors() {
        let cd = descriptor(
            TxFlags::UNALIGNED,
            &[Factor::Of(2), Factor::Of(5), Factor::Of(3), Factor::Any, Factor::Of(9)],
        );
        assert_eq!(codelet_priority(&cd, CpuFlags::NONE, 16), 16 * 5);
    }

    #[test]
    fn test_slow_cpu_penalty() {
        let mut cd = descriptor(TxFlags::UNALIGNED, &[Factor::Any]);
        cd.cpu_flags = CpuFlags::AVX | CpuFlags::AVXSLOW;
        let fast = codelet_priority(&cd, CpuFlags::AVX, 16);
        let slow = codelet_priority(&cd, CpuFlags::AVX | CpuFlags::AVXSLOW, 16);
        assert_eq!(fast - slow, 129);
    }
}

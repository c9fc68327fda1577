// src/cpu.rs

use core::ops::{BitAnd, BitOr};

/// CPU capability mask, used both for the host and for codelet requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuFlags(u32);

impl CpuFlags {
    /// As a codelet requirement: runs on any CPU.
    pub const ALL: Self = Self(0);
    /// As a host mask: no optional features.
    pub const NONE: Self = Self(0);

    pub const MMX: Self = Self(0x0001);
    pub const MMXEXT: Self = Self(0x0002);
    pub const SSE: Self = Self(0x0008);
    pub const SSE2: Self = Self(0x0010);
    pub const SSE3: Self = Self(0x0040);
    pub const SSSE3: Self = Self(0x0080);
    pub const SSE4: Self = Self(0x0100);
    pub const SSE42: Self = Self(0x0200);
    pub const AVX: Self = Self(0x4000);
    pub const AVX2: Self = Self(0x8000);
    pub const FMA3: Self = Self(0x10000);
    pub const AVX512: Self = Self(0x100000);

    pub const SSE2SLOW: Self = Self(0x40000000);
    pub const SSE3SLOW: Self = Self(0x20000000);
    pub const SSSE3SLOW: Self = Self(0x4000000);
    pub const ATOM: Self = Self(0x10000000);
    pub const AVXSLOW: Self = Self(0x8000000);
    pub const SLOW_GATHER: Self = Self(0x2000000);

    /// Bits that mark a feature as present but slow.
    pub const SLOW_MASK: Self = Self(
        Self::SSE2SLOW.0
            | Self::SSE3SLOW.0
            | Self::SSSE3SLOW.0
            | Self::ATOM.0
            | Self::AVXSLOW.0
            | Self::SLOW_GATHER.0,
    );

    const SLOW_PENALTIES: [(CpuFlags, i32); 6] = [
        (CpuFlags::SSE2SLOW, 1 + 64),
        (CpuFlags::SSE3SLOW, 1 + 64),
        (CpuFlags::SSSE3SLOW, 1 + 64),
        (CpuFlags::ATOM, 1 + 128),
        (CpuFlags::AVXSLOW, 1 + 128),
        (CpuFlags::SLOW_GATHER, 1 + 32),
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Features of the running CPU.
    pub fn host() -> Self {
        #[cfg(all(feature = "std", any(target_arch = "x86", target_arch = "x86_64")))]
        {
            let mut flags = CpuFlags::NONE;
            let table = [
                (std::is_x86_feature_detected!("sse"), CpuFlags::SSE),
                (std::is_x86_feature_detected!("sse2"), CpuFlags::SSE2),
                (std::is_x86_feature_detected!("sse3"), CpuFlags::SSE3),
                (std::is_x86_feature_detected!("ssse3"), CpuFlags::SSSE3),
                (std::is_x86_feature_detected!("sse4.1"), CpuFlags::SSE4),
                (std::is_x86_feature_detected!("sse4.2"), CpuFlags::SSE42),
                (std::is_x86_feature_detected!("avx"), CpuFlags::AVX),
                (std::is_x86_feature_detected!("avx2"), CpuFlags::AVX2),
                (std::is_x86_feature_detected!("fma"), CpuFlags::FMA3),
                (std::is_x86_feature_detected!("avx512f"), CpuFlags::AVX512),
            ];
            for (present, flag) in table {
                if present {
                    flags = flags | flag;
                }
            }
            log::trace!("host cpu flags: {:#x}", flags.0);
            flags
        }

        #[cfg(not(all(feature = "std", any(target_arch = "x86", target_arch = "x86_64"))))]
        {
            CpuFlags::NONE
        }
    }

    /// Whether code requiring `required` may run on this host.
    /// Slow-path bits alone never make a requirement satisfiable.
    #[inline]
    pub fn supports(self, required: CpuFlags) -> bool {
        required == CpuFlags::ALL || self.0 & (required.0 & !Self::SLOW_MASK.0) != 0
    }

    /// Priority penalty for `required` on this host.
    pub fn slow_penalty(self, required: CpuFlags) -> i32 {
        Self::SLOW_PENALTIES
            .iter()
            .filter(|(slow, _)| (self & required).intersects(*slow))
            .map(|(_, penalty)| penalty)
            .sum()
    }
}

impl BitOr for CpuFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for CpuFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

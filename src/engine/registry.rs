// src/engine/registry.rs

use alloc::vec;
use alloc::vec::Vec;

use super::codelet::CodeletDescriptor;
use crate::codelets;
use crate::cpu::CpuFlags;
use crate::sample::TxSample;

/// A named, ordered group of codelets.
pub struct CodeletList<T: TxSample> {
    pub name: &'static str,
    pub codelets: Vec<CodeletDescriptor<T>>,
}

impl<T: TxSample> CodeletList<T> {
    pub fn new(name: &'static str, codelets: Vec<CodeletDescriptor<T>>) -> Self {
        Self { name, codelets }
    }
}

/// Immutable set of codelets for one numeric domain, plus the CPU snapshot
/// they are filtered against. Built once and shared by every initialization.
pub struct TxRegistry<T: TxSample> {
    lists: Vec<CodeletList<T>>,
    cpu_flags: CpuFlags,
}

impl<T: TxSample> TxRegistry<T> {
    /// The built-in codelets, filtered against the host CPU.
    pub fn new() -> Self {
        Self::with_cpu_flags(CpuFlags::host())
    }

    pub fn with_cpu_flags(cpu_flags: CpuFlags) -> Self {
        Self::from_lists(
            vec![
                CodeletList::new("null", codelets::null_list()),
                CodeletList::new("c", codelets::c_list()),
            ],
            cpu_flags,
        )
    }

    /// Scan order is list order, then descriptor order within a list.
    pub fn from_lists(lists: Vec<CodeletList<T>>, cpu_flags: CpuFlags) -> Self {
        log::debug!(
            "codelet registry: {} lists, {} codelets, cpu {:#x}",
            lists.len(),
            lists.iter().map(|l| l.codelets.len()).sum::<usize>(),
            cpu_flags.bits()
        );
        Self { lists, cpu_flags }
    }

    #[inline]
    pub fn cpu_flags(&self) -> CpuFlags {
        self.cpu_flags
    }

    pub fn lists(&self) -> &[CodeletList<T>] {
        &self.lists
    }

    pub fn codelets(&self) -> impl Iterator<Item = &CodeletDescriptor<T>> {
        self.lists.iter().flat_map(|list| list.codelets.iter())
    }

    pub fn find(&self, name: &str) -> Option<&CodeletDescriptor<T>> {
        self.codelets().find(|cd| cd.name == name)
    }
}

impl<T: TxSample> Default for TxRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

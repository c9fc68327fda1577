// src/engine/compose.rs

use alloc::vec::Vec;

use super::codelet::{CodeletDescriptor, CodeletOptions, InitArgs, MapDirection};
use super::context::{TxContext, try_alloc};
use super::decompose::check_factors;
use super::registry::TxRegistry;
use super::score::codelet_priority;
use crate::common::{TX_MAX_SUB, TxError, TxFlags, TxType};
use crate::sample::TxSample;

/// Flags a codelet may only carry when the request carries them too.
const EXCLUSIVE_FLAGS: TxFlags = TxFlags::FULL_IMDCT
    .union(TxFlags::REAL_TO_REAL)
    .union(TxFlags::REAL_TO_IMAGINARY)
    .union(TxFlags::PRESHUFFLE)
    .union(TxFlags::ASM_CALL);

fn normalize_flags(mut flags: TxFlags) -> TxFlags {
    // An aligned buffer also satisfies unaligned codelets.
    if flags.contains(TxFlags::ALIGNED) {
        flags.insert(TxFlags::UNALIGNED);
    }
    // Both requested means either is fine.
    if flags.contains(TxFlags::INPLACE | TxFlags::OUT_OF_PLACE) {
        flags.remove(TxFlags::INPLACE | TxFlags::OUT_OF_PLACE);
    }
    if flags.contains(TxFlags::ALIGNED | TxFlags::UNALIGNED) {
        flags.remove(TxFlags::ALIGNED | TxFlags::UNALIGNED);
    }
    flags
}

fn flags_compatible(requested: TxFlags, provided: TxFlags) -> bool {
    provided.contains(requested) && (provided & EXCLUSIVE_FLAGS) == (requested & EXCLUSIVE_FLAGS)
}

/// Finds the best codelet for the request, initializes it and attaches the
/// resulting node to `parent`. Candidates are tried in priority order; a
/// failed candidate is torn down and the next one tried, except on
/// `OutOfMemory`, which ends the search.
#[allow(clippy::too_many_arguments)]
pub fn init_subtx<T: TxSample>(
    parent: &mut TxContext<T>,
    registry: &TxRegistry<T>,
    ty: TxType,
    flags: TxFlags,
    opts: Option<&CodeletOptions>,
    len: usize,
    inverse: bool,
    scale: Option<T::Scale>,
) -> Result<(), TxError> {
    if len == 0 {
        return Err(TxError::InvalidArgument);
    }
    if parent.sub.len() >= TX_MAX_SUB {
        return Err(TxError::InvalidArgument);
    }

    let flags = normalize_flags(flags);
    let cpu_flags = registry.cpu_flags();

    let mut candidates: Vec<(i32, &CodeletDescriptor<T>)> = Vec::new();
    for cd in registry.codelets() {
        let rejected = if !cd.ty.matches(ty) {
            "type"
        } else if cd.rejects_direction(inverse) {
            "direction"
        } else if !flags_compatible(flags, cd.flags) {
            "flags"
        } else if !cd.supports_len(len) {
            "length"
        } else if !cpu_flags.supports(cd.cpu_flags) {
            "cpu"
        } else if !check_factors(cd, len) {
            "factors"
        } else {
            ""
        };
        if !rejected.is_empty() {
            if rejected != "type" {
                log::trace!("{:?} len {}: skip {} ({})", ty, len, cd.name, rejected);
            }
            continue;
        }
        candidates.try_reserve(1)?;
        candidates.push((codelet_priority(cd, cpu_flags, len), cd));
    }

    if candidates.is_empty() {
        log::trace!("{:?} len {} inv {}: no codelet", ty, len, inverse);
        return Err(TxError::NotSupported);
    }

    // Stable, so equal priorities keep scan order.
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    if parent.sub.capacity() == 0 {
        parent.sub.try_reserve_exact(TX_MAX_SUB)?;
    }

    let mut result = Err(TxError::NotSupported);
    for (prio, cd) in candidates {
        let mut node = TxContext::new(ty, inverse, len, cd.flags | flags, scale);
        node.cd_self = Some(*cd);
        node.func = Some(cd.function);

        let args = InitArgs {
            registry,
            codelet: cd,
            flags,
            opts: opts.copied(),
            len,
            inverse,
            scale,
        };

        let attempt = match cd.init {
            Some(init) => init(&mut node, &args),
            None => Ok(()),
        }
        .and_then(|()| reconcile_map(&mut node, opts));

        match attempt {
            Ok(()) => {
                log::debug!(
                    "{:?} len {} inv {}: selected {} (prio {})",
                    ty,
                    len,
                    inverse,
                    cd.name,
                    prio
                );
                parent.sub.push(node);
                return Ok(());
            }
            Err(err) => {
                log::trace!("{:?} len {}: {} failed: {}", ty, len, cd.name, err);
                node.reset(true);
                result = Err(err);
                if err.is_fatal() {
                    break;
                }
            }
        }
    }

    if parent.sub.is_empty() {
        parent.sub = Vec::new();
    }
    result
}

/// Gives the node a map in the direction the parent asked for: an identity
/// map when the codelet built none, the inverse permutation when it built
/// the other direction. Maps of nodes that take unshuffled input are private
/// working state and are left alone.
fn reconcile_map<T: TxSample>(
    node: &mut TxContext<T>,
    opts: Option<&CodeletOptions>,
) -> Result<(), TxError> {
    let wanted = match opts {
        Some(o) if o.map_dir != MapDirection::None => o.map_dir,
        _ => return Ok(()),
    };
    let len = node.len;

    if node.map.is_empty() {
        let mut map = try_alloc::<usize>(len)?;
        for (i, slot) in map.iter_mut().enumerate() {
            *slot = i;
        }
        node.map = map;
    } else if !node.flags.contains(TxFlags::PRESHUFFLE) {
        return Ok(());
    } else if node.map_dir != MapDirection::None && node.map_dir != wanted {
        if node.map.len() < len {
            return Err(TxError::InvalidArgument);
        }
        let mut tmp = try_alloc::<usize>(len)?;
        tmp.copy_from_slice(&node.map[..len]);
        for (i, &src) in tmp.iter().enumerate() {
            node.map[src] = i;
        }
    }
    node.map_dir = wanted;
    Ok(())
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;

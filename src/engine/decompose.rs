// src/engine/decompose.rs

use alloc::vec::Vec;

use super::codelet::{CodeletDescriptor, Factor};
use super::registry::TxRegistry;
use super::score::codelet_priority;
use crate::common::{TX_MAX_DECOMPOSITIONS, TX_MAX_FACTORS, TxError, TxType};
use crate::math::gcd;
use crate::sample::TxSample;

/// One way of splitting a length: a codelet handles `consumed`, the rest is `remainder`.
#[derive(Debug, Clone, Copy)]
pub struct LengthDecomposition<'r, T: TxSample> {
    pub consumed: usize,
    pub remainder: usize,
    pub priority: i64,
    pub codelet: &'r CodeletDescriptor<T>,
}

/// Splits `len` into coprime `(consumed, remainder)` pairs that a single
/// codelet can take on, highest priority first. Each consumed length is listed once.
pub fn decompose_length<T: TxSample>(
    registry: &TxRegistry<T>,
    ty: TxType,
    len: usize,
    inverse: bool,
) -> Result<Vec<LengthDecomposition<'_, T>>, TxError> {
    let cpu_flags = registry.cpu_flags();
    let mut found: Vec<LengthDecomposition<'_, T>> = Vec::new();

    for cd in registry.codelets() {
        if found.len() >= TX_MAX_DECOMPOSITIONS {
            break;
        }
        if !cd.ty.matches(ty) || cd.rejects_direction(inverse) || !cpu_flags.supports(cd.cpu_flags)
        {
            continue;
        }

        let mut remainder = len;
        let mut product = 1usize;
        let mut matched = 0usize;
        for factor in cd.factors.iter().take(TX_MAX_FACTORS) {
            if remainder == 1 {
                break;
            }
            match *factor {
                Factor::Of(0) => break,
                Factor::Any => {
                    matched += 1;
                    product *= remainder;
                }
                Factor::Of(f) if remainder % f == 0 => {
                    matched += 1;
                    if f == 2 {
                        let bits = remainder.trailing_zeros();
                        remainder >>= bits;
                        product <<= bits;
                    } else {
                        while remainder % f == 0 {
                            remainder /= f;
                            product *= f;
                        }
                    }
                }
                Factor::Of(_) => {}
            }
        }

        // Not enough factors, or the codelet would take the whole length.
        if matched < cd.nb_factors || product == len {
            continue;
        }
        if gcd(product, remainder) != 1 || !cd.supports_len(product) {
            continue;
        }

        let priority = codelet_priority(cd, cpu_flags, product) as i64 * product as i64;
        if let Some(existing) = found.iter_mut().find(|d| d.consumed == product) {
            existing.priority = existing.priority.max(priority);
            continue;
        }

        log::trace!(
            "decompose {}: {} x {} via {} (prio {})",
            len,
            product,
            remainder,
            cd.name,
            priority
        );
        found.try_reserve(1)?;
        found.push(LengthDecomposition {
            consumed: product,
            remainder,
            priority,
            codelet: cd,
        });
    }

    if found.is_empty() {
        return Err(TxError::InvalidArgument);
    }

    found.sort_by(|a, b| b.priority.cmp(&a.priority));
    Ok(found)
}

/// Whether `cd` can consume exactly `len` with its declared factors.
pub fn check_factors<T: TxSample>(cd: &CodeletDescriptor<T>, len: usize) -> bool {
    let mut len = len;
    let mut matches = 0usize;
    let mut any = false;

    for factor in cd.factors.iter().take(TX_MAX_FACTORS) {
        match *factor {
            Factor::Any => {
                any = true;
                matches += 1;
            }
            _ if len <= 1 => break,
            Factor::Of(0) => break,
            Factor::Of(2) => {
                let bits = len.trailing_zeros();
                if bits == 0 {
                    continue;
                }
                len >>= bits;
                matches += 1;
            }
            Factor::Of(f) => {
                if len % f != 0 {
                    continue;
                }
                while len % f == 0 {
                    len /= f;
                }
                matches += 1;
            }
        }
    }

    cd.nb_factors <= matches && (any || len == 1)
}

#[cfg(test)]
#[path = "decompose_tests.rs"]
mod tests;

#![no_std]

//! Transform composition engine: FFT, MDCT, RDFT and DCT families built from
//! a registry of codelets, chosen by priority and composed into trees.
//!
//! ```ignore
//! use simple_tx::{Tx, TxFlags, TxRegistry, TxType};
//!
//! let registry = TxRegistry::<f32>::new();
//! let mut tx = Tx::new(&registry, TxType::FloatFft, false, 16, None, TxFlags::NONE)?;
//! tx.transform(&mut out, &input, 1)?;
//! ```

extern crate alloc;

// Enables the standard library for tests and the `std` feature,
// so you can run 'cargo test' on your PC normally.
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod common;
pub mod cpu;
pub mod engine;
pub mod fixed;
pub mod sample;
pub mod tx;

mod codelets;
mod math;

pub use common::{Domain, TxError, TxFlags, TxKind, TxType};
pub use cpu::CpuFlags;
pub use engine::{TxContext, TxRegistry};
pub use fixed::{ComplexFixed, Fixed, Q31};
pub use sample::{TxComplex, TxSample};
pub use tx::Tx;

//! Codelet selection, composition and teardown.

pub mod codelet;
pub mod compose;
pub mod context;
pub mod decompose;
pub mod maps;
pub mod registry;
pub mod score;

pub use codelet::{
    CodeletDescriptor, CodeletOptions, CodeletType, Factor, InitArgs, InitFn, MapDirection, TxFn,
    TxIo, UninitFn,
};
pub use compose::init_subtx;
pub use context::TxContext;
pub use decompose::{LengthDecomposition, check_factors, decompose_length};
pub use registry::{CodeletList, TxRegistry};
pub use score::codelet_priority;

mod complex;
mod value;

pub use complex::ComplexFixed;
pub use value::{Fixed, Q31};

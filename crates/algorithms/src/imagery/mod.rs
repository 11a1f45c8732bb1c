//! Cell-wise imagery operations
//!
//! - Band math: apply a scalar function to every valid cell
//! - Reclassify: map value ranges to class codes

mod band_math;
mod reclassify;

pub use band_math::band_math;
pub use reclassify::{reclassify, ReclassEntry, ReclassifyParams};

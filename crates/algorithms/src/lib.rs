//! # RiskMap Algorithms
//!
//! Raster algorithms behind the environmental suitability index.
//!
//! ## Modules
//!
//! - **suitability**: range normalization, weighted composition, the risk model
//! - **temporal**: mean/sum reduction of scene stacks over a period
//! - **clip**: region clipping by bounding box or mask
//! - **imagery**: band math and reclassification

pub mod clip;
pub mod imagery;
pub mod suitability;
pub mod temporal;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clip::{clip_to_bounds, clip_to_mask, Bounds};
    pub use crate::imagery::{band_math, reclassify, ReclassEntry, ReclassifyParams};
    pub use crate::suitability::{
        composite, normalize, DataWarning, NormalizationBand, RiskAssessment, RiskConfig,
        RiskInputs, RiskModel, Variable, WeightPolicy, Weights,
    };
    pub use crate::temporal::{aggregate, Aggregation};
    pub use riskmap_core::prelude::*;
}

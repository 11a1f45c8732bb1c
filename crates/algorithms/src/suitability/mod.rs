//! Environmental suitability index
//!
//! Three raw layers (land surface temperature, vegetation index, cumulative
//! rainfall) are mapped onto [0, 1] with a [`NormalizationBand`] each, then
//! fused with [`Weights`] into a composite index clamped to [0, 1]:
//!
//! ```text
//! s_x   = clamp((x - min_x) / (max_x - min_x), 0, 1)
//! index = clamp(w_t * s_t + w_v * s_v + w_r * s_r, 0, 1)
//! ```
//!
//! [`RiskModel`] wraps both stages behind a validated [`RiskConfig`].

mod band;
mod composite;
mod model;
mod normalize;
mod weights;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use band::{NormalizationBand, MIN_BAND_WIDTH};
pub use composite::{composite, CompositeParams, IndexCompositor, SuitabilityLayers};
pub use model::{DataWarning, RiskAssessment, RiskConfig, RiskInputs, RiskModel};
pub use normalize::{normalize, RangeNormalizer};
pub use weights::{WeightPolicy, Weights, WEIGHT_SUM_TOLERANCE};

/// The environmental variables contributing to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Land surface temperature, degrees Celsius
    Temperature,
    /// Vegetation index (NDVI)
    Vegetation,
    /// Cumulative rainfall, millimetres
    Rainfall,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Self::Temperature, Self::Vegetation, Self::Rainfall];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Vegetation => "vegetation",
            Self::Rainfall => "rainfall",
        }
    }

    /// Physical unit of the raw layer
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Vegetation => "NDVI",
            Self::Rainfall => "mm",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

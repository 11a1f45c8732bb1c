//! Range normalizer: physical layer to [0, 1] suitability

use riskmap_core::raster::Raster;
use riskmap_core::{Algorithm, Error, Result};

use super::NormalizationBand;
use crate::imagery::band_math;

/// Normalize a raw layer with the band `[min, max]`.
///
/// Every defined cell becomes `clamp((x - min) / (max - min), 0, 1)`;
/// nodata cells stay nodata. An invalid band is a configuration error and
/// no output is produced.
///
/// # Example
/// ```ignore
/// let s_temp = normalize(&lst_celsius, 18.0, 32.0)?;
/// ```
pub fn normalize(raster: &Raster<f64>, min: f64, max: f64) -> Result<Raster<f64>> {
    NormalizationBand::new(min, max)?.apply(raster)
}

impl NormalizationBand {
    /// Normalize every defined cell of `raster` with this band
    pub fn apply(&self, raster: &Raster<f64>) -> Result<Raster<f64>> {
        let band = *self;
        band_math(raster, move |v| band.scale(v))
    }
}

/// [`Algorithm`] front-end for the range normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeNormalizer;

impl Algorithm for RangeNormalizer {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = NormalizationBand;
    type Error = Error;

    fn name(&self) -> &'static str {
        "range-normalizer"
    }

    fn description(&self) -> &'static str {
        "Linear mapping of a physical value band onto [0, 1], clamped outside the band"
    }

    fn execute(&self, input: Raster<f64>, params: NormalizationBand) -> Result<Raster<f64>> {
        params.apply(&input)
    }
}

//! Validated configuration and the two-stage risk pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use riskmap_core::raster::Raster;
use riskmap_core::Result;
use tracing::{debug, warn};

use super::composite::{check_grids, weighted_sum};
use super::{NormalizationBand, Variable, WeightPolicy, Weights};

/// Normalization bands, weights and weight policy of one index.
///
/// `Default` gives the malaria suitability settings: temperature
/// [18, 32] °C, NDVI [0.20, 0.80], rainfall [0, 300] mm, weighted
/// 0.4 / 0.3 / 0.3 under the strict policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub temperature: NormalizationBand,
    pub vegetation: NormalizationBand,
    pub rainfall: NormalizationBand,
    pub weights: Weights,
    pub weight_policy: WeightPolicy,
}

impl RiskConfig {
    /// Band of one variable
    pub fn band(&self, variable: Variable) -> NormalizationBand {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Vegetation => self.vegetation,
            Variable::Rainfall => self.rainfall,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            temperature: NormalizationBand::temperature(),
            vegetation: NormalizationBand::vegetation(),
            rainfall: NormalizationBand::rainfall(),
            weights: Weights::default(),
            weight_policy: WeightPolicy::default(),
        }
    }
}

/// Raw physical layers, already clipped to the region and in physical units
#[derive(Debug, Clone, Copy)]
pub struct RiskInputs<'a> {
    pub temperature: &'a Raster<f64>,
    pub vegetation: &'a Raster<f64>,
    pub rainfall: &'a Raster<f64>,
}

impl<'a> RiskInputs<'a> {
    pub fn layer(&self, variable: Variable) -> &'a Raster<f64> {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Vegetation => self.vegetation,
            Variable::Rainfall => self.rainfall,
        }
    }
}

/// A data problem that does not stop the run.
///
/// Affected cells are nodata in the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    /// No scene of the variable fell inside the requested period
    NoScenes { variable: Variable },
    /// The layer holds no valid cell over the region
    EmptyLayer { variable: Variable },
    /// Every layer has data, but no cell has all three
    NoOverlap,
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScenes { variable } => {
                write!(f, "no {} scenes in the requested period", variable)
            }
            Self::EmptyLayer { variable } => {
                write!(f, "{} layer has no valid cells over the region", variable)
            }
            Self::NoOverlap => f.write_str("no cell has valid data in all three layers"),
        }
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub temperature: Raster<f64>,
    pub vegetation: Raster<f64>,
    pub rainfall: Raster<f64>,
    /// Composite index in [0, 1]
    pub index: Raster<f64>,
    pub warnings: Vec<DataWarning>,
}

impl RiskAssessment {
    /// Normalized layer of one variable
    pub fn suitability(&self, variable: Variable) -> &Raster<f64> {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::Vegetation => &self.vegetation,
            Variable::Rainfall => &self.rainfall,
        }
    }
}

/// The normalize-then-composite pipeline over a validated configuration
#[derive(Debug, Clone)]
pub struct RiskModel {
    config: RiskConfig,
}

impl RiskModel {
    /// Validate `config` once; the model cannot be built from invalid settings.
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.weights.validate(config.weight_policy)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Run both stages on three raw layers.
    ///
    /// Grid alignment is checked before any cell is computed. Layers with
    /// no valid data are reported as [`DataWarning`]s, not errors.
    pub fn evaluate(&self, inputs: &RiskInputs<'_>) -> Result<RiskAssessment> {
        check_grids(inputs.temperature, inputs.vegetation, inputs.rainfall)?;

        let mut warnings = Vec::new();
        for variable in Variable::ALL {
            if !inputs.layer(variable).has_valid_data() {
                warn!(%variable, "layer has no valid cells; index will be nodata");
                warnings.push(DataWarning::EmptyLayer { variable });
            }
        }

        let temperature = self.config.temperature.apply(inputs.temperature)?;
        let vegetation = self.config.vegetation.apply(inputs.vegetation)?;
        let rainfall = self.config.rainfall.apply(inputs.rainfall)?;
        debug!("normalized temperature, vegetation and rainfall layers");

        let index = weighted_sum(&temperature, &vegetation, &rainfall, &self.config.weights)?;

        if warnings.is_empty() && !index.has_valid_data() {
            warn!("layers do not overlap; index has no valid cells");
            warnings.push(DataWarning::NoOverlap);
        }
        debug!(valid = index.valid_count(), cells = index.len(), "composite index computed");

        Ok(RiskAssessment {
            temperature,
            vegetation,
            rainfall,
            index,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskmap_core::{Error, GeoTransform};

    fn grid(value: f64) -> Raster<f64> {
        let mut r = Raster::filled(4, 4, value);
        r.set_transform(GeoTransform::new(60.0, 37.0, 0.01, -0.01));
        r
    }

    #[test]
    fn default_config_is_valid() {
        assert!(RiskModel::new(RiskConfig::default()).is_ok());
    }

    #[test]
    fn strict_config_with_bad_weights_fails_at_construction() {
        let config = RiskConfig {
            weights: Weights::new(0.4, 0.4, 0.4),
            ..RiskConfig::default()
        };
        assert!(matches!(RiskModel::new(config), Err(Error::InvalidWeights(_))));
    }

    #[test]
    fn lenient_config_with_bad_weights_builds() {
        let config = RiskConfig {
            weights: Weights::new(0.4, 0.4, 0.4),
            weight_policy: WeightPolicy::Lenient,
            ..RiskConfig::default()
        };
        assert!(RiskModel::new(config).is_ok());
    }

    #[test]
    fn evaluates_midpoint_scenario() {
        let model = RiskModel::new(RiskConfig::default()).unwrap();
        let (t, v, r) = (grid(25.0), grid(0.50), grid(150.0));
        let result = model
            .evaluate(&RiskInputs {
                temperature: &t,
                vegetation: &v,
                rainfall: &r,
            })
            .unwrap();

        assert_relative_eq!(result.temperature.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.vegetation.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.rainfall.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.index.get(3, 3).unwrap(), 0.5, epsilon = 1e-12);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_layer_is_a_warning() {
        let model = RiskModel::new(RiskConfig::default()).unwrap();
        let (t, v, r) = (grid(25.0), grid(f64::NAN), grid(150.0));
        let result = model
            .evaluate(&RiskInputs {
                temperature: &t,
                vegetation: &v,
                rainfall: &r,
            })
            .unwrap();

        assert_eq!(
            result.warnings,
            vec![DataWarning::EmptyLayer {
                variable: Variable::Vegetation
            }]
        );
        assert_eq!(result.index.valid_count(), 0);
    }

    #[test]
    fn disjoint_layers_report_no_overlap() {
        let model = RiskModel::new(RiskConfig::default()).unwrap();
        let mut t = grid(25.0);
        let mut v = grid(0.5);
        let r = grid(150.0);
        for row in 0..4 {
            for col in 0..4 {
                if col < 2 {
                    t.set(row, col, f64::NAN).unwrap();
                } else {
                    v.set(row, col, f64::NAN).unwrap();
                }
            }
        }
        let result = model
            .evaluate(&RiskInputs {
                temperature: &t,
                vegetation: &v,
                rainfall: &r,
            })
            .unwrap();
        assert_eq!(result.warnings, vec![DataWarning::NoOverlap]);
    }

    #[test]
    fn misaligned_inputs_abort() {
        let model = RiskModel::new(RiskConfig::default()).unwrap();
        let t = grid(25.0);
        let v = grid(0.5);
        let r = Raster::filled(4, 5, 150.0);
        let err = model
            .evaluate(&RiskInputs {
                temperature: &t,
                vegetation: &v,
                rainfall: &r,
            })
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn warning_messages() {
        let w = DataWarning::NoScenes {
            variable: Variable::Rainfall,
        };
        assert_eq!(w.to_string(), "no rainfall scenes in the requested period");
    }
}

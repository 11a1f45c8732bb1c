//! Composite weights and their validation policy

use serde::{Deserialize, Serialize};
use riskmap_core::{Error, Result};
use tracing::warn;

use super::Variable;

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// How weights outside [0, 1] or not summing to 1.0 are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    /// Reject with [`Error::InvalidWeights`]
    #[default]
    Strict,
    /// Log a warning and compute anyway; the composite is still clamped
    Lenient,
}

/// Relative contribution of each suitability layer to the composite index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub temperature: f64,
    pub vegetation: f64,
    pub rainfall: f64,
}

impl Weights {
    pub fn new(temperature: f64, vegetation: f64, rainfall: f64) -> Self {
        Self {
            temperature,
            vegetation,
            rainfall,
        }
    }

    /// Weight of one variable
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Vegetation => self.vegetation,
            Variable::Rainfall => self.rainfall,
        }
    }

    pub fn sum(&self) -> f64 {
        self.temperature + self.vegetation + self.rainfall
    }

    /// Check the weights against `policy`.
    ///
    /// Non-finite weights are rejected under every policy. Weights outside
    /// [0, 1] or a sum further than [`WEIGHT_SUM_TOLERANCE`] from 1.0 are
    /// rejected when strict and logged when lenient.
    pub fn validate(&self, policy: WeightPolicy) -> Result<()> {
        let mut problems = Vec::new();

        for variable in Variable::ALL {
            let w = self.get(variable);
            if !w.is_finite() {
                return Err(Error::InvalidWeights(format!(
                    "{} weight is not a finite number ({})",
                    variable, w
                )));
            }
            if !(0.0..=1.0).contains(&w) {
                problems.push(format!("{} weight {} is outside [0, 1]", variable, w));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            problems.push(format!("weights sum to {} instead of 1.0", sum));
        }

        if problems.is_empty() {
            return Ok(());
        }

        let message = problems.join("; ");
        match policy {
            WeightPolicy::Strict => Err(Error::InvalidWeights(message)),
            WeightPolicy::Lenient => {
                warn!(weights = ?self, "accepting weights under lenient policy: {}", message);
                Ok(())
            }
        }
    }
}

impl Default for Weights {
    /// 40% temperature, 30% vegetation, 30% rainfall
    fn default() -> Self {
        Self::new(0.40, 0.30, 0.30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        let w = Weights::default();
        assert!(w.validate(WeightPolicy::Strict).is_ok());
        assert!((w.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn strict_rejects_bad_sum() {
        let w = Weights::new(0.5, 0.3, 0.3);
        let err = w.validate(WeightPolicy::Strict).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("sum"));
    }

    #[test]
    fn strict_rejects_out_of_range_weight() {
        let w = Weights::new(1.2, -0.1, -0.1);
        assert!(w.validate(WeightPolicy::Strict).is_err());
    }

    #[test]
    fn lenient_accepts_bad_sum() {
        let w = Weights::new(0.5, 0.5, 0.5);
        assert!(w.validate(WeightPolicy::Lenient).is_ok());
    }

    #[test]
    fn non_finite_rejected_even_when_lenient() {
        let w = Weights::new(f64::NAN, 0.5, 0.5);
        assert!(w.validate(WeightPolicy::Lenient).is_err());
    }

    #[test]
    fn tolerance_absorbs_rounding() {
        let w = Weights::new(0.1 + 0.2, 0.3, 0.4 - 1e-9);
        assert!(w.validate(WeightPolicy::Strict).is_ok());
    }
}

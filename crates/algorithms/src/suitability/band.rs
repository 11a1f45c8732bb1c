//! Normalization bands

use serde::{Deserialize, Serialize};
use riskmap_core::{Error, Result};

/// Smallest band width accepted, relative to the magnitude of the bounds.
///
/// Narrower bands would turn the linear ramp into a step with a
/// denominator close to zero.
pub const MIN_BAND_WIDTH: f64 = 1e-9;

/// A physical value range mapped linearly onto [0, 1].
///
/// Values at or below `min` map to 0, values at or above `max` map to 1.
/// Construction guarantees `min < max` with a usable width, so a band that
/// exists can always be applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandBounds", into = "BandBounds")]
pub struct NormalizationBand {
    min: f64,
    max: f64,
}

/// Unvalidated `{ min, max }` pair as it appears in configuration files
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BandBounds {
    min: f64,
    max: f64,
}

impl NormalizationBand {
    /// Create a band, rejecting empty, inverted or non-finite ranges.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidBand {
            min,
            max,
            reason: reason.to_string(),
        };

        if !min.is_finite() || !max.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if min >= max {
            return Err(invalid("min must be below max"));
        }
        if !(max - min).is_finite() {
            return Err(invalid("range width is not finite"));
        }
        let magnitude = min.abs().max(max.abs()).max(1.0);
        if max - min < MIN_BAND_WIDTH * magnitude {
            return Err(invalid("range is too narrow to normalize"));
        }

        Ok(Self { min, max })
    }

    /// Land surface temperature band, degrees Celsius
    pub fn temperature() -> Self {
        Self { min: 18.0, max: 32.0 }
    }

    /// Vegetation index band (NDVI, unitless)
    pub fn vegetation() -> Self {
        Self { min: 0.20, max: 0.80 }
    }

    /// Cumulative rainfall band, millimetres
    pub fn rainfall() -> Self {
        Self { min: 0.0, max: 300.0 }
    }

    /// The identity band on already-normalized data
    pub fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Map one defined value onto [0, 1].
    ///
    /// `scale(min) == 0.0` and `scale(max) == 1.0` exactly.
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Default for NormalizationBand {
    fn default() -> Self {
        Self::unit()
    }
}

impl TryFrom<BandBounds> for NormalizationBand {
    type Error = Error;

    fn try_from(bounds: BandBounds) -> Result<Self> {
        Self::new(bounds.min, bounds.max)
    }
}

impl From<NormalizationBand> for BandBounds {
    fn from(band: NormalizationBand) -> Self {
        Self {
            min: band.min,
            max: band.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_and_empty_bands() {
        assert!(NormalizationBand::new(32.0, 18.0).is_err());
        assert!(NormalizationBand::new(18.0, 18.0).is_err());
    }

    #[test]
    fn rejects_non_finite_bounds() {
        assert!(NormalizationBand::new(f64::NAN, 1.0).is_err());
        assert!(NormalizationBand::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_near_equal_bounds() {
        let err = NormalizationBand::new(300.0, 300.0 + 1e-12).unwrap_err();
        assert!(err.is_configuration());
        assert!(NormalizationBand::new(0.0, 1e-6).is_ok());
    }

    #[test]
    fn rejects_overflowing_width() {
        let err = NormalizationBand::new(-1e308, 1e308).unwrap_err();
        assert!(err.is_configuration());
        assert!(NormalizationBand::new(-1e307, 1e307).is_ok());
    }

    #[test]
    fn boundaries_are_exact() {
        for band in [
            NormalizationBand::temperature(),
            NormalizationBand::vegetation(),
            NormalizationBand::rainfall(),
        ] {
            assert_eq!(band.scale(band.min()), 0.0);
            assert_eq!(band.scale(band.max()), 1.0);
        }
    }

    #[test]
    fn scale_clamps_far_outside_values() {
        let band = NormalizationBand::temperature();
        assert_eq!(band.scale(40.0), 1.0);
        assert_eq!(band.scale(1e12), 1.0);
        assert_eq!(band.scale(-60.0), 0.0);
        assert_eq!(band.scale(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn scale_is_monotonic() {
        let band = NormalizationBand::new(-3.5, 7.25).unwrap();
        let mut previous = f64::NEG_INFINITY;
        for i in -200..=200 {
            let v = band.scale(i as f64 * 0.1);
            assert!(v >= previous);
            assert!((0.0..=1.0).contains(&v));
            previous = v;
        }
    }

    #[test]
    fn defaults_are_valid_bands() {
        for band in [
            NormalizationBand::temperature(),
            NormalizationBand::vegetation(),
            NormalizationBand::rainfall(),
            NormalizationBand::default(),
        ] {
            assert!(NormalizationBand::new(band.min(), band.max()).is_ok());
        }
    }
}

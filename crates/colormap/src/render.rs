//! Raster-to-RGBA rendering with the risk ramp or the legend classes.

use crate::legend::Legend;
use crate::scheme::{evaluate, ColorStop, Rgb, RISK_RAMP};
use riskmap_core::raster::{Raster, RasterElement};

/// How values are turned into colors
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// Continuous interpolation along color stops
    Ramp(Vec<ColorStop>),
    /// Flat color per legend class; values outside every class are nodata
    Classes(Legend),
}

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub mode: ColorMode,
    /// Value mapped to the start of the ramp
    pub min: f64,
    /// Value mapped to the end of the ramp
    pub max: f64,
    /// Color for nodata pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Continuous risk ramp over [0, 1]
    pub fn ramp() -> Self {
        Self::with_mode(ColorMode::Ramp(RISK_RAMP.to_vec()))
    }

    /// Flat legend colors
    pub fn classes(legend: Legend) -> Self {
        Self::with_mode(ColorMode::Classes(legend))
    }

    pub fn with_mode(mode: ColorMode) -> Self {
        Self {
            mode,
            min: 0.0,
            max: 1.0,
            nodata_color: [0, 0, 0, 0],
        }
    }

    fn color_of(&self, v: f64, inv_range: f64) -> Option<Rgb> {
        match &self.mode {
            ColorMode::Ramp(stops) => Some(evaluate(stops, (v - self.min) * inv_range)),
            ColorMode::Classes(legend) => legend.classify(v).map(|i| legend.classes[i].color),
        }
    }
}

impl Default for ColormapParams {
    fn default() -> Self {
        Self::ramp()
    }
}

/// Convert a raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Nodata pixels, non-finite values and values outside every legend class
/// are rendered with `params.nodata_color`.
pub fn raster_to_rgba<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Vec<u8> {
    let nodata = raster.nodata();
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let mut rgba = Vec::with_capacity(raster.len() * 4);

    for val in raster.data().iter() {
        let color = if val.is_nodata(nodata) {
            None
        } else {
            val.to_f64()
                .filter(|v| v.is_finite())
                .and_then(|v| params.color_of(v, inv_range))
        };

        match color {
            Some(Rgb { r, g, b }) => rgba.extend_from_slice(&[r, g, b, 255]),
            None => rgba.extend_from_slice(&params.nodata_color),
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskmap_core::raster::Raster;

    fn index() -> Raster<f64> {
        let mut r = Raster::from_vec(vec![0.0, 0.5, 1.0, f64::NAN], 2, 2).unwrap();
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn ramp_rendering() {
        let rgba = raster_to_rgba(&index(), &ColormapParams::ramp());
        assert_eq!(rgba.len(), 16);

        assert_eq!(&rgba[0..4], &[0x2c, 0x7b, 0xb6, 255]);
        assert_eq!(&rgba[4..8], &[0xff, 0xff, 0xbf, 255]);
        assert_eq!(&rgba[8..12], &[0xd7, 0x19, 0x1c, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn class_rendering() {
        let rgba = raster_to_rgba(&index(), &ColormapParams::classes(Legend::default()));

        assert_eq!(&rgba[0..4], &[0x2c, 0x7b, 0xb6, 255]);
        // 0.5 opens the "High Risk" class
        assert_eq!(&rgba[4..8], &[0xfd, 0xae, 0x61, 255]);
        assert_eq!(&rgba[8..12], &[0xd7, 0x19, 0x1c, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn custom_nodata_color() {
        let mut params = ColormapParams::ramp();
        params.nodata_color = [255, 255, 255, 128];
        let rgba = raster_to_rgba(&index(), &params);
        assert_eq!(&rgba[12..16], &[255, 255, 255, 128]);
    }

    #[test]
    fn values_outside_legend_are_transparent() {
        let r = Raster::from_vec(vec![1.5_f64], 1, 1).unwrap();
        let rgba = raster_to_rgba(&r, &ColormapParams::classes(Legend::default()));
        assert_eq!(rgba, vec![0, 0, 0, 0]);
    }
}

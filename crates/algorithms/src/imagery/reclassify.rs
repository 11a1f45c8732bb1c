//! Raster reclassification
//!
//! Reclassify raster values based on value ranges. The risk legend is
//! turned into a class-code raster through this module.

use ndarray::Array2;
use crate::maybe_rayon::*;
use riskmap_core::raster::Raster;
use riskmap_core::{Error, Result};

/// A reclassification entry mapping an input range to an output value
#[derive(Debug, Clone)]
pub struct ReclassEntry {
    /// Minimum value (inclusive)
    pub min: f64,
    /// Maximum value (exclusive, except for the last class)
    pub max: f64,
    /// Output value for this class
    pub value: f64,
}

impl ReclassEntry {
    /// Create a new reclassification entry
    pub fn new(min: f64, max: f64, value: f64) -> Self {
        Self { min, max, value }
    }
}

/// Parameters for reclassification
#[derive(Debug, Clone)]
pub struct ReclassifyParams {
    /// Reclassification table (must be sorted by min value)
    pub classes: Vec<ReclassEntry>,
    /// Value for cells that don't match any class
    pub default_value: f64,
}

impl Default for ReclassifyParams {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            default_value: f64::NAN,
        }
    }
}

/// Reclassify raster values based on a classification table.
///
/// The first matching entry (min <= value < max) determines the output.
/// The last entry also includes its max, so an index of exactly 1.0
/// lands in the top class. Nodata cells stay NaN.
pub fn reclassify(raster: &Raster<f64>, params: &ReclassifyParams) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();
    let classes = &params.classes;
    let default = params.default_value;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) {
                    continue;
                }
                *out = classify(val, classes).unwrap_or(default);
            }
            row_data
        })
        .collect();

    let mut output = raster.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

fn classify(val: f64, classes: &[ReclassEntry]) -> Option<f64> {
    if let Some(entry) = classes.iter().find(|e| val >= e.min && val < e.max) {
        return Some(entry.value);
    }
    match classes.last() {
        Some(last) if val == last.max => Some(last.value),
        _ => None,
    }
}

//! Band math operations
//!
//! Apply a scalar function to every valid cell of a raster. Used for
//! stored-integer to physical-unit conversion and by the range normalizer.

use ndarray::Array2;
use crate::maybe_rayon::*;
use riskmap_core::raster::Raster;
use riskmap_core::{Error, Result};

/// Apply a unary function to every cell in a raster.
///
/// Nodata cells (NaN or the raster's nodata value) stay NaN and are never
/// passed to `f`. The output uses NaN as its nodata value.
///
/// # Example
/// ```ignore
/// // MODIS LST stored codes to degrees Celsius
/// let celsius = band_math(&lst, |v| v * 0.02 - 273.15)?;
/// ```
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) {
                    continue;
                }
                *out = f(val);
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

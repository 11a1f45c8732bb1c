//! Region clipping
//!
//! Cells outside the region of interest become nodata. Nothing is cropped,
//! so clipped layers keep the grid of their source.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::maybe_rayon::*;
use riskmap_core::raster::{Raster, RasterElement};
use riskmap_core::{Error, Result};

/// Axis-aligned bounding box in raster coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if !(min_x < max_x && min_y < max_y) {
            return Err(Error::InvalidParameter {
                name: "bounds",
                value: format!("[{}, {}, {}, {}]", min_x, min_y, max_x, max_y),
                reason: "expected [min_x, min_y, max_x, max_y] with min < max".into(),
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Whether the point lies inside or on the edge of the box
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl TryFrom<[f64; 4]> for Bounds {
    type Error = Error;

    fn try_from(v: [f64; 4]) -> Result<Self> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.min_x, b.min_y, b.max_x, b.max_y]
    }
}

/// Set every cell whose center falls outside `bounds` to nodata
pub fn clip_to_bounds(raster: &Raster<f64>, bounds: &Bounds) -> Result<Raster<f64>> {
    clip_with(raster, |row, col| {
        let (x, y) = raster.pixel_to_geo(col, row);
        bounds.contains(x, y)
    })
}

/// Set every cell to nodata where `mask` is nodata or zero.
///
/// The mask must be aligned with `raster`.
pub fn clip_to_mask<M: RasterElement>(raster: &Raster<f64>, mask: &Raster<M>) -> Result<Raster<f64>> {
    raster.check_aligned(mask)?;
    clip_with(raster, |row, col| {
        let m = unsafe { mask.get_unchecked(row, col) };
        !mask.is_nodata(m) && !m.is_zero()
    })
}

fn clip_with<F>(raster: &Raster<f64>, inside: F) -> Result<Raster<f64>>
where
    F: Fn(usize, usize) -> bool + Sync + Send,
{
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) || !inside(row, col) {
                    continue;
                }
                *out = val;
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

//! Temporal reduction of scene stacks
//!
//! Reduces every scene of a period, cell by cell, to one layer. Cells are
//! reduced over their valid observations only, so clouds or gaps in one
//! scene do not turn a mean into nodata.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::maybe_rayon::*;
use riskmap_core::raster::Raster;
use riskmap_core::{Error, Result};

/// Per-cell reduction applied to a stack of scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Average of valid observations (temperature, vegetation)
    #[default]
    Mean,
    /// Total of valid observations (cumulative rainfall)
    Sum,
}

impl Aggregation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }
}

/// Reduce a stack of aligned scenes to a single layer.
///
/// A cell without any valid observation is nodata (NaN) in the output,
/// for both mean and sum.
///
/// # Errors
/// - [`Error::NoData`] if `scenes` is empty
/// - [`Error::SizeMismatch`] / [`Error::GridMismatch`] if scenes are not aligned
pub fn aggregate(scenes: &[Raster<f64>], method: Aggregation) -> Result<Raster<f64>> {
    let first = scenes
        .first()
        .ok_or_else(|| Error::NoData("no scenes to aggregate".into()))?;
    for scene in &scenes[1..] {
        first.check_aligned(scene)?;
    }

    let (rows, cols) = first.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut count = 0usize;
                for scene in scenes {
                    let val = unsafe { scene.get_unchecked(row, col) };
                    if scene.is_nodata(val) {
                        continue;
                    }
                    sum += val;
                    count += 1;
                }

                if count == 0 {
                    continue;
                }
                *out = match method {
                    Aggregation::Mean => sum / count as f64,
                    Aggregation::Sum => sum,
                };
            }
            row_data
        })
        .collect();

    let mut output = first.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

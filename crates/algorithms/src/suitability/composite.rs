//! Index compositor: weighted fusion of three suitability layers

use ndarray::Array2;
use crate::maybe_rayon::*;
use riskmap_core::raster::Raster;
use riskmap_core::{Algorithm, Error, Result};

use super::{WeightPolicy, Weights};

/// Combine three suitability layers into the composite index.
///
/// Per cell: `clamp(t * w_t + v * w_v + r * w_r, 0, 1)`. A cell that is
/// nodata in any input is nodata in the output.
///
/// # Errors
/// - [`Error::SizeMismatch`] / [`Error::GridMismatch`] if the layers do not
///   share one grid
/// - [`Error::InvalidWeights`] if `weights` fail `policy`
pub fn composite(
    s_temp: &Raster<f64>,
    s_veg: &Raster<f64>,
    s_rain: &Raster<f64>,
    weights: &Weights,
    policy: WeightPolicy,
) -> Result<Raster<f64>> {
    check_grids(s_temp, s_veg, s_rain)?;
    weights.validate(policy)?;
    weighted_sum(s_temp, s_veg, s_rain, weights)
}

/// Fail unless all three layers cover the same cells
pub(crate) fn check_grids(a: &Raster<f64>, b: &Raster<f64>, c: &Raster<f64>) -> Result<()> {
    a.check_aligned(b)?;
    a.check_aligned(c)
}

/// Cell loop of [`composite`]; grids and weights are already checked.
pub(crate) fn weighted_sum(
    s_temp: &Raster<f64>,
    s_veg: &Raster<f64>,
    s_rain: &Raster<f64>,
    weights: &Weights,
) -> Result<Raster<f64>> {
    let (rows, cols) = s_temp.shape();
    let Weights {
        temperature: wt,
        vegetation: wv,
        rainfall: wr,
    } = *weights;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let t = unsafe { s_temp.get_unchecked(row, col) };
                let v = unsafe { s_veg.get_unchecked(row, col) };
                let r = unsafe { s_rain.get_unchecked(row, col) };

                if s_temp.is_nodata(t) || s_veg.is_nodata(v) || s_rain.is_nodata(r) {
                    continue;
                }

                *out = (t * wt + v * wv + r * wr).clamp(0.0, 1.0);
            }
            row_data
        })
        .collect();

    let mut output = s_temp.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

/// The three normalized layers fed to the compositor
#[derive(Debug, Clone)]
pub struct SuitabilityLayers {
    pub temperature: Raster<f64>,
    pub vegetation: Raster<f64>,
    pub rainfall: Raster<f64>,
}

/// Parameters of the compositor
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeParams {
    pub weights: Weights,
    pub policy: WeightPolicy,
}

/// [`Algorithm`] front-end for the index compositor
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCompositor;

impl Algorithm for IndexCompositor {
    type Input = SuitabilityLayers;
    type Output = Raster<f64>;
    type Params = CompositeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "index-compositor"
    }

    fn description(&self) -> &'static str {
        "Weighted sum of temperature, vegetation and rainfall suitability, clamped to [0, 1]"
    }

    fn execute(&self, input: SuitabilityLayers, params: CompositeParams) -> Result<Raster<f64>> {
        composite(
            &input.temperature,
            &input.vegetation,
            &input.rainfall,
            &params.weights,
            params.policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskmap_core::GeoTransform;

    fn grid(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(60.0, 37.0, 0.01, -0.01));
        r
    }

    fn strict(t: &Raster<f64>, v: &Raster<f64>, r: &Raster<f64>) -> Result<Raster<f64>> {
        composite(t, v, r, &Weights::default(), WeightPolicy::Strict)
    }

    #[test]
    fn midpoint_scenario() {
        let half = grid(3, 3, 0.5);
        let out = strict(&half, &half, &half).unwrap();
        assert_relative_eq!(out.get(1, 1).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn extremes() {
        let zero = grid(2, 2, 0.0);
        let one = grid(2, 2, 1.0);
        assert_eq!(strict(&zero, &zero, &zero).unwrap().get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(
            strict(&one, &one, &one).unwrap().get(0, 0).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn weights_are_applied_per_layer() {
        let t = grid(1, 1, 1.0);
        let v = grid(1, 1, 0.0);
        let r = grid(1, 1, 0.0);
        let out = strict(&t, &v, &r).unwrap();
        assert_relative_eq!(out.get(0, 0).unwrap(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn nodata_in_any_input_propagates() {
        let t = grid(1, 3, 0.5);
        let mut v = grid(1, 3, 0.5);
        let mut r = grid(1, 3, 0.5);
        v.set(0, 0, f64::NAN).unwrap();
        r.set(0, 1, -1.0).unwrap();
        r.set_nodata(Some(-1.0));

        let out = strict(&t, &v, &r).unwrap();
        assert!(out.get(0, 0).unwrap().is_nan());
        assert!(out.get(0, 1).unwrap().is_nan());
        assert!(!out.get(0, 2).unwrap().is_nan());
    }

    #[test]
    fn shape_mismatch_is_configuration_error() {
        let a = grid(3, 3, 0.5);
        let b = grid(3, 4, 0.5);
        let err = strict(&a, &a, &b).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn misaligned_grid_is_rejected() {
        let a = grid(3, 3, 0.5);
        let mut b = grid(3, 3, 0.5);
        b.set_transform(GeoTransform::new(60.02, 37.0, 0.01, -0.01));
        assert!(matches!(strict(&a, &b, &a), Err(Error::GridMismatch(_))));
    }

    #[test]
    fn strict_policy_rejects_bad_weights() {
        let a = grid(2, 2, 0.5);
        let w = Weights::new(0.6, 0.6, 0.6);
        assert!(composite(&a, &a, &a, &w, WeightPolicy::Strict).is_err());
    }

    #[test]
    fn lenient_policy_clamps_overrun() {
        let a = grid(2, 2, 1.0);
        let w = Weights::new(0.6, 0.6, 0.6);
        let out = composite(&a, &a, &a, &w, WeightPolicy::Lenient).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn output_bounded_for_valid_inputs() {
        let mut t = grid(10, 10, 0.0);
        let mut v = grid(10, 10, 0.0);
        let mut r = grid(10, 10, 0.0);
        for row in 0..10 {
            for col in 0..10 {
                t.set(row, col, row as f64 / 9.0).unwrap();
                v.set(row, col, col as f64 / 9.0).unwrap();
                r.set(row, col, ((row * col) % 10) as f64 / 9.0).unwrap();
            }
        }
        let weights = Weights::new(0.2, 0.5, 0.3);
        let out = composite(&t, &v, &r, &weights, WeightPolicy::Strict).unwrap();
        assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn algorithm_front_end() {
        let layers = SuitabilityLayers {
            temperature: grid(2, 2, 0.5),
            vegetation: grid(2, 2, 0.5),
            rainfall: grid(2, 2, 0.5),
        };
        let out = IndexCompositor.execute_default(layers).unwrap();
        assert_relative_eq!(out.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }
}

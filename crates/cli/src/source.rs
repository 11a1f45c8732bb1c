//! Raster source over local GeoTIFF scene catalogs

use anyhow::{Context, Result};
use tracing::debug;

use riskmap_algorithms::clip::{clip_to_bounds, clip_to_mask};
use riskmap_algorithms::imagery::band_math;
use riskmap_algorithms::suitability::Variable;
use riskmap_algorithms::temporal::{aggregate, Aggregation};
use riskmap_core::io::read_geotiff;
use riskmap_core::Raster;

use crate::config::{LayerCatalogs, Period, Region};

/// Supplies one raw layer per variable, in physical units and clipped to
/// the region.
pub trait RasterSource: Send + Sync {
    /// Reduce every scene of `variable` inside `period` with `aggregation`.
    ///
    /// `Ok(None)` means no scene fell inside the period.
    fn fetch(
        &self,
        variable: Variable,
        period: &Period,
        region: &Region,
        aggregation: Aggregation,
    ) -> Result<Option<Raster<f64>>>;
}

/// Reads dated scenes listed in the run configuration
#[derive(Debug, Clone)]
pub struct SceneCatalogSource {
    layers: LayerCatalogs,
}

impl SceneCatalogSource {
    pub fn new(layers: LayerCatalogs) -> Self {
        Self { layers }
    }
}

impl RasterSource for SceneCatalogSource {
    fn fetch(
        &self,
        variable: Variable,
        period: &Period,
        region: &Region,
        aggregation: Aggregation,
    ) -> Result<Option<Raster<f64>>> {
        let catalog = self.layers.get(variable);

        let stack = catalog
            .scenes_in(period)
            .map(|scene| {
                read_geotiff::<f64, _>(&scene.path, None)
                    .with_context(|| format!("Failed to read {} scene {:?}", variable, scene.path))
            })
            .collect::<Result<Vec<_>>>()?;

        if stack.is_empty() {
            return Ok(None);
        }
        debug!(%variable, scenes = stack.len(), aggregation = aggregation.name(), "aggregating");

        let mut layer = aggregate(&stack, aggregation)
            .with_context(|| format!("Failed to aggregate {} scenes", variable))?;

        if !catalog.is_identity() {
            let (scale, offset) = (catalog.scale, catalog.offset);
            layer = band_math(&layer, |v| v * scale + offset)?;
        }

        clip_region(&layer, region).map(Some)
    }
}

/// Apply the region's bounding box or mask; no region leaves the layer as is.
pub fn clip_region(layer: &Raster<f64>, region: &Region) -> Result<Raster<f64>> {
    if let Some(bbox) = &region.bbox {
        return Ok(clip_to_bounds(layer, bbox)?);
    }
    if let Some(path) = &region.mask {
        let mask: Raster<f64> = read_geotiff(path, None)
            .with_context(|| format!("Failed to read region mask {:?}", path))?;
        return clip_to_mask(layer, &mask).context("Region mask does not match the layer grid");
    }
    Ok(layer.clone())
}

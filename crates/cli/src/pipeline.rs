//! End-to-end run: fetch, evaluate, classify, write

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use riskmap_algorithms::imagery::{reclassify, ReclassEntry, ReclassifyParams};
use riskmap_algorithms::suitability::{DataWarning, RiskAssessment, RiskInputs, RiskModel, Variable};
use riskmap_colormap::{raster_to_rgba, ColormapParams, Legend};
use riskmap_core::io::{write_geotiff, write_rgba_tiff, GeoTiffOptions};
use riskmap_core::{Error, Raster, RasterStatistics};

use crate::config::{PreviewStyle, RunConfig};
use crate::source::RasterSource;

/// What a run produced
#[derive(Debug)]
pub struct RunSummary {
    pub assessment: RiskAssessment,
    pub statistics: RasterStatistics<f64>,
    /// Number of index cells per legend class, in legend order
    pub class_counts: Vec<usize>,
    pub written: Vec<PathBuf>,
}

/// Run the full pipeline described by `config`, reading layers from `source`.
///
/// Configuration is validated before any raster is read. A variable without
/// scenes in the period becomes an all-nodata layer and a
/// [`DataWarning::NoScenes`]; the run fails only when no variable has scenes.
pub fn run(config: &RunConfig, source: &dyn RasterSource) -> Result<RunSummary> {
    config.validate()?;
    let model = RiskModel::new(config.risk_config())?;

    let fetch = |variable: Variable| {
        let aggregation = config.layers.get(variable).aggregation;
        source
            .fetch(variable, &config.period, &config.region, aggregation)
            .with_context(|| format!("Failed to load {} layer", variable))
    };
    let (temperature, (vegetation, rainfall)) = rayon::join(
        || fetch(Variable::Temperature),
        || rayon::join(|| fetch(Variable::Vegetation), || fetch(Variable::Rainfall)),
    );
    let fetched = [temperature?, vegetation?, rainfall?];

    let template = fetched.iter().flatten().next().ok_or_else(|| {
        Error::NoData(format!(
            "no scenes for any variable between {} and {}",
            config.period.start, config.period.end
        ))
    })?;

    let mut missing = Vec::new();
    let [temperature, vegetation, rainfall] = Variable::ALL.map(|variable| {
        let layer = &fetched[variable as usize];
        match layer {
            Some(layer) => layer.clone(),
            None => {
                warn!(%variable, "no scenes in period; layer will be nodata");
                missing.push(variable);
                empty_like(template)
            }
        }
    });

    let mut assessment = model.evaluate(&RiskInputs {
        temperature: &temperature,
        vegetation: &vegetation,
        rainfall: &rainfall,
    })?;
    assessment.warnings.retain(
        |w| !matches!(w, DataWarning::EmptyLayer { variable } if missing.contains(variable)),
    );
    let mut warnings: Vec<DataWarning> = missing
        .iter()
        .map(|&variable| DataWarning::NoScenes { variable })
        .collect();
    warnings.append(&mut assessment.warnings);
    assessment.warnings = warnings;

    let mut written = Vec::new();
    let index = &assessment.index;

    write_layer(index, &config.output.index)?;
    written.push(config.output.index.clone());

    if let Some(path) = &config.output.classified {
        let classes = classify(index, &config.legend)?;
        write_layer(&classes, path)?;
        written.push(path.clone());
    }

    if let Some(path) = &config.output.preview {
        let params = match config.output.preview_style {
            PreviewStyle::Ramp => ColormapParams::ramp(),
            PreviewStyle::Classes => ColormapParams::classes(config.legend.clone()),
        };
        let rgba = raster_to_rgba(index, &params);
        create_parent(path)?;
        write_rgba_tiff(&rgba, index.rows(), index.cols(), path)
            .with_context(|| format!("Failed to write preview {:?}", path))?;
        written.push(path.clone());
    }

    let statistics = index.statistics();
    let class_counts = class_counts(index, &config.legend);
    info!(valid = statistics.valid_count, "risk index computed");

    Ok(RunSummary {
        assessment,
        statistics,
        class_counts,
        written,
    })
}

/// Reclassification table mapping legend class `i` to class number `i + 1`
pub fn reclass_table(legend: &Legend) -> ReclassifyParams {
    ReclassifyParams {
        classes: legend
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| ReclassEntry::new(c.min, c.max, (i + 1) as f64))
            .collect(),
        default_value: f64::NAN,
    }
}

/// Legend class numbers (1..n) of an index layer; nodata stays nodata
pub fn classify(index: &Raster<f64>, legend: &Legend) -> Result<Raster<f64>> {
    legend.validate()?;
    Ok(reclassify(index, &reclass_table(legend))?)
}

fn class_counts(index: &Raster<f64>, legend: &Legend) -> Vec<usize> {
    let mut counts = vec![0; legend.classes.len()];
    for &v in index.data().iter() {
        if let Some(i) = legend.classify(v) {
            counts[i] += 1;
        }
    }
    counts
}

fn empty_like(template: &Raster<f64>) -> Raster<f64> {
    let mut layer = template.like(f64::NAN);
    layer.set_nodata(Some(f64::NAN));
    layer
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    Ok(())
}

fn write_layer(raster: &Raster<f64>, path: &Path) -> Result<()> {
    create_parent(path)?;
    let options = GeoTiffOptions {
        write_nodata_tag: true,
    };
    write_geotiff(raster, path, Some(options))
        .with_context(|| format!("Failed to write {:?}", path))?;
    debug!(path = %path.display(), "wrote layer");
    Ok(())
}

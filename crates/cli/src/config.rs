//! YAML run configuration
//!
//! ```yaml
//! period: { start: 2023-01-01, end: 2023-12-31 }
//! region: { bbox: [33.9, -4.7, 41.9, 5.0] }      # or { mask: region.tif }
//! layers:
//!   temperature:
//!     aggregation: mean
//!     scale: 0.02
//!     offset: -273.15
//!     scenes:
//!       - { date: 2023-01-01, path: lst/2023-01-01.tif }
//!   vegetation: { scale: 0.0001, scenes: [...] }
//!   rainfall: { aggregation: sum, scenes: [...] }
//! suitability:
//!   temperature: { min: 18, max: 32 }
//! weights: { temperature: 0.4, vegetation: 0.3, rainfall: 0.3 }
//! weight_policy: strict
//! output:
//!   index: out/risk_index.tif
//!   classified: out/risk_classes.tif
//!   preview: out/risk_preview.tif
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use riskmap_algorithms::clip::Bounds;
use riskmap_algorithms::suitability::{NormalizationBand, RiskConfig, Variable, WeightPolicy, Weights};
use riskmap_algorithms::temporal::Aggregation;
use riskmap_colormap::Legend;
use riskmap_core::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub period: Period,
    #[serde(default)]
    pub region: Region,
    pub layers: LayerCatalogs,
    #[serde(default)]
    pub suitability: SuitabilityBands,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub weight_policy: WeightPolicy,
    #[serde(default)]
    pub legend: Legend,
    pub output: OutputConfig,
}

/// Inclusive date window of the scenes to aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> riskmap_core::Result<Self> {
        let period = Self { start, end };
        period.validate()?;
        Ok(period)
    }

    pub fn validate(&self) -> riskmap_core::Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidPeriod {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Region of interest. At most one of `bbox` and `mask` may be set; with
/// neither, layers are not clipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bounds>,
    /// GeoTIFF on the layer grid; zero or nodata cells are outside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerCatalogs {
    #[serde(default)]
    pub temperature: SceneCatalog,
    #[serde(default)]
    pub vegetation: SceneCatalog,
    #[serde(default)]
    pub rainfall: SceneCatalog,
}

impl LayerCatalogs {
    pub fn get(&self, variable: Variable) -> &SceneCatalog {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::Vegetation => &self.vegetation,
            Variable::Rainfall => &self.rainfall,
        }
    }

    fn get_mut(&mut self, variable: Variable) -> &mut SceneCatalog {
        match variable {
            Variable::Temperature => &mut self.temperature,
            Variable::Vegetation => &mut self.vegetation,
            Variable::Rainfall => &mut self.rainfall,
        }
    }
}

/// Dated scenes of one variable, stored as `physical = stored * scale + offset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCatalog {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Mean,
            scale: default_scale(),
            offset: 0.0,
            scenes: Vec::new(),
        }
    }
}

impl SceneCatalog {
    /// Scenes dated inside `period`
    pub fn scenes_in(&self, period: &Period) -> impl Iterator<Item = &Scene> {
        let period = *period;
        self.scenes.iter().filter(move |s| period.contains(s.date))
    }

    /// Whether scale/offset change any value
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Normalization bands per variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityBands {
    pub temperature: NormalizationBand,
    pub vegetation: NormalizationBand,
    pub rainfall: NormalizationBand,
}

impl Default for SuitabilityBands {
    fn default() -> Self {
        Self {
            temperature: NormalizationBand::temperature(),
            vegetation: NormalizationBand::vegetation(),
            rainfall: NormalizationBand::rainfall(),
        }
    }
}

/// Output files; only the index is mandatory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub index: PathBuf,
    #[serde(default)]
    pub classified: Option<PathBuf>,
    #[serde(default)]
    pub preview: Option<PathBuf>,
    #[serde(default)]
    pub preview_style: PreviewStyle,
}

/// Coloring of the RGBA preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStyle {
    /// Continuous five-stop ramp
    #[default]
    Ramp,
    /// Flat legend colors
    Classes,
}

impl RunConfig {
    /// Model settings for [`riskmap_algorithms::suitability::RiskModel`]
    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig {
            temperature: self.suitability.temperature,
            vegetation: self.suitability.vegetation,
            rainfall: self.suitability.rainfall,
            weights: self.weights,
            weight_policy: self.weight_policy,
        }
    }

    /// Check everything that can be checked without reading rasters.
    ///
    /// Weights are validated when the model is built.
    pub fn validate(&self) -> Result<()> {
        self.period.validate()?;
        self.legend.validate()?;
        if self.region.bbox.is_some() && self.region.mask.is_some() {
            anyhow::bail!("region must set either 'bbox' or 'mask', not both");
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        if let Some(mask) = self.region.mask.as_mut() {
            resolve(mask);
        }
        for variable in Variable::ALL {
            for scene in &mut self.layers.get_mut(variable).scenes {
                resolve(&mut scene.path);
            }
        }
        resolve(&mut self.output.index);
        if let Some(p) = self.output.classified.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.output.preview.as_mut() {
            resolve(p);
        }
    }
}

/// Parse a run configuration from YAML text; paths are left as written.
pub fn parse_config(content: &str) -> Result<RunConfig> {
    let config: RunConfig =
        serde_yaml::from_str(content).context("Failed to parse run config YAML")?;
    config.validate().context("Invalid run config")?;
    Ok(config)
}

/// Load and validate a run configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config from {:?}", path))?;
    let mut config =
        parse_config(&content).with_context(|| format!("In run config {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
period: { start: 2023-01-01, end: 2023-03-31 }
layers:
  temperature:
    scenes:
      - { date: 2023-01-15, path: lst/jan.tif }
output:
  index: out/index.tif
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.risk_config(), RiskConfig::default());
        assert_eq!(config.legend, Legend::default());
        assert_eq!(config.region, Region::default());
        assert_eq!(config.layers.temperature.scale, 1.0);
        assert_eq!(config.layers.temperature.aggregation, Aggregation::Mean);
        assert!(config.layers.rainfall.scenes.is_empty());
        assert_eq!(config.output.preview_style, PreviewStyle::Ramp);
    }

    #[test]
    fn full_config() {
        let yaml = r#"
period: { start: 2023-01-01, end: 2023-12-31 }
region: { bbox: [33.9, -4.7, 41.9, 5.0] }
layers:
  temperature: { scale: 0.02, offset: -273.15 }
  rainfall: { aggregation: sum }
suitability:
  rainfall: { min: 50, max: 250 }
weights: { temperature: 0.5, vegetation: 0.25, rainfall: 0.25 }
weight_policy: lenient
output:
  index: index.tif
  preview: preview.tif
  preview_style: classes
"#;
        let config = parse_config(yaml).unwrap();
        let risk = config.risk_config();
        assert_eq!(risk.rainfall.min(), 50.0);
        assert_eq!(risk.temperature, NormalizationBand::temperature());
        assert_eq!(risk.weights, Weights::new(0.5, 0.25, 0.25));
        assert_eq!(risk.weight_policy, WeightPolicy::Lenient);
        assert_eq!(config.layers.rainfall.aggregation, Aggregation::Sum);
        assert_eq!(config.layers.temperature.offset, -273.15);
        assert_eq!(config.region.bbox.unwrap().max_x, 41.9);
        assert_eq!(config.output.preview_style, PreviewStyle::Classes);
    }

    #[test]
    fn inverted_period_rejected() {
        let yaml = MINIMAL.replace("start: 2023-01-01", "start: 2023-06-01");
        let err = parse_config(&yaml).unwrap_err();
        let cause = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(cause, Error::InvalidPeriod { .. }));
        assert!(cause.is_configuration());
    }

    #[test]
    fn inverted_band_rejected() {
        let yaml = format!("{}suitability:\n  temperature: {{ min: 32, max: 18 }}\n", MINIMAL);
        assert!(parse_config(&yaml).is_err());
    }

    #[test]
    fn both_region_kinds_rejected() {
        let yaml = format!("{}region: {{ bbox: [0, 0, 1, 1], mask: m.tif }}\n", MINIMAL);
        assert!(parse_config(&yaml).is_err());
    }

    #[test]
    fn period_contains_is_inclusive() {
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();
        let period = Period::new(d("2023-01-01"), d("2023-01-31")).unwrap();
        assert!(period.contains(d("2023-01-01")));
        assert!(period.contains(d("2023-01-31")));
        assert!(!period.contains(d("2023-02-01")));
        assert!(Period::new(d("2023-02-01"), d("2023-01-01")).is_err());
    }

    #[test]
    fn relative_paths_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, MINIMAL).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output.index, dir.path().join("out/index.tif"));
        assert_eq!(
            config.layers.temperature.scenes[0].path,
            dir.path().join("lst/jan.tif")
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/nonexistent/run.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("run.yaml"));
    }
}

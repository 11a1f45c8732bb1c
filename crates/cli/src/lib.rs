//! # RiskMap CLI library
//!
//! Everything behind the `riskmap run` command: the YAML run configuration,
//! the local scene-catalog raster source and the end-to-end pipeline.

pub mod config;
pub mod pipeline;
pub mod source;

pub use config::{load_config, RunConfig};
pub use pipeline::{run, RunSummary};
pub use source::{RasterSource, SceneCatalogSource};

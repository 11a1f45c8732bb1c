//! # RiskMap Colormap
//!
//! Presentation of the composite index: the five-stop risk ramp, legend
//! classes with labels, and rendering of a `Raster<T>` into an RGBA buffer.
//!
//! ## Usage
//!
//! ```ignore
//! use riskmap_colormap::{raster_to_rgba, ColormapParams, Legend};
//!
//! let rgba = raster_to_rgba(&index, &ColormapParams::classes(Legend::default()));
//! println!("{}", Legend::default().render_text());
//! ```

mod legend;
mod render;
mod scheme;

pub use legend::{Legend, LegendClass};
pub use render::{raster_to_rgba, ColorMode, ColormapParams};
pub use scheme::{evaluate, ColorStop, Rgb, RISK_RAMP};

//! I/O operations for reading and writing rasters

mod native;

pub use native::{read_geotiff, write_geotiff, write_rgba_tiff, GeoTiffOptions};

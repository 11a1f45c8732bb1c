//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate for TIFF I/O. Georeferencing is limited to the
//! ModelPixelScale/ModelTiepoint pair and the GDAL nodata tag, which is all
//! the scene products and the index output need.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, RGBA8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const GEO_KEY_DIRECTORY_TAG: u16 = 34735;
const GDAL_NODATA_TAG: u16 = 42113;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    /// Write the GDAL nodata tag so other tools mask empty cells
    pub write_nodata_tag: bool,
}

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, band)
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_geotiff<T, R>(reader: R, _band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn cast_all<S: num_traits::NumCast + Copy, T: RasterElement>(buf: Vec<S>) -> Vec<T> {
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

/// Attempt to read GeoTransform from TIFF tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE_TAG))
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT_TAG))
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Read the GDAL nodata tag, if present and representable in `T`
fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let text = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
        .ok()?;
    let value: f64 = text.trim().trim_end_matches('\0').parse().ok()?;
    num_traits::cast(value)
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file, &options.unwrap_or_default())
}

/// Internal: encode a Raster as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    // Nodata cells are written as NaN whatever their sentinel was
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| {
            if raster.is_nodata(v) {
                f32::NAN
            } else {
                num_traits::cast(v).unwrap_or(f32::NAN)
            }
        })
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE_TAG), scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT_TAG), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // Minimal key directory: GTModelTypeGeoKey=2 (Geographic),
    // GTRasterTypeGeoKey=1 (RasterPixelIsArea)
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2,
        1024, 0, 1, 2,
        1025, 0, 1, 1,
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY_TAG), geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if options.write_nodata_tag {
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA_TAG), "nan")
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Write an RGBA pixel buffer (row-major, 4 bytes per cell) as an 8-bit RGBA TIFF
pub fn write_rgba_tiff<P: AsRef<Path>>(rgba: &[u8], rows: usize, cols: usize, path: P) -> Result<()> {
    if rgba.len() != rows * cols * 4 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;
    encoder
        .write_image::<RGBA8>(cols as u32, rows as u32, rgba)
        .map_err(|e| Error::Other(format!("Cannot write RGBA image: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_geotiff_to_buffer(raster: &Raster<f64>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        encode_geotiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
        Ok(buf)
    }

    fn read_geotiff_from_buffer(data: &[u8]) -> Result<Raster<f64>> {
        decode_geotiff(Cursor::new(data), None)
    }

    fn sample() -> Raster<f64> {
        let mut r = Raster::from_vec(vec![18.0, 25.0, f64::NAN, 32.0, 40.0, 0.5], 2, 3).unwrap();
        r.set_transform(GeoTransform::new(60.0, 37.0, 0.01, -0.01));
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn buffer_roundtrip_keeps_values_and_georeferencing() {
        let raster = sample();
        let buf = write_geotiff_to_buffer(&raster, None).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (2, 3));
        assert!((back.get(0, 1).unwrap() - 25.0).abs() < 1e-6);
        assert!(back.get(0, 2).unwrap().is_nan());
        assert!(back.transform().is_aligned_with(raster.transform(), 1e-6));
    }

    #[test]
    fn sentinel_nodata_is_written_as_nan() {
        let mut raster = Raster::from_vec(vec![1.0, -9999.0], 1, 2).unwrap();
        raster.set_nodata(Some(-9999.0));

        let options = GeoTiffOptions { write_nodata_tag: true };
        let buf = write_geotiff_to_buffer(&raster, Some(options)).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert!(back.get(0, 1).unwrap().is_nan());
        assert!(back.nodata().map_or(false, |nd| nd.is_nan()));
    }

    #[test]
    fn rgba_tiff_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.tif");
        assert!(write_rgba_tiff(&[0u8; 12], 2, 2, &path).is_err());
        assert!(write_rgba_tiff(&[255u8; 16], 2, 2, &path).is_ok());
    }
}

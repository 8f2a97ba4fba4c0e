//! 16-bit grayscale PNG export of map fields.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Luma};

use super::ExportError;
use crate::terrain::Field2D;

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Value mapped to black.
    pub min_value: f64,
    /// Value mapped to white.
    pub max_value: f64,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options spanning the field's current range.
    pub fn auto_range(field: &Field2D) -> Self {
        let (min, max) = field.range();
        Self {
            min_value: min,
            max_value: max,
            ..Default::default()
        }
    }
}

/// Writes raw pixel bytes as a PNG.
pub(crate) fn encode_png(
    path: &Path,
    bytes: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
    compression: CompressionType,
    filter: FilterType,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, compression, filter);
    encoder.write_image(bytes, width, height, color)?;
    Ok(())
}

/// Converts image dimensions, rejecting empty or oversized fields.
pub(crate) fn image_size(width: usize, height: usize) -> Result<(u32, u32), ExportError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(ExportError::InvalidSize(width, height)),
    }
}

/// Exports a field as a 16-bit grayscale PNG.
pub fn export_field_png(
    field: &Field2D,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), ExportError> {
    let min = options.min_value;
    let max = options.max_value;
    if min >= max {
        return Err(ExportError::InvalidRange(min, max));
    }

    let (width, height) = image_size(field.width(), field.height())?;
    let range = max - min;

    let pixels: Vec<u16> = field
        .values()
        .iter()
        .map(|&v| (((v - min) / range).clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(width, height, pixels)
        .ok_or(ExportError::InvalidSize(field.width(), field.height()))?;

    // Convert u16 slice to bytes for the encoder
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());
    encode_png(
        path,
        byte_slice,
        width,
        height,
        ExtendedColorType::L16,
        options.compression,
        options.filter,
    )
}

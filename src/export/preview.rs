//! Coloured previews of the elevation and sunlight fields.

use std::path::Path;

use image::codecs::png::{CompressionType, FilterType};
use image::imageops::{self, FilterType as ResizeFilter};
use image::{ExtendedColorType, Rgb, RgbImage};

use super::png::{encode_png, image_size};
use super::ExportError;
use crate::terrain::{Field2D, SEA_LEVEL};

/// Options for preview export.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Scale the image to this width, keeping the aspect ratio.
    pub render_width: Option<u32>,
}

/// Colours normalised elevation: blues below sea level, greens above.
pub fn elevation_colour(h: f64) -> Rgb<u8> {
    let h = h.clamp(0.0, 1.0);
    if h < SEA_LEVEL {
        Rgb([(32.0 + 32.0 * h) as u8, (64.0 + 255.0 * h) as u8, (128.0 + 128.0 * h) as u8])
    } else {
        Rgb([(64.0 + 32.0 * h) as u8, (128.0 + 64.0 * h) as u8, 64])
    }
}

/// Colours land by how much sunlight it gets; sea is flat blue.
pub fn sunlight_colour(sunlight: f64, elevation: f64) -> Rgb<u8> {
    if elevation < SEA_LEVEL {
        return Rgb([32, 64, 128]);
    }
    let s = sunlight.clamp(0.0, 1.0);
    Rgb([(255.0 * s) as u8, (128.0 * s) as u8, (64.0 * s) as u8])
}

pub fn elevation_preview(elevation: &Field2D) -> Result<RgbImage, ExportError> {
    let (width, height) = image_size(elevation.width(), elevation.height())?;
    Ok(RgbImage::from_fn(width, height, |x, y| {
        elevation_colour(elevation.get(x as usize, y as usize))
    }))
}

pub fn sunlight_preview(sunlight: &Field2D, elevation: &Field2D) -> Result<RgbImage, ExportError> {
    if sunlight.width() != elevation.width() || sunlight.height() != elevation.height() {
        return Err(ExportError::SizeMismatch {
            expected: (elevation.width(), elevation.height()),
            found: (sunlight.width(), sunlight.height()),
        });
    }
    let (width, height) = image_size(sunlight.width(), sunlight.height())?;
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        sunlight_colour(sunlight.get(x, y), elevation.get(x, y))
    }))
}

/// Saves an RGB image, optionally scaled to `render_width`.
pub fn export_rgb_png(image: &RgbImage, path: &Path, options: &PreviewOptions) -> Result<(), ExportError> {
    let scaled;
    let image = match options.render_width {
        Some(width) if width > 0 && width != image.width() => {
            let height = ((image.height() as f64 * width as f64 / image.width() as f64).round() as u32).max(1);
            scaled = imageops::resize(image, width, height, ResizeFilter::Nearest);
            &scaled
        }
        _ => image,
    };

    encode_png(
        path,
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
        CompressionType::Default,
        FilterType::Adaptive,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sea_and_land_colours_differ() {
        assert_eq!(elevation_colour(0.0), Rgb([32, 64, 128]));
        assert_eq!(elevation_colour(1.0), Rgb([96, 192, 64]));
        assert_eq!(sunlight_colour(1.0, 0.0), Rgb([32, 64, 128]));
        assert_eq!(sunlight_colour(1.0, 0.5), Rgb([255, 128, 64]));
    }

    #[test]
    fn preview_is_scaled_to_render_width() {
        let mut elevation = Field2D::new(8, 4);
        elevation.set(2, 2, 0.9);
        let img = elevation_preview(&elevation).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("elevation.png");
        export_rgb_png(&img, &path, &PreviewOptions { render_width: Some(32) }).unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (32, 16));
    }

    #[test]
    fn sunlight_requires_matching_fields() {
        let a = Field2D::new(4, 4);
        let b = Field2D::new(4, 2);
        assert!(matches!(sunlight_preview(&a, &b), Err(ExportError::SizeMismatch { .. })));
    }
}

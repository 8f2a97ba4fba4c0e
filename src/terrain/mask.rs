//! Mask samplers that shape the first octave of the heightmap.

use std::path::{Path, PathBuf};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a mask.
#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Mask image '{0}' has no pixels")]
    Empty(PathBuf),
}

/// Samples a shaping value at map position `(x, y)` on a `width × height` map.
///
/// The first octave of the heightmap is this value, so it dominates the
/// overall shape of the landmass.
pub trait MaskSampler: Send + Sync {
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64;
}

/// Distance of `(x, y)` from the map centre, relative to half the map width.
fn radial_offset(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    let dx = width * 0.5 - x;
    let dy = height * 0.5 - y;
    let max_r = width * 0.5;
    ((dx * dx + dy * dy).sqrt(), max_r)
}

/// A single central continent: `-r / rmax` inside the circle, `-1` outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleGradient;

impl MaskSampler for CircleGradient {
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let (r, max_r) = radial_offset(x, y, width, height);
        if r > max_r {
            return -1.0;
        }
        -(r / max_r)
    }
}

/// Opaque centre fading out: `1 - r / rmax` inside, `0` outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleFalloff;

impl MaskSampler for CircleFalloff {
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let (r, max_r) = radial_offset(x, y, width, height);
        if r > max_r {
            return 0.0;
        }
        1.0 - r / max_r
    }
}

/// An inland sea: `r / rmax` inside, `1` outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseCircle;

impl MaskSampler for InverseCircle {
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let (r, max_r) = radial_offset(x, y, width, height);
        if r > max_r {
            return 1.0;
        }
        r / max_r
    }
}

/// A custom landmass shape read from a grayscale image.
///
/// The image is stretched over the map and sampled nearest-neighbour; black
/// is `0.0` and white is `1.0`.
#[derive(Debug, Clone)]
pub struct ImageMask {
    image: GrayImage,
}

impl ImageMask {
    pub fn open(path: &Path) -> Result<Self, MaskError> {
        let image = image::open(path)?.to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(MaskError::Empty(path.to_path_buf()));
        }
        Ok(Self { image })
    }

    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }
}

impl MaskSampler for ImageMask {
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 {
            return 0.0;
        }
        let px = ((x / width) * w as f64).floor().clamp(0.0, (w - 1) as f64) as u32;
        let py = ((y / height) * h as f64).floor().clamp(0.0, (h - 1) as f64) as u32;
        self.image.get_pixel(px, py)[0] as f64 / 255.0
    }
}

/// Adapts a closure into a [`MaskSampler`].
pub struct FnMask<F>(pub F);

impl<F> MaskSampler for FnMask<F>
where
    F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync,
{
    fn sample(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        (self.0)(x, y, width, height)
    }
}

/// Serializable choice of mask for configuration files and the CLI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    #[default]
    CircleGradient,
    CircleFalloff,
    InverseCircle,
    Image(PathBuf),
}

impl MaskKind {
    /// Builds the sampler; only image masks touch the filesystem.
    pub fn build(&self) -> Result<Box<dyn MaskSampler>, MaskError> {
        Ok(match self {
            MaskKind::CircleGradient => Box::new(CircleGradient),
            MaskKind::CircleFalloff => Box::new(CircleFalloff),
            MaskKind::InverseCircle => Box::new(InverseCircle),
            MaskKind::Image(path) => Box::new(ImageMask::open(path)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn circle_gradient_peaks_at_centre() {
        let m = CircleGradient;
        assert_eq!(m.sample(50.0, 50.0, 100.0, 100.0), 0.0);
        assert_eq!(m.sample(0.0, 0.0, 100.0, 100.0), -1.0);
        assert!((m.sample(75.0, 50.0, 100.0, 100.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn falloff_and_inverse_are_complementary_inside() {
        let (a, b) = (CircleFalloff, InverseCircle);
        for x in [10.0, 30.0, 50.0, 70.0] {
            let sum = a.sample(x, 50.0, 100.0, 100.0) + b.sample(x, 50.0, 100.0, 100.0);
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert_eq!(a.sample(0.0, 0.0, 100.0, 100.0), 0.0);
        assert_eq!(b.sample(0.0, 0.0, 100.0, 100.0), 1.0);
    }

    #[test]
    fn image_mask_samples_nearest_pixel() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(1, 1, Luma([255]));
        let m = ImageMask::from_image(img);
        assert_eq!(m.sample(0.0, 0.0, 10.0, 10.0), 0.0);
        assert_eq!(m.sample(9.0, 9.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn closures_act_as_masks() {
        let m = FnMask(|x: f64, _y: f64, w: f64, _h: f64| x / w);
        assert_eq!(m.sample(5.0, 0.0, 10.0, 10.0), 0.5);
    }

    #[test]
    fn builtin_kinds_build_without_io() {
        assert!(MaskKind::CircleGradient.build().is_ok());
        assert!(MaskKind::Image(PathBuf::from("/nonexistent/mask.png")).build().is_err());
    }
}

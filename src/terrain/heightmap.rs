//! Heightmap generation from layered gradient noise.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::field::Field2D;
use super::mask::{MaskError, MaskKind, MaskSampler};
use super::world::World;
use crate::noise::{octave_count, octave_seeds, GradientNoise2D};

/// Elevation below this normalised value becomes flat sea floor.
pub const SEA_FLOOR: f64 = 0.6;

/// Errors raised while generating a heightmap.
#[derive(Error, Debug)]
pub enum HeightmapError {
    #[error("Invalid heightmap parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),
}

/// Configuration for heightmap generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapConfig {
    /// How chaotic the first octave is (0.6 to 3.0). Low values give smooth,
    /// strongly defined continents; higher values break the land up.
    pub energy: f64,
    /// Shape and contrast of the detail octaves (-0.5 to 1.0).
    pub turbulence: f64,
    /// Master seed for the noise functions.
    pub seed: u64,
    /// Shape of the first octave.
    pub mask: MaskKind,
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self::earth_like(42)
    }
}

impl HeightmapConfig {
    pub fn earth_like(seed: u64) -> Self {
        Self {
            energy: 1.5,
            turbulence: 0.25,
            seed,
            mask: MaskKind::CircleGradient,
        }
    }

    pub fn validate(&self) -> Result<(), HeightmapError> {
        if !(self.energy > 0.0 && self.energy.is_finite()) {
            return Err(HeightmapError::InvalidParameter { name: "energy", value: self.energy });
        }
        if !self.turbulence.is_finite() {
            return Err(HeightmapError::InvalidParameter {
                name: "turbulence",
                value: self.turbulence,
            });
        }
        Ok(())
    }
}

/// Generates the world's elevation, replacing any previous heightmap.
pub fn generate_heightmap(world: &mut World, config: &HeightmapConfig) -> Result<(), HeightmapError> {
    config.validate()?;
    let mask = config.mask.build()?;
    world.elevation = generate_elevation(world.width(), world.height(), config, mask.as_ref());
    Ok(())
}

/// Generates a normalised elevation field of `width × height` cells.
///
/// The mask forms the first octave and dominates the shape of the map;
/// every further octave doubles the noise frequency and halves its
/// amplitude. The result is normalised, everything below [`SEA_FLOOR`] is
/// flattened into sea floor, and the field is normalised again.
pub fn generate_elevation(
    width: usize,
    height: usize,
    config: &HeightmapConfig,
    mask: &dyn MaskSampler,
) -> Field2D {
    let mut elevation = Field2D::new(width, height);
    if elevation.is_empty() {
        return elevation;
    }

    let octaves = octave_count(width, height);
    let seeds = octave_seeds(config.seed, octaves);
    debug!("Octaves of noise for {}x{}: {}", width, height, octaves);

    let length = width.max(height) as f64;
    let turbulence = config.turbulence / config.energy;
    let mut scale = config.energy / length;
    let mut scale_r = 1.0 / scale;

    let (w, h) = (width as f64, height as f64);
    elevation
        .values_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = scale_r * mask.sample(x as f64, y as f64, w, h);
            }
        });

    for &seed in seeds.iter().skip(1) {
        scale *= 2.0;
        scale_r *= 0.5;

        let noise = GradientNoise2D::new(seed);
        let ((detail, turb0), turb1) = rayon::join(
            || {
                rayon::join(
                    || noise.sample_grid(width, height, scale),
                    || noise.sample_grid(width, height, scale * 3.0),
                )
            },
            || noise.sample_grid(width, height, scale * 7.0),
        );

        elevation
            .values_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, value)| {
                let turb = turb0[i].abs() * turb1[i].abs() * turbulence;
                *value += scale_r * (detail[i] + turb);
            });
    }

    elevation.normalise();
    elevation.clamp_floor_to(SEA_FLOOR, SEA_FLOOR);
    elevation.normalise();
    elevation
}

//! Layered 2D gradient noise for flat map heightmaps.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use simdnoise::NoiseBuilder;

/// Number of octaves needed for the finest octave to reach pixel detail.
///
/// The last octave is at `2^(octaves - 1)`, so `length / 2^(octaves - 1)`
/// should be at most one pixel, giving `log2(length) + 1` rounded.
pub fn octave_count(width: usize, height: usize) -> usize {
    let length = width.max(height).max(1) as f64;
    (1.5 + length.log2()) as usize
}

/// Derives one noise seed per octave from a master seed.
pub fn octave_seeds(master: u64, octaves: usize) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(master);
    (0..octaves).map(|_| rng.random::<i32>()).collect()
}

/// A single seeded 2D gradient noise function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientNoise2D {
    pub seed: i32,
}

impl GradientNoise2D {
    pub fn new(seed: i32) -> Self {
        Self { seed }
    }

    /// Samples `noise(x * frequency, y * frequency)` for every integer map
    /// position, row-major.
    ///
    /// Uses simdnoise's batch generator so the whole grid is vectorised.
    pub fn sample_grid(&self, width: usize, height: usize, frequency: f64) -> Vec<f64> {
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let (values, _, _) = NoiseBuilder::fbm_2d(width, height)
            .with_seed(self.seed)
            .with_freq(frequency as f32)
            .with_octaves(1)
            .generate();

        values.into_iter().map(f64::from).collect()
    }
}

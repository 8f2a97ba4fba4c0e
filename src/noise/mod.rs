//! Noise generation for flat map heightmaps.
//!
//! Uses simdnoise for SIMD-accelerated gradient noise.

mod layered;

pub use layered::{octave_count, octave_seeds, GradientNoise2D};

//! Surface model of the generated world.
//!
//! Provides the [`World`] definition, dense map fields, mask samplers that
//! shape the landmass, and the heightmap generator.

mod field;
mod heightmap;
mod mask;
mod world;

pub use field::Field2D;
pub use heightmap::{generate_elevation, generate_heightmap, HeightmapConfig, HeightmapError, SEA_FLOOR};
pub use mask::{
    CircleFalloff, CircleGradient, FnMask, ImageMask, InverseCircle, MaskError, MaskKind,
    MaskSampler,
};
pub use world::{MapArea, PlanetConstants, Seasons, World, WorldError, SEA_LEVEL};

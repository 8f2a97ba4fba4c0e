//! Procedural planet surface and atmosphere simulator.
//!
//! This crate generates an elevation map and direct sunlight for a
//! rectangular patch of a planet, and simulates the vertical movement of
//! air above it as a cellular automaton of stacked layers per surface cell.

pub mod atmosphere;
pub mod climate;
pub mod export;
pub mod geometry;
pub mod noise;
pub mod pipeline;
pub mod terrain;

pub use atmosphere::{GridSize, SimulationObserver, Windsim, WindsimConfig};
pub use geometry::GeoCoordinate;
pub use pipeline::{
    AtmosphereStage, GenerationStage, HeightmapStage, InsolationStage, Pipeline, RunOptions,
    StageConfig,
};
pub use terrain::{Field2D, HeightmapConfig, MapArea, PlanetConstants, Seasons, World};

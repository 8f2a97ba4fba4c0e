//! Atmosphere simulation as a cellular automaton.
//!
//! The grid is a stack of `z` layers above every `x × y` surface column.
//! Each iteration evaluates gravity and pressure forces, integrates vertical
//! velocity from the imbalance between neighbouring layers, then moves mass
//! and momentum along the flow. Columns never interact, so the driver runs
//! them in parallel.

mod cell;
mod column;
mod config;
mod driver;
mod force;
mod grid;
mod profile;
mod transport;
mod velocity;

pub use cell::Windcell;
pub use column::{initialize_column, layer_geometry, LayerGeometry};
pub use config::{GridSize, WindsimConfig, WindsimError};
pub use driver::{
    step_column, AtmosphereReport, NullObserver, RunProgress, RunState, RunSummary,
    SimulationObserver, Windsim,
};
pub use force::{evaluate_forces, gravity_at_altitude, PhysicalConstants};
pub use grid::WindGrid;
pub use profile::{Profile, ProfileCell, ProfileContext};
pub use transport::transport_mass;
pub use velocity::integrate_velocity;

//! Orchestrates force, velocity and mass sweeps over every column.

use std::time::{Duration, Instant};

use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cell::Windcell;
use super::column::{initialize_column, LayerGeometry};
use super::config::{WindsimConfig, WindsimError};
use super::force::{evaluate_forces, PhysicalConstants};
use super::grid::WindGrid;
use super::profile::{Profile, ProfileContext};
use super::transport::transport_mass;
use super::velocity::integrate_velocity;
use crate::terrain::{PlanetConstants, World};

/// Where a run is in its fixed iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Cells are seeded; no iteration has run yet.
    Initialized,
    /// `iteration` is the last completed iteration.
    Running { iteration: usize },
    Done,
}

/// Reported every `progress_interval` iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunProgress {
    pub iteration: usize,
    pub iterations: usize,
    /// kg
    pub total_mass: f64,
    /// Largest `|velocity.z|` after this iteration, in m/s.
    pub peak_vertical_speed: f64,
}

/// Outcome of [`Windsim::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Iterations executed by this call.
    pub iterations: usize,
    /// Snapshots handed to the observer by this call.
    pub snapshots: usize,
    pub initial_mass: f64,
    pub final_mass: f64,
    /// Largest `|velocity.z|` seen at any point of the run, in m/s.
    pub peak_vertical_speed: f64,
    pub elapsed: Duration,
}

/// Outcome of the last atmosphere run over a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereReport {
    pub summary: RunSummary,
    /// Last snapshot of column `(0, 0)`.
    pub profile: Profile,
}

/// Receives diagnostics while a simulation runs.
///
/// Both hooks are called on the driving thread after the parallel column
/// sweep of an iteration has finished.
pub trait SimulationObserver {
    fn on_progress(&mut self, _progress: &RunProgress) {}

    fn on_snapshot(
        &mut self,
        _profile: &Profile,
        _context: &ProfileContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Runs the three phases on one column and returns its peak vertical speed.
pub fn step_column(column: &mut [Windcell], constants: &PhysicalConstants) -> f64 {
    evaluate_forces(column, constants);
    integrate_velocity(column);
    transport_mass(column);

    debug_assert!(column.iter().all(Windcell::is_finite), "non-finite atmosphere cell");
    column.iter().map(|c| c.velocity.z.abs()).fold(0.0, f64::max)
}

/// The atmosphere simulation: configuration, grid and run progress.
pub struct Windsim {
    config: WindsimConfig,
    constants: PhysicalConstants,
    context: ProfileContext,
    layers: Vec<LayerGeometry>,
    grid: WindGrid,
    profile: Profile,
    completed: usize,
    initial_mass: f64,
    peak_speed: f64,
}

impl Windsim {
    /// Validates the configuration, allocates the grid and seeds every
    /// column. `map` is the surface extent in metres covered by the grid.
    pub fn new(config: WindsimConfig, planet: &PlanetConstants, map: DVec2) -> Result<Self, WindsimError> {
        let layers = config.layer_geometry(planet, map)?;
        let size = config.size;

        let mut grid = WindGrid::try_new(size)?;
        for column in grid.columns_mut() {
            initialize_column(column, &layers, &config);
        }
        let profile = Profile::with_layers(size.z)?;

        let initial_mass = grid.total_mass();
        debug!(
            "Initialised {}x{}x{} atmosphere cells, {:.3e} kg of air",
            size.x, size.y, size.z, initial_mass
        );

        Ok(Self {
            constants: PhysicalConstants {
                radius: planet.radius,
                gravity: planet.gravity,
                gas_constant: config.gas_constant,
            },
            context: ProfileContext {
                radius: planet.radius,
                gravity: planet.gravity,
                height: config.height,
            },
            config,
            layers,
            grid,
            profile,
            completed: 0,
            initial_mass,
            peak_speed: 0.0,
        })
    }

    /// Builds a simulation over the map area of `world`.
    pub fn for_world(config: WindsimConfig, world: &World) -> Result<Self, WindsimError> {
        Self::new(config, &world.planet, world.area.dimension.truncate())
    }

    pub fn config(&self) -> &WindsimConfig {
        &self.config
    }

    pub fn context(&self) -> &ProfileContext {
        &self.context
    }

    pub fn grid(&self) -> &WindGrid {
        &self.grid
    }

    /// Geometry shared by every column, floor first.
    pub fn layers(&self) -> &[LayerGeometry] {
        &self.layers
    }

    /// The most recent snapshot; empty until the first snapshot iteration.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> RunState {
        if self.completed >= self.config.iterations {
            RunState::Done
        } else if self.completed == 0 {
            RunState::Initialized
        } else {
            RunState::Running { iteration: self.completed - 1 }
        }
    }

    /// Largest `|velocity.z|` seen so far.
    pub fn peak_vertical_speed(&self) -> f64 {
        self.peak_speed
    }

    fn is_snapshot(&self, iteration: usize) -> bool {
        let interval = self.config.snapshot_interval;
        interval > 0 && iteration % interval == 0
    }

    fn is_progress(&self, iteration: usize) -> bool {
        let interval = self.config.progress_interval;
        interval > 0 && iteration % interval == 0
    }

    /// Runs one iteration over every column.
    ///
    /// Returns the index of the iteration that ran, or `None` once the run is
    /// done. On snapshot iterations the profile of column `(0, 0)` is
    /// recorded after all columns have finished.
    pub fn step(&mut self) -> Option<usize> {
        if self.completed >= self.config.iterations {
            return None;
        }
        let iteration = self.completed;
        let constants = self.constants;

        let peak = if self.config.parallel {
            self.grid
                .par_columns_mut()
                .map(|column| step_column(column, &constants))
                .reduce(|| 0.0, f64::max)
        } else {
            self.grid
                .columns_mut()
                .map(|column| step_column(column, &constants))
                .fold(0.0, f64::max)
        };
        self.peak_speed = self.peak_speed.max(peak);
        self.completed += 1;

        if self.is_snapshot(iteration) {
            if let Some(column) = self.grid.column(0, 0) {
                self.profile.record(
                    column,
                    self.constants.gas_constant,
                    iteration,
                    self.config.iterations,
                );
            }
        }

        Some(iteration)
    }

    /// Runs every remaining iteration, reporting to `observer`.
    pub fn run<O>(&mut self, observer: &mut O) -> Result<RunSummary, WindsimError>
    where
        O: SimulationObserver + ?Sized,
    {
        let size = self.config.size;
        let iterations = self.config.iterations;
        info!(
            "Wind simulation: {} iterations over {}x{}x{} cells",
            iterations, size.x, size.y, size.z
        );

        let start = Instant::now();
        let first = self.completed;
        let mut snapshots = 0;

        while let Some(iteration) = self.step() {
            if self.is_snapshot(iteration) {
                debug!("Snapshot {}", self.profile.label);
                observer
                    .on_snapshot(&self.profile, &self.context)
                    .map_err(WindsimError::Observer)?;
                snapshots += 1;
            }

            if self.is_progress(iteration) {
                let progress = RunProgress {
                    iteration,
                    iterations,
                    total_mass: self.grid.total_mass(),
                    peak_vertical_speed: self.grid.peak_vertical_speed(),
                };
                info!(
                    "Windsim: {}/{} mass {:.6e} kg, peak |v| {:.3} m/s",
                    iteration,
                    iterations.saturating_sub(1),
                    progress.total_mass,
                    progress.peak_vertical_speed
                );
                observer.on_progress(&progress);
            }
        }

        let summary = RunSummary {
            iterations: self.completed - first,
            snapshots,
            initial_mass: self.initial_mass,
            final_mass: self.grid.total_mass(),
            peak_vertical_speed: self.peak_speed,
            elapsed: start.elapsed(),
        };
        info!(
            "Wind simulation finished: {} iterations, {} snapshots in {:.2?}",
            summary.iterations, summary.snapshots, summary.elapsed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::GridSize;

    fn small(iterations: usize) -> WindsimConfig {
        WindsimConfig {
            size: GridSize::new(2, 1, 6),
            iterations,
            snapshot_interval: 5,
            progress_interval: 4,
            ..WindsimConfig::default()
        }
    }

    fn sim(config: WindsimConfig) -> Windsim {
        Windsim::new(config, &PlanetConstants::earth_like(), DVec2::new(2000.0, 1000.0)).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        labels: Vec<String>,
        progress: Vec<usize>,
    }

    impl SimulationObserver for Recorder {
        fn on_progress(&mut self, progress: &RunProgress) {
            self.progress.push(progress.iteration);
        }

        fn on_snapshot(
            &mut self,
            profile: &Profile,
            _context: &ProfileContext,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.labels.push(profile.label.clone());
            Ok(())
        }
    }

    #[test]
    fn state_moves_through_run() {
        let mut s = sim(small(3));
        assert_eq!(s.state(), RunState::Initialized);
        assert_eq!(s.step(), Some(0));
        assert_eq!(s.state(), RunState::Running { iteration: 0 });
        s.step();
        s.step();
        assert_eq!(s.state(), RunState::Done);
        assert_eq!(s.step(), None);
    }

    #[test]
    fn zero_iterations_is_done_immediately() {
        let mut s = sim(small(0));
        assert_eq!(s.state(), RunState::Done);
        let summary = s.run(&mut NullObserver).unwrap();
        assert_eq!(summary.iterations, 0);
    }

    #[test]
    fn observer_sees_snapshots_and_progress() {
        let mut s = sim(small(11));
        let mut recorder = Recorder::default();
        let summary = s.run(&mut recorder).unwrap();

        assert_eq!(recorder.labels, vec!["iteration 0/10", "iteration 5/10", "iteration 10/10"]);
        assert_eq!(recorder.progress, vec![0, 4, 8]);
        assert_eq!(summary.iterations, 11);
        assert_eq!(summary.snapshots, 3);
        assert_eq!(s.profile().iteration, 10);
        assert_eq!(s.profile().layers(), 6);
    }

    #[test]
    fn observer_errors_stop_the_run() {
        struct Failing;
        impl SimulationObserver for Failing {
            fn on_snapshot(
                &mut self,
                _profile: &Profile,
                _context: &ProfileContext,
            ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("disk full".into())
            }
        }

        let mut s = sim(small(20));
        let err = s.run(&mut Failing).unwrap_err();
        assert!(matches!(err, WindsimError::Observer(_)));
        assert_eq!(s.state(), RunState::Running { iteration: 0 });
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let mut a = sim(WindsimConfig { parallel: true, ..small(30) });
        let mut b = sim(WindsimConfig { parallel: false, ..small(30) });
        a.run(&mut NullObserver).unwrap();
        b.run(&mut NullObserver).unwrap();
        assert_eq!(a.grid().cells(), b.grid().cells());
    }

    #[test]
    fn rejects_invalid_map() {
        let err = Windsim::new(small(1), &PlanetConstants::earth_like(), DVec2::new(0.0, 10.0));
        assert!(matches!(err, Err(WindsimError::InvalidParameter { name: "map_width", .. })));
    }
}

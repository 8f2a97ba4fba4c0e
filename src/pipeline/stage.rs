//! Generation stage trait and pipeline orchestration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::atmosphere::{
    AtmosphereReport, NullObserver, RunSummary, SimulationObserver, Windsim, WindsimConfig,
};
use crate::climate::calculate_direct_solar_radiation;
use crate::export::{ProfileExportOptions, ProfileExporter};
use crate::terrain::{generate_heightmap, HeightmapConfig, World};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Elevation from layered noise.
    Heightmap,
    /// Direct sunlight for a point in the orbit.
    Insolation,
    /// Atmosphere cellular automaton.
    Atmosphere,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Heightmap => "heightmap",
            StageId::Insolation => "insolation",
            StageId::Atmosphere => "atmosphere",
        }
    }
}

/// Configuration passed to each generation stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub heightmap: HeightmapConfig,
    /// Point in the yearly orbit, 0.0 to 1.0, used for insolation.
    pub orbit: f64,
    pub windsim: WindsimConfig,
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the world in some way, building upon previous
/// stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the world in place.
    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Executes all stages in order on the given world.
    pub fn run(&self, world: &mut World) -> Result<(), PipelineError> {
        self.run_with_callbacks(world, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `world` - The world to generate
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        world: &mut World,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            debug!("Stage {}/{}: {}", i + 1, total, stage.name());
            stage.execute(world, &self.config)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

fn failed(stage: &dyn GenerationStage, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::StageFailed(stage.name().to_string(), err.to_string())
}

/// Heightmap generation stage using layered noise.
pub struct HeightmapStage;

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Heightmap Generation"
    }

    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError> {
        generate_heightmap(world, &config.heightmap).map_err(|e| failed(self, e))?;
        debug!("Land covers {:.1}% of the map", world.land_proportion() * 100.0);
        Ok(())
    }
}

/// Direct solar radiation stage.
pub struct InsolationStage;

impl GenerationStage for InsolationStage {
    fn id(&self) -> StageId {
        StageId::Insolation
    }

    fn name(&self) -> &str {
        "Direct Solar Radiation"
    }

    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError> {
        calculate_direct_solar_radiation(world, config.orbit).map_err(|e| failed(self, e))?;
        Ok(())
    }
}

/// Atmosphere simulation stage.
///
/// Runs the wind simulation over the world's map area and stores the
/// outcome in [`World::atmosphere`]. With an output directory set, every
/// snapshot is also written out as a graph and CSV rows.
#[derive(Debug, Clone, Default)]
pub struct AtmosphereStage {
    pub output_dir: Option<PathBuf>,
    pub export: ProfileExportOptions,
}

impl AtmosphereStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes snapshots into `output_dir`.
    pub fn with_output(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
            ..Self::default()
        }
    }

    fn simulate(
        &self,
        sim: &mut Windsim,
        observer: &mut dyn SimulationObserver,
    ) -> Result<RunSummary, PipelineError> {
        sim.run(observer).map_err(|e| failed(self, e))
    }
}

impl GenerationStage for AtmosphereStage {
    fn id(&self) -> StageId {
        StageId::Atmosphere
    }

    fn name(&self) -> &str {
        "Atmosphere Simulation"
    }

    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError> {
        let mut sim = Windsim::for_world(config.windsim.clone(), world).map_err(|e| failed(self, e))?;

        let summary = match &self.output_dir {
            Some(dir) => {
                let mut exporter = ProfileExporter::create(dir, self.export.clone())
                    .map_err(|e| failed(self, e))?;
                let summary = self.simulate(&mut sim, &mut exporter)?;
                exporter.finish().map_err(|e| failed(self, e))?;
                summary
            }
            None => self.simulate(&mut sim, &mut NullObserver)?,
        };

        world.atmosphere = Some(AtmosphereReport {
            summary,
            profile: sim.profile().clone(),
        });
        Ok(())
    }
}

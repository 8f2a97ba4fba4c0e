//! Pipeline module for orchestrating world generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that can be composed into a complete generation pipeline, plus the
//! JSON run description the command line builds pipelines from.

mod options;
mod stage;

pub use options::{OptionsError, RunOptions};
pub use stage::{
    AtmosphereStage, GenerationStage, HeightmapStage, InsolationStage, Pipeline,
    PipelineError, StageConfig, StageId,
};

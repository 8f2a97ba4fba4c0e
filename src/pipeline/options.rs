//! Complete run description loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::StageConfig;
use crate::atmosphere::WindsimConfig;
use crate::terrain::{HeightmapConfig, MapArea, PlanetConstants, Seasons, World, WorldError};

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid world definition: {0}")]
    World(#[from] WorldError),
}

/// Everything needed to generate a world and run its atmosphere.
///
/// Missing fields take their Earth-like defaults, so a file only has to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub planet: PlanetConstants,
    pub seasons: Seasons,
    pub area: MapArea,
    pub heightmap: HeightmapConfig,
    pub orbit: f64,
    pub windsim: WindsimConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            name: "planet".to_string(),
            width: 512,
            height: 512,
            planet: PlanetConstants::earth_like(),
            seasons: Seasons::earth_like(),
            area: MapArea::default(),
            heightmap: HeightmapConfig::default(),
            orbit: 0.0,
            windsim: WindsimConfig::default(),
        }
    }
}

impl RunOptions {
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validates the world definitions and creates an empty world.
    pub fn build_world(&self) -> Result<World, OptionsError> {
        Ok(World::new(
            self.name.clone(),
            self.width,
            self.height,
            self.planet,
            self.seasons,
            self.area,
        )?)
    }

    pub fn stage_config(&self) -> StageConfig {
        StageConfig {
            heightmap: self.heightmap.clone(),
            orbit: self.orbit,
            windsim: self.windsim.clone(),
        }
    }
}

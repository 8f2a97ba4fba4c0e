//! The world being generated: planet constants, map area, and surface fields.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::field::Field2D;
use crate::atmosphere::AtmosphereReport;
use crate::geometry::GeoCoordinate;

/// Normalised elevation at or above which a map cell counts as land.
pub const SEA_LEVEL: f64 = 0.15;

/// Errors raised when defining a world.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("Invalid planet parameter '{name}': {value} (must be > 0)")]
    InvalidPlanet { name: &'static str, value: f64 },
    #[error("Invalid season parameter '{name}': {value} (expected {range})")]
    InvalidSeasons { name: &'static str, value: f64, range: &'static str },
    #[error("Invalid map area: {0}")]
    InvalidArea(String),
    #[error("Invalid map resolution {0}x{1}")]
    InvalidResolution(usize, usize),
}

/// Physical constants of the planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConstants {
    /// Radius in metres.
    pub radius: f64,
    /// Gravity at the surface in m/s².
    pub gravity: f64,
    /// Distance from the star in astronomical units.
    pub distance_from_sun_au: f64,
    /// Luminosity relative to our sun (1.0 ≈ 3.846×10²⁶ W).
    pub solar_luminosity: f64,
}

impl Default for PlanetConstants {
    fn default() -> Self {
        Self::earth_like()
    }
}

impl PlanetConstants {
    pub fn earth_like() -> Self {
        Self {
            radius: 6_371_000.0,
            gravity: 9.81,
            distance_from_sun_au: 1.0,
            solar_luminosity: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        for (name, value) in [
            ("radius", self.radius),
            ("gravity", self.gravity),
            ("distance_from_sun_au", self.distance_from_sun_au),
            ("solar_luminosity", self.solar_luminosity),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(WorldError::InvalidPlanet { name, value });
            }
        }
        Ok(())
    }

    pub fn circumference(&self) -> f64 {
        std::f64::consts::TAU * self.radius
    }
}

/// Seasonal parameters of the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seasons {
    /// Axial tilt in degrees; Earth is about 23.5.
    pub axial_tilt_deg: f64,
    /// Point in the orbit (0..1) of the northern solstice; Earth is at 0.222.
    pub northern_solstice: f64,
}

impl Default for Seasons {
    fn default() -> Self {
        Self::earth_like()
    }
}

impl Seasons {
    pub fn earth_like() -> Self {
        Self { axial_tilt_deg: 23.5, northern_solstice: 0.222 }
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        if !(-180.0..=180.0).contains(&self.axial_tilt_deg) {
            return Err(WorldError::InvalidSeasons {
                name: "axial_tilt_deg",
                value: self.axial_tilt_deg,
                range: "-180..=180",
            });
        }
        if !(-1.0..=1.0).contains(&self.northern_solstice) {
            return Err(WorldError::InvalidSeasons {
                name: "northern_solstice",
                value: self.northern_solstice,
                range: "-1..=1",
            });
        }
        Ok(())
    }
}

/// The patch of the planet surface covered by the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapArea {
    /// Centre of the map on the sphere.
    pub center: GeoCoordinate,
    /// Surface extent in metres: x left/right, y top/bottom, z floor/ceiling.
    pub dimension: DVec3,
}

impl Default for MapArea {
    fn default() -> Self {
        Self {
            center: GeoCoordinate { latitude: 51.5, longitude: -0.133 },
            dimension: DVec3::new(1_000_000.0, 1_000_000.0, 50_000.0),
        }
    }
}

impl MapArea {
    pub fn validate(&self, planet: &PlanetConstants) -> Result<(), WorldError> {
        let d = self.dimension;
        if !(d.x > 0.0 && d.y > 0.0 && d.z > 0.0) {
            return Err(WorldError::InvalidArea(format!(
                "dimension must be positive, got {:?}",
                d
            )));
        }
        let circumference = planet.circumference();
        if d.x > circumference || d.y > circumference {
            return Err(WorldError::InvalidArea(format!(
                "dimension {:?} exceeds the planet circumference {:.0} m",
                d, circumference
            )));
        }
        if d.z > 50_000.0 {
            return Err(WorldError::InvalidArea(format!(
                "dimension.z of {} m is too large for an atmosphere simulation (max 50 km)",
                d.z
            )));
        }
        Ok(())
    }
}

/// A generated world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    pub planet: PlanetConstants,
    pub seasons: Seasons,
    pub area: MapArea,
    /// Elevation normalised to `[0, 1]` (populated by the heightmap stage).
    pub elevation: Field2D,
    /// Direct insolation normalised to `[0, 1]` (populated by the insolation stage).
    pub sunlight: Field2D,
    /// Outcome of the last atmosphere run, if any.
    #[serde(default)]
    pub atmosphere: Option<AtmosphereReport>,
}

impl World {
    /// Creates an empty world of `width × height` map cells after validating
    /// every definition.
    pub fn new(
        name: impl Into<String>,
        width: usize,
        height: usize,
        planet: PlanetConstants,
        seasons: Seasons,
        area: MapArea,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidResolution(width, height));
        }
        planet.validate()?;
        seasons.validate()?;
        area.validate(&planet)?;

        Ok(Self {
            name: name.into(),
            planet,
            seasons,
            area,
            elevation: Field2D::new(width, height),
            sunlight: Field2D::new(width, height),
            atmosphere: None,
        })
    }

    /// An Earth-like world with the default map area.
    pub fn earth_like(width: usize, height: usize) -> Result<Self, WorldError> {
        Self::new(
            "earth-like",
            width,
            height,
            PlanetConstants::earth_like(),
            Seasons::earth_like(),
            MapArea::default(),
        )
    }

    pub fn width(&self) -> usize {
        self.elevation.width()
    }

    pub fn height(&self) -> usize {
        self.elevation.height()
    }

    /// Fraction of the map at or above sea level.
    pub fn land_proportion(&self) -> f64 {
        self.elevation.proportion_at_or_above(SEA_LEVEL)
    }

    pub fn landmass_at_top_edge(&self) -> bool {
        (0..self.width()).any(|x| self.elevation.get(x, 0) >= SEA_LEVEL)
    }

    pub fn landmass_at_bottom_edge(&self) -> bool {
        let y = self.height() - 1;
        (0..self.width()).any(|x| self.elevation.get(x, y) >= SEA_LEVEL)
    }

    pub fn landmass_at_left_edge(&self) -> bool {
        (0..self.height()).any(|y| self.elevation.get(0, y) >= SEA_LEVEL)
    }

    pub fn landmass_at_right_edge(&self) -> bool {
        let x = self.width() - 1;
        (0..self.height()).any(|y| self.elevation.get(x, y) >= SEA_LEVEL)
    }

    /// True when land touches any border of the map.
    pub fn landmass_at_any_edge(&self) -> bool {
        self.landmass_at_top_edge()
            || self.landmass_at_bottom_edge()
            || self.landmass_at_left_edge()
            || self.landmass_at_right_edge()
    }
}

//! Direct solar radiation over the map.
//!
//! Models sunshine only; diffuse radiation from atmospheric scattering
//! depends on local cloud cover and is left out. After W. B. Stine and
//! M. Geyer, "The Sun's Energy", *Power From The Sun*, 2001.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::terrain::{Field2D, MapArea, PlanetConstants, Seasons, World};

/// Luminosity of our sun in watts.
pub const SOLAR_LUMINOSITY_WATTS: f64 = 3.846e26;

/// One astronomical unit in metres.
pub const ASTRONOMICAL_UNIT_METRES: f64 = 1.496e11;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsolationError {
    #[error("Orbit position {0} is outside 0.0..=1.0")]
    InvalidOrbit(f64),
}

/// Radiance range of the last calculation, in W/m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsolationSummary {
    pub orbit: f64,
    pub incident: f64,
    pub low: f64,
    pub high: f64,
}

/// Radiance on a surface at the planet's edge facing the sun, from the
/// inverse square law.
pub fn incident_radiance(planet: &PlanetConstants) -> f64 {
    let luminosity = planet.solar_luminosity * SOLAR_LUMINOSITY_WATTS;
    let distance = planet.distance_from_sun_au * ASTRONOMICAL_UNIT_METRES - planet.radius;
    luminosity / (4.0 * std::f64::consts::PI * distance * distance)
}

/// Solar declination in radians at `orbit` (0.0 to 1.0 through the year).
pub fn declination(seasons: &Seasons, orbit: f64) -> f64 {
    let tilt = seasons.axial_tilt_deg.to_radians();
    (tilt.sin() * (std::f64::consts::TAU * (orbit - seasons.northern_solstice)).sin()).asin()
}

/// Latitude in degrees of map row `y` out of `rows`; row 0 is the northern edge.
pub fn row_latitude(planet: &PlanetConstants, area: &MapArea, y: usize, rows: usize) -> f64 {
    let y_range = y as f64 / rows as f64;
    let y_offset = (y_range - 0.5) * area.dimension.y;
    area.center.translate(planet.radius, y_offset, 180.0).latitude
}

/// Radiance at noon on map row `y`, before normalisation.
pub fn row_radiance(
    incident: f64,
    planet: &PlanetConstants,
    area: &MapArea,
    delta: f64,
    y: usize,
    rows: usize,
) -> f64 {
    let phi = row_latitude(planet, area, y, rows).to_radians();
    let angle = std::f64::consts::FRAC_PI_2 - phi + delta;
    incident * angle.sin()
}

/// Fills `sunlight` with direct radiation for `orbit`, normalised so the
/// brightest row is `1.0`.
pub fn direct_solar_radiation(
    sunlight: &mut Field2D,
    orbit: f64,
    planet: &PlanetConstants,
    seasons: &Seasons,
    area: &MapArea,
) -> Result<InsolationSummary, InsolationError> {
    if !(0.0..=1.0).contains(&orbit) {
        return Err(InsolationError::InvalidOrbit(orbit));
    }

    let incident = incident_radiance(planet);
    let delta = declination(seasons, orbit);
    let (width, rows) = (sunlight.width(), sunlight.height());

    sunlight
        .values_mut()
        .par_chunks_mut(width.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            row.fill(row_radiance(incident, planet, area, delta, y, rows));
        });

    sunlight.normalise_maximum();

    let summary = InsolationSummary {
        orbit,
        incident,
        low: sunlight.minimum,
        high: sunlight.maximum,
    };
    debug!(
        "Orbit {:.3}/1.0 radiance (W/m²): low={:.2} high={:.2} (incident={:.2})",
        orbit, summary.low, summary.high, summary.incident
    );
    Ok(summary)
}

/// Recomputes the world's sunlight field for `orbit`.
pub fn calculate_direct_solar_radiation(
    world: &mut World,
    orbit: f64,
) -> Result<InsolationSummary, InsolationError> {
    let World { planet, seasons, area, sunlight, .. } = world;
    direct_solar_radiation(sunlight, orbit, planet, seasons, area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoCoordinate;
    use approx::assert_relative_eq;

    fn equatorial_area() -> MapArea {
        MapArea {
            center: GeoCoordinate { latitude: 0.0, longitude: 0.0 },
            ..MapArea::default()
        }
    }

    #[test]
    fn earth_incident_radiance_is_near_solar_constant() {
        let incident = incident_radiance(&PlanetConstants::earth_like());
        assert!(incident > 1360.0 && incident < 1375.0, "got {}", incident);
    }

    #[test]
    fn declination_peaks_at_solstice() {
        let seasons = Seasons::earth_like();
        let summer = declination(&seasons, seasons.northern_solstice + 0.25);
        assert_relative_eq!(summer.to_degrees(), 23.5, max_relative = 1e-9);
        let equinox = declination(&seasons, seasons.northern_solstice);
        assert!(equinox.abs() < 1e-12);
    }

    #[test]
    fn top_row_is_north_of_bottom_row() {
        let planet = PlanetConstants::earth_like();
        let area = equatorial_area();
        assert!(row_latitude(&planet, &area, 0, 10) > row_latitude(&planet, &area, 9, 10));
        assert!(row_latitude(&planet, &area, 5, 10).abs() < 1e-9);
    }

    #[test]
    fn northern_map_is_brighter_in_northern_summer() {
        let planet = PlanetConstants::earth_like();
        let seasons = Seasons::earth_like();
        let area = MapArea::default();
        let incident = incident_radiance(&planet);

        let summer = declination(&seasons, seasons.northern_solstice + 0.25);
        let winter = declination(&seasons, seasons.northern_solstice + 0.75);
        let rows = 8;
        assert!(
            row_radiance(incident, &planet, &area, summer, 4, rows)
                > row_radiance(incident, &planet, &area, winter, 4, rows)
        );
    }

    #[test]
    fn field_is_normalised_and_uniform_along_rows() {
        let mut world = World::earth_like(16, 8).unwrap();
        let summary = calculate_direct_solar_radiation(&mut world, 0.5).unwrap();
        assert!(summary.high > 0.0);

        let (_, max) = world.sunlight.range();
        assert_relative_eq!(max, 1.0);
        for row in world.sunlight.rows() {
            assert!(row.iter().all(|&v| v == row[0]));
            assert!((0.0..=1.0).contains(&row[0]));
        }
    }

    #[test]
    fn rejects_orbit_outside_year() {
        let mut world = World::earth_like(4, 4).unwrap();
        assert_eq!(
            calculate_direct_solar_radiation(&mut world, 1.5),
            Err(InsolationError::InvalidOrbit(1.5))
        );
    }
}

//! Climate inputs derived from the planet's orbit.

mod insolation;

pub use insolation::{
    calculate_direct_solar_radiation, declination, direct_solar_radiation, incident_radiance,
    row_latitude, row_radiance, InsolationError, InsolationSummary, ASTRONOMICAL_UNIT_METRES,
    SOLAR_LUMINOSITY_WATTS,
};

//! Spherical geometry.
//!
//! Provides geographic coordinates on the planet surface and the layer
//! geometry of air cells stacked above a curved surface.

mod curvature;
mod geocoord;

pub use curvature::{layer_depths, layer_midpoints, triangle_extended_opposite};
pub use geocoord::{presets, GeoCoordinate, GeoCoordinateError};

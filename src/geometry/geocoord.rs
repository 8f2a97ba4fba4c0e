//! Latitude/longitude parsing and great-circle helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named reference points, in the sexagesimal form accepted by [`GeoCoordinate::parse`].
pub mod presets {
    pub const UK: &str = "51°30′N 0°08′W";
    pub const RUSSIA: &str = "55°45′N 37°37′E";
    pub const USA: &str = "38°53′42.4″N 77°02′12.0″W";
    pub const AUSTRALIA: &str = "35°18.48′S 149°7.47′E";
    pub const BRAZIL: &str = "15°47′S 47°52′W";
    pub const SOUTH_AFRICA: &str = "26°12′16″S 28°2′44″E";
    pub const CHINA: &str = "39°55′N 116°23′E";
    pub const GREECE: &str = "37°58′N 23°43′E";
    pub const ITALY: &str = "41°54′N 12°29′E";
    pub const ICELAND: &str = "64°08′N 21°56′W";
    pub const EGYPT: &str = "30°2′N 31°13′E";
    pub const KAZAKHSTAN: &str = "51°10′N 71°25′E";
    pub const INDIA: &str = "28°36.8′N 77°12.5′E";
}

/// Errors produced while parsing a coordinate string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoCoordinateError {
    #[error("expected a latitude and a longitude separated by whitespace, got '{0}'")]
    MissingComponent(String),
    #[error("unexpected character '{found}' in '{input}'")]
    UnexpectedCharacter { input: String, found: char },
    #[error("degree, minute and second units out of order in '{0}'")]
    UnitOrder(String),
    #[error("invalid cardinal direction '{found}', expected one of {expected}")]
    Cardinal { found: char, expected: &'static str },
    #[error("invalid number in '{0}'")]
    Number(String),
    #[error("{axis} of {value}° is out of range")]
    OutOfRange { axis: &'static str, value: f64 },
}

/// A point on a sphere in decimal degrees.
///
/// Latitude is positive north of the equator, longitude positive east of the
/// prime meridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self { latitude: 0.0, longitude: 0.0 }
    }
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoCoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoCoordinateError::OutOfRange { axis: "latitude", value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoCoordinateError::OutOfRange { axis: "longitude", value: longitude });
        }
        Ok(Self { latitude, longitude })
    }

    /// Parses a coordinate pair.
    ///
    /// Accepted forms:
    /// - `51°30′26″N 0°7′39″W` (also with ASCII `'` and `''`)
    /// - `23°27.500′N 23°27.500′E`
    /// - `+12.34 -98.76`
    pub fn parse(input: &str) -> Result<Self, GeoCoordinateError> {
        let mut parts = input.split_whitespace();
        let (lat, lon) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lon), None) => (lat, lon),
            _ => return Err(GeoCoordinateError::MissingComponent(input.to_string())),
        };

        let latitude = parse_angle(lat, ('N', 'S'), "N or S")?;
        let longitude = parse_angle(lon, ('E', 'W'), "E or W")?;
        Self::new(latitude, longitude)
    }

    /// Great-circle distance to `other` on a sphere of `radius` (haversine).
    pub fn distance(&self, radius: f64, other: &GeoCoordinate) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = phi2 - phi1;
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let h = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let h = h.clamp(0.0, 1.0);

        radius * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }

    /// Moves `distance` metres along the great circle leaving at `bearing_deg`
    /// (clockwise from north).
    pub fn translate(&self, radius: f64, distance: f64, bearing_deg: f64) -> GeoCoordinate {
        let bearing = bearing_deg.to_radians();
        let delta = distance / radius;
        let phi1 = self.latitude.to_radians();
        let lambda1 = self.longitude.to_radians();

        let sin_phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * bearing.cos())
            .clamp(-1.0, 1.0);
        let phi2 = sin_phi2.asin();
        let lambda2 = lambda1
            + (bearing.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

        GeoCoordinate {
            latitude: phi2.to_degrees(),
            longitude: wrap_longitude(lambda2.to_degrees()),
        }
    }
}

impl FromStr for GeoCoordinate {
    type Err = GeoCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(f, "{:.4}°{} {:.4}°{}", self.latitude.abs(), ns, self.longitude.abs(), ew)
    }
}

fn wrap_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 { 180.0 } else { wrapped }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Unit {
    Degree,
    Minute,
    Second,
}

impl Unit {
    fn divisor(self) -> f64 {
        match self {
            Unit::Degree => 1.0,
            Unit::Minute => 60.0,
            Unit::Second => 3600.0,
        }
    }
}

/// Parses one axis, e.g. `51°30′26.5″N`, `-12.5`, or `12.5E`.
fn parse_angle(
    input: &str,
    cardinals: (char, char),
    expected: &'static str,
) -> Result<f64, GeoCoordinateError> {
    let mut chars = input.chars().peekable();
    let mut negative = false;
    let mut total = 0.0;
    let mut last_unit: Option<Unit> = None;
    let mut fractional_seen = false;
    let mut cardinal: Option<char> = None;

    if let Some(&c) = chars.peek() {
        if c == '+' || c == '-' {
            negative = c == '-';
            chars.next();
        }
    }

    while let Some(&c) = chars.peek() {
        if cardinal.is_some() {
            return Err(GeoCoordinateError::UnexpectedCharacter { input: input.to_string(), found: c });
        }

        if c.is_ascii_digit() {
            if fractional_seen {
                return Err(GeoCoordinateError::UnitOrder(input.to_string()));
            }
            let mut number = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    number.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = number
                .parse()
                .map_err(|_| GeoCoordinateError::Number(input.to_string()))?;
            fractional_seen = number.contains('.');

            let unit = match chars.peek() {
                Some('°') => {
                    chars.next();
                    Unit::Degree
                }
                Some('′') => {
                    chars.next();
                    Unit::Minute
                }
                Some('″') | Some('"') => {
                    chars.next();
                    Unit::Second
                }
                Some('\'') => {
                    chars.next();
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        Unit::Second
                    } else {
                        Unit::Minute
                    }
                }
                // A bare number is a decimal degree value.
                _ => Unit::Degree,
            };

            if let Some(previous) = last_unit {
                if unit <= previous {
                    return Err(GeoCoordinateError::UnitOrder(input.to_string()));
                }
            }
            last_unit = Some(unit);
            total += value / unit.divisor();
            continue;
        }

        if c.is_ascii_alphabetic() {
            if c == cardinals.0 {
                cardinal = Some(c);
            } else if c == cardinals.1 {
                cardinal = Some(c);
                negative = !negative;
            } else {
                return Err(GeoCoordinateError::Cardinal { found: c, expected });
            }
            chars.next();
            continue;
        }

        return Err(GeoCoordinateError::UnexpectedCharacter { input: input.to_string(), found: c });
    }

    if last_unit.is_none() {
        return Err(GeoCoordinateError::Number(input.to_string()));
    }

    Ok(if negative { -total } else { total })
}

//! Geographic coordinate validation

use serde::{Deserialize, Serialize};

use crate::{PvcastError, Result};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A validated latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting values outside the legal range
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(PvcastError::invalid_input(format!(
                "latitude {latitude} must be between {MIN_LATITUDE} and {MAX_LATITUDE}"
            )));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(PvcastError::invalid_input(format!(
                "longitude {longitude} must be between {MIN_LONGITUDE} and {MAX_LONGITUDE}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse raw query values into a validated coordinate
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_degrees("latitude", latitude)?;
        let lon = parse_degrees("longitude", longitude)?;
        Self::new(lat, lon)
    }

    /// Format coordinates as a short display string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn parse_degrees(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PvcastError::invalid_input(format!("{name} '{raw}' is not a number")))
}

/// Returns true when both values parse as numbers within the legal range.
/// Never fails: unparseable input is simply invalid.
#[must_use]
pub fn is_valid_geolocation(latitude: &str, longitude: &str) -> bool {
    GeoCoordinate::parse(latitude, longitude).is_ok()
}

//! Geographic primitives: coordinates, great-circle distance and route shapes.
//!
//! This module provides:
//!
//! - **Coordinate**: validated lat/lng pair in degrees
//! - **Distance calculations**: Haversine distance on a spherical Earth
//! - **Interpolation**: straight-line points between two coordinates
//! - **Path encoding**: `lat,lng|lat,lng|...` text form and its exact inverse
//!
//! Distances are great-circle, not road-network. Good enough for city-scale estimates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RideError};

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const POINT_SEPARATOR: char = '|';
const AXIS_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside lat [-90, 90] / lng [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coordinate = Self { lat, lng };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(RideError::invalid(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(RideError::invalid(format!(
                "longitude {} outside [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Shift by the given degrees, clamped back into the valid range.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: (self.lat + d_lat).clamp(-90.0, 90.0),
            lng: (self.lng + d_lng).clamp(-180.0, 180.0),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{}` on f64 prints the shortest text that parses back to the same value.
        write!(f, "{}{}{}", self.lat, AXIS_SEPARATOR, self.lng)
    }
}

impl FromStr for Coordinate {
    type Err = RideError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(AXIS_SEPARATOR)
            .ok_or_else(|| RideError::invalid(format!("expected `lat,lng`, got `{s}`")))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| RideError::invalid(format!("bad latitude `{lat}`")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| RideError::invalid(format!("bad longitude `{lng}`")))?;
        Self::new(lat, lng)
    }
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Point at `fraction` of the straight lat/lng segment from `from` to `to`.
pub fn interpolate(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    Coordinate {
        lat: from.lat + (to.lat - from.lat) * fraction,
        lng: from.lng + (to.lng - from.lng) * fraction,
    }
}

pub fn encode_path(points: &[Coordinate]) -> String {
    points
        .iter()
        .map(Coordinate::to_string)
        .collect::<Vec<_>>()
        .join(&POINT_SEPARATOR.to_string())
}

/// Inverse of [`encode_path`]. An empty string decodes to an empty path.
pub fn decode_path(encoded: &str) -> Result<Vec<Coordinate>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    encoded.split(POINT_SEPARATOR).map(str::parse).collect()
}

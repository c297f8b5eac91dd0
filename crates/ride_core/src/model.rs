//! Shared data model passed between the ride services and their callers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RideError};
use crate::geo::{decode_path, Coordinate};

/// Allowed gap between a fare total and the sum of its components.
pub const FARE_TOLERANCE: f64 = 0.01;

/// A resolved place. Produced by the geocoding collaborator and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address: None,
            name: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<Coordinate> for Location {
    fn from(coordinate: Coordinate) -> Self {
        Self::at(coordinate)
    }
}

/// Service tier. Drives both pricing and the vehicle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RideClass {
    Standard,
    BlessedXL,
    LocalLo,
}

const SEDANS: [&str; 5] = [
    "Toyota Camry",
    "Honda Accord",
    "Nissan Altima",
    "Ford Fusion",
    "Hyundai Sonata",
];
const SUVS: [&str; 5] = [
    "Toyota Highlander",
    "Honda Pilot",
    "Ford Explorer",
    "Chevrolet Tahoe",
    "GMC Yukon",
];
const ECONOMY: [&str; 5] = [
    "Toyota Corolla",
    "Honda Civic",
    "Nissan Sentra",
    "Ford Focus",
    "Hyundai Elantra",
];

impl RideClass {
    pub const ALL: [RideClass; 3] = [RideClass::Standard, RideClass::BlessedXL, RideClass::LocalLo];

    /// Rider-facing name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::BlessedXL => "Blessed XL",
            Self::LocalLo => "Local Lo",
        }
    }

    /// Vehicle vocabulary for this class: sedans, SUVs or economy cars.
    pub fn vehicles(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &SEDANS,
            Self::BlessedXL => &SUVS,
            Self::LocalLo => &ECONOMY,
        }
    }

    pub fn default_vehicle(self) -> &'static str {
        self.vehicles()[0]
    }
}

impl fmt::Display for RideClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RideClass {
    type Err = RideError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "standard" => Ok(Self::Standard),
            "blessedxl" | "xl" => Ok(Self::BlessedXL),
            "locallo" | "lo" => Ok(Self::LocalLo),
            _ => Err(RideError::invalid(format!("unknown ride class `{s}`"))),
        }
    }
}

/// A simulated driver. Ephemeral: regenerated on every directory call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub position: Coordinate,
    pub ride_class: RideClass,
    pub name: String,
    /// In [3.5, 5.0], rounded to one decimal place.
    pub rating: f64,
    pub vehicle: String,
    /// Always >= 1.
    pub eta_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    /// Ordered route shape, see [`crate::geo::encode_path`].
    pub path: String,
    pub eta_minutes: u32,
    /// Rounded to one decimal.
    pub distance_km: f64,
    pub duration_minutes: u32,
}

impl RouteEstimate {
    pub fn points(&self) -> Result<Vec<Coordinate>> {
        decode_path(&self.path)
    }
}

/// Priced fare. `total` equals the sum of the four components within [`FARE_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub total: f64,
    pub base: f64,
    pub distance: f64,
    pub time: f64,
    pub surge: f64,
    pub currency: String,
}

impl FareBreakdown {
    pub fn components_sum(&self) -> f64 {
        self.base + self.distance + self.time + self.surge
    }

    pub fn is_consistent(&self) -> bool {
        (self.total - self.components_sum()).abs() <= FARE_TOLERANCE
    }
}

/// Caller-built input to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup: Location,
    pub dropoff: Location,
    pub ride_class: RideClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare: Option<FareBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteEstimate>,
}

impl RideRequest {
    pub fn new(pickup: Location, dropoff: Location, ride_class: RideClass) -> Self {
        Self {
            pickup,
            dropoff,
            ride_class,
            notes: None,
            fare: None,
            route: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_fare(mut self, fare: FareBreakdown) -> Self {
        self.fare = Some(fare);
        self
    }

    pub fn with_route(mut self, route: RouteEstimate) -> Self {
        self.route = Some(route);
        self
    }

    /// Reject requests the orchestrator cannot act on.
    pub fn validate(&self) -> Result<()> {
        self.pickup.coordinate.validate()?;
        self.dropoff.coordinate.validate()?;
        if let Some(fare) = &self.fare {
            if !fare.is_consistent() {
                return Err(RideError::invalid(format!(
                    "fare total {} does not match components {:.2}",
                    fare.total,
                    fare.components_sum()
                )));
            }
        }
        if let Some(route) = &self.route {
            if !route.distance_km.is_finite() || route.distance_km < 0.0 {
                return Err(RideError::invalid(format!(
                    "route distance {} km is not a valid length",
                    route.distance_km
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// `pending → accepted → in_progress → completed`, plus cancel from any non-terminal state.
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        match (self, next) {
            (from, Self::Cancelled) => !from.is_terminal(),
            (Self::Pending, Self::Accepted)
            | (Self::Accepted, Self::InProgress)
            | (Self::InProgress, Self::Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    pub ride_id: String,
    pub status: RideStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<Driver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_pickup_time: Option<DateTime<FixedOffset>>,
}

impl RideRecord {
    pub fn pending(ride_id: impl Into<String>) -> Self {
        Self {
            ride_id: ride_id.into(),
            status: RideStatus::Pending,
            assigned_driver: None,
            estimated_pickup_time: None,
        }
    }

    pub fn advance_to(&mut self, next: RideStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(RideError::invalid(format!(
                "ride {} cannot move from {} to {}",
                self.ride_id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesAnalysis {
    pub dispatch_flags: BTreeSet<String>,
    pub accessibility_needed: bool,
    pub special_needs: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotesRejection {
    TooLong { limit: usize, actual: usize },
    DisallowedContent { word: String },
}

impl fmt::Display for NotesRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { limit, .. } => write!(f, "Notes must be {limit} characters or less"),
            Self::DisallowedContent { .. } => f.write_str("Notes contain inappropriate content"),
        }
    }
}

/// Result of validating rider notes. A rejection is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotesRejection>,
}

impl NotesValidation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: NotesRejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: f64, lng: f64) -> Location {
        Location::at(Coordinate::new(lat, lng).expect("valid"))
    }

    #[test]
    fn lifecycle_allows_only_forward_moves_and_cancel() {
        use RideStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Accepted));
        for from in [Pending, Accepted, InProgress] {
            assert!(from.can_transition_to(Cancelled));
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn record_refuses_illegal_transition() {
        let mut record = RideRecord::pending("ride-1");
        record.advance_to(RideStatus::Accepted).expect("accept");
        let err = record.advance_to(RideStatus::Completed).unwrap_err();
        assert!(matches!(err, RideError::InvalidInput(_)));
        assert_eq!(record.status, RideStatus::Accepted);
    }

    #[test]
    fn ride_class_parses_labels_and_variants() {
        assert_eq!("Blessed XL".parse::<RideClass>().unwrap(), RideClass::BlessedXL);
        assert_eq!("local-lo".parse::<RideClass>().unwrap(), RideClass::LocalLo);
        assert_eq!("STANDARD".parse::<RideClass>().unwrap(), RideClass::Standard);
        assert!("limo".parse::<RideClass>().is_err());
    }

    #[test]
    fn request_validation_catches_inconsistent_fare() {
        let fare = FareBreakdown {
            total: 20.0,
            base: 5.0,
            distance: 8.0,
            time: 2.0,
            surge: 0.0,
            currency: "USD".into(),
        };
        let request = RideRequest::new(
            location(40.7128, -74.0060),
            location(40.7580, -73.9855),
            RideClass::Standard,
        )
        .with_fare(fare);
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_validation_catches_bad_coordinates() {
        let mut request = RideRequest::new(
            location(40.7128, -74.0060),
            location(40.7580, -73.9855),
            RideClass::Standard,
        );
        request.dropoff.coordinate.lat = 123.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejection_messages_are_rider_facing() {
        let too_long = NotesRejection::TooLong {
            limit: 200,
            actual: 250,
        };
        assert_eq!(too_long.to_string(), "Notes must be 200 characters or less");
        let rude = NotesRejection::DisallowedContent {
            word: "offensive".into(),
        };
        assert_eq!(rude.to_string(), "Notes contain inappropriate content");
    }
}

//! Process-wide service configuration. Read-only once the services are built.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;
use crate::matching::SelectionPolicy;
use crate::model::RideClass;
use crate::pricing::{RateTable, SurgeProfileKind};

pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;
pub const DEFAULT_CURRENCY: &str = "USD";

/// Largest per-axis distance a generated driver may sit from the search point.
pub const MAX_SCATTER_DEGREES: f64 = 0.01;
/// Largest per-axis drift of a driver per movement tick.
pub const MAX_MOVEMENT_DEGREES: f64 = 0.0025;

/// Reference point for synthesized drivers that have no pickup to orbit (lower Manhattan).
const REFERENCE_LAT: f64 = 40.7128;
const REFERENCE_LNG: f64 = -74.0060;

/// Simulated network latency per operation, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub route_ms: u64,
    pub eta_ms: u64,
    pub fare_ms: u64,
    pub compare_ms: u64,
    pub nearby_ms: u64,
    pub lookup_ms: u64,
    pub advance_ms: u64,
    pub request_ms: u64,
    pub status_ms: u64,
    pub cancel_ms: u64,
    pub geocode_ms: u64,
    pub current_location_ms: u64,
    pub suggestions_ms: u64,
    pub recent_ms: u64,
}

impl LatencyConfig {
    /// No latency at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Delays in the range a mobile client sees from a hosted dispatch API.
    pub fn simulated() -> Self {
        Self {
            route_ms: 1000,
            eta_ms: 300,
            fare_ms: 600,
            compare_ms: 800,
            nearby_ms: 800,
            lookup_ms: 300,
            advance_ms: 500,
            request_ms: 1500,
            status_ms: 500,
            cancel_ms: 800,
            geocode_ms: 700,
            current_location_ms: 500,
            suggestions_ms: 300,
            recent_ms: 200,
        }
    }
}

/// Suspend for `ms` of simulated latency. Zero returns immediately.
pub async fn simulate_latency(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Shape of the simulated driver pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub min_drivers: u32,
    pub max_drivers: u32,
    /// Max per-axis distance of a generated driver from the search point.
    pub scatter_degrees: f64,
    /// Max per-axis movement of a driver per `advance` tick.
    pub movement_degrees: f64,
    pub max_eta_minutes: u32,
    pub reference_point: Coordinate,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            min_drivers: 3,
            max_drivers: 7,
            scatter_degrees: 0.01,
            movement_degrees: 0.0025,
            max_eta_minutes: 10,
            reference_point: Coordinate {
                lat: REFERENCE_LAT,
                lng: REFERENCE_LNG,
            },
        }
    }
}

impl DirectoryConfig {
    /// Directory that never finds anyone nearby.
    pub fn empty() -> Self {
        Self {
            min_drivers: 0,
            max_drivers: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `None` seeds every service from OS entropy.
    pub seed: Option<u64>,
    pub latency: LatencyConfig,
    pub average_speed_kmh: f64,
    pub currency: String,
    pub rates: RateTable,
    pub surge: SurgeProfileKind,
    pub directory: DirectoryConfig,
    pub selection: SelectionPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            latency: LatencyConfig::none(),
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            currency: DEFAULT_CURRENCY.to_string(),
            rates: RateTable::default(),
            surge: SurgeProfileKind::default(),
            directory: DirectoryConfig::default(),
            selection: SelectionPolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_surge(mut self, surge: SurgeProfileKind) -> Self {
        self.surge = surge;
        self
    }

    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `RIDE_SEED`, `RIDE_SIMULATED_LATENCY`,
    /// `RIDE_SURGE_PROFILE` and `RIDE_SELECTION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("RIDE_SEED") {
            let seed = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "RIDE_SEED",
                value: raw.clone(),
            })?;
            config.seed = Some(seed);
        }

        if let Some(raw) = lookup("RIDE_SIMULATED_LATENCY") {
            config.latency = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => LatencyConfig::simulated(),
                "0" | "false" | "no" | "" => LatencyConfig::none(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "RIDE_SIMULATED_LATENCY",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("RIDE_SURGE_PROFILE") {
            config.surge = match raw.trim().to_ascii_lowercase().as_str() {
                "standard" => SurgeProfileKind::Standard,
                "flat" | "none" => SurgeProfileKind::Flat,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "RIDE_SURGE_PROFILE",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("RIDE_SELECTION") {
            config.selection = match raw.trim().to_ascii_lowercase().as_str() {
                "first" => SelectionPolicy::First,
                "nearest" => SelectionPolicy::Nearest,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "RIDE_SELECTION",
                        value: raw,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "average_speed_kmh must be positive, got {}",
                self.average_speed_kmh
            )));
        }
        if self.directory.min_drivers > self.directory.max_drivers {
            return Err(ConfigError::Invalid(format!(
                "directory.min_drivers ({}) exceeds max_drivers ({})",
                self.directory.min_drivers, self.directory.max_drivers
            )));
        }
        check_degrees(
            "directory.scatter_degrees",
            self.directory.scatter_degrees,
            MAX_SCATTER_DEGREES,
        )?;
        check_degrees(
            "directory.movement_degrees",
            self.directory.movement_degrees,
            MAX_MOVEMENT_DEGREES,
        )?;
        for class in RideClass::ALL {
            let rates = self.rates.rates_for(class);
            let amounts = [rates.base, rates.per_km, rates.per_minute];
            if amounts.iter().any(|amount| !amount.is_finite() || *amount < 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "rates for {class} must be finite and non-negative"
                )));
            }
        }
        if let SurgeProfileKind::Custom(hours) = &self.surge {
            if hours.iter().any(|multiplier| !multiplier.is_finite()) {
                return Err(ConfigError::Invalid(
                    "custom surge multipliers must be finite".to_string(),
                ));
            }
        }
        if self.directory.max_eta_minutes == 0 {
            return Err(ConfigError::Invalid(
                "directory.max_eta_minutes must be at least 1".to_string(),
            ));
        }
        if self.directory.reference_point.validate().is_err() {
            return Err(ConfigError::Invalid(
                "directory.reference_point is not a valid coordinate".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_degrees(key: &str, value: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be between 0 and {max}, got {value}"
        )))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an unsupported value `{value}`")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

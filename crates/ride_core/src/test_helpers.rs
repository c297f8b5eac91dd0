//! Test helpers for common test setup and utilities.
//!
//! Everything here is seeded and pinned: no entropy, no wall clock, no latency.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::config::ServiceConfig;
use crate::geo::Coordinate;
use crate::model::{Location, RideClass, RideRequest};
use crate::services::RideServices;

pub const TEST_SEED: u64 = 42;

/// Daytime hour: 10:00-16:00 surge band (1.2).
pub const MIDDAY_HOUR: u32 = 12;
/// Late night: no surge.
pub const NIGHT_HOUR: u32 = 2;
/// Morning rush: 1.5 surge.
pub const RUSH_HOUR: u32 = 8;

/// Lower Manhattan, the pickup used across tests.
pub fn test_pickup() -> Location {
    Location::at(Coordinate {
        lat: 40.7128,
        lng: -74.0060,
    })
    .with_name("Home")
}

/// Rockefeller Center, about 5.3 km from [`test_pickup`].
pub fn test_dropoff() -> Location {
    Location::at(Coordinate {
        lat: 40.7580,
        lng: -73.9855,
    })
    .with_name("Work")
}

pub fn test_request(ride_class: RideClass) -> RideRequest {
    RideRequest::new(test_pickup(), test_dropoff(), ride_class)
}

/// Seeded config with every other setting at its default.
pub fn test_config() -> ServiceConfig {
    ServiceConfig::default().with_seed(TEST_SEED)
}

/// Services wired from `config` with the clock pinned to `hour`:00.
pub fn services_at_hour(config: ServiceConfig, hour: u32) -> RideServices {
    RideServices::with_clock(config, Arc::new(FixedClock::at_hour(hour)))
}

/// Seeded services at a surge-free hour.
pub fn create_test_services() -> RideServices {
    services_at_hour(test_config(), NIGHT_HOUR)
}

//! Ride request orchestration: driver assignment and lifecycle status.
//!
//! The simulated backend accepts every request immediately and always assigns
//! someone. When the directory finds nobody nearby a fallback driver is
//! synthesized at the pickup point; that is a business rule, not error recovery.
//!
//! Nothing is persisted. [`derive_status`] stands in for stored ride state by
//! hashing the ride id, so status queries are reproducible without a database.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::TimeSource;
use crate::config::{simulate_latency, LatencyConfig, ServiceConfig};
use crate::drivers::DriverDirectory;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::matching::{build_selection, DriverSelection};
use crate::model::{CancelOutcome, Driver, RideClass, RideRecord, RideRequest, RideStatus};
use crate::sampling::{next_id, scatter, SimRng};

pub const FALLBACK_DRIVER_NAME: &str = "Available Driver";
pub const FALLBACK_DRIVER_RATING: f64 = 4.8;
pub const FALLBACK_MIN_ETA_MINUTES: u32 = 5;
pub const FALLBACK_MAX_ETA_MINUTES: u32 = 10;
const FALLBACK_SCATTER_DEGREES: f64 = 0.01;

/// Pickup lead time used when no driver is attached.
const DEFAULT_PICKUP_MINUTES: u32 = 5;

const RNG_STREAM: u64 = 3;

/// Statuses a ride id can hash to. Cancelled is never derived.
const DERIVABLE_STATUSES: [RideStatus; 4] = [
    RideStatus::Pending,
    RideStatus::Accepted,
    RideStatus::InProgress,
    RideStatus::Completed,
];

/// Deterministic status for a ride id: sum of its UTF-16 code units modulo the
/// four non-cancelled states.
pub fn derive_status(ride_id: &str) -> RideStatus {
    let checksum: u64 = ride_id.encode_utf16().map(u64::from).sum();
    DERIVABLE_STATUSES[(checksum % DERIVABLE_STATUSES.len() as u64) as usize]
}

pub struct RideOrchestrator {
    drivers: Arc<DriverDirectory>,
    selection: Box<dyn DriverSelection>,
    clock: Arc<dyn TimeSource>,
    rng: SimRng,
    latency: LatencyConfig,
}

impl RideOrchestrator {
    pub fn new(
        drivers: Arc<DriverDirectory>,
        selection: Box<dyn DriverSelection>,
        clock: Arc<dyn TimeSource>,
        rng: SimRng,
        latency: LatencyConfig,
    ) -> Self {
        Self {
            drivers,
            selection,
            clock,
            rng,
            latency,
        }
    }

    pub fn from_config(
        drivers: Arc<DriverDirectory>,
        clock: Arc<dyn TimeSource>,
        config: &ServiceConfig,
    ) -> Self {
        Self::new(
            drivers,
            build_selection(config.selection),
            clock,
            SimRng::derived(config.seed, RNG_STREAM),
            config.latency,
        )
    }

    /// Accept a ride and assign a driver. Never fails for a well-formed request.
    pub async fn request_ride(&self, request: &RideRequest) -> Result<RideRecord> {
        request.validate()?;
        simulate_latency(self.latency.request_ms).await;

        let ride_id = self.rng.with(|rng| next_id(rng, "ride"));
        if let Some(fare) = &request.fare {
            debug!(ride_id = %ride_id, quoted_total = fare.total, "request carries a fare quote");
        }

        let pickup = request.pickup.coordinate;
        let candidates = self
            .drivers
            .find_nearby(&request.pickup, Some(request.ride_class))
            .await?;
        let driver = match self.selection.select(pickup, &candidates) {
            Some(driver) => driver.clone(),
            None => {
                warn!(ride_id = %ride_id, ride_class = %request.ride_class, "no nearby drivers, using fallback");
                self.fallback_driver(pickup, request.ride_class)
            }
        };

        let mut record = RideRecord::pending(ride_id);
        record.advance_to(RideStatus::Accepted)?;
        record.estimated_pickup_time = Some(self.pickup_time(driver.eta_minutes));
        info!(
            ride_id = %record.ride_id,
            driver_id = %driver.id,
            eta_minutes = driver.eta_minutes,
            candidates = candidates.len(),
            "ride accepted"
        );
        record.assigned_driver = Some(driver);
        Ok(record)
    }

    /// Current status of `ride_id`. Repeated calls with the same id return the same status.
    ///
    /// A driver is attached while the ride is accepted or in progress; a pickup
    /// estimate while it is pending or accepted.
    pub async fn get_status(&self, ride_id: &str) -> Result<RideRecord> {
        simulate_latency(self.latency.status_ms).await;

        let status = derive_status(ride_id);
        let driver = matches!(status, RideStatus::Accepted | RideStatus::InProgress).then(|| {
            self.fallback_driver(self.drivers.config().reference_point, RideClass::Standard)
        });
        let estimated_pickup_time = matches!(status, RideStatus::Pending | RideStatus::Accepted)
            .then(|| {
                let eta = driver
                    .as_ref()
                    .map_or(DEFAULT_PICKUP_MINUTES, |driver| driver.eta_minutes);
                self.pickup_time(eta)
            });

        debug!(ride_id, status = %status, "derived ride status");
        Ok(RideRecord {
            ride_id: ride_id.to_string(),
            status,
            assigned_driver: driver,
            estimated_pickup_time,
        })
    }

    /// Cancel a ride. The simulated backend accepts every cancellation; a real one
    /// must refuse once the ride is completed.
    pub async fn cancel_ride(&self, ride_id: &str) -> Result<CancelOutcome> {
        simulate_latency(self.latency.cancel_ms).await;
        info!(ride_id, "ride cancelled");
        Ok(CancelOutcome { success: true })
    }

    fn pickup_time(&self, eta_minutes: u32) -> DateTime<FixedOffset> {
        self.clock.now() + Duration::minutes(i64::from(eta_minutes))
    }

    fn fallback_driver(&self, near: Coordinate, ride_class: RideClass) -> Driver {
        self.rng.with(|rng| Driver {
            id: next_id(rng, "driver-fallback"),
            position: scatter(rng, near, FALLBACK_SCATTER_DEGREES),
            ride_class,
            name: FALLBACK_DRIVER_NAME.to_string(),
            rating: FALLBACK_DRIVER_RATING,
            vehicle: ride_class.default_vehicle().to_string(),
            eta_minutes: rng.gen_range(FALLBACK_MIN_ETA_MINUTES..=FALLBACK_MAX_ETA_MINUTES),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::DirectoryConfig;
    use crate::error::RideError;
    use crate::model::Location;

    fn orchestrator(config: ServiceConfig) -> (RideOrchestrator, FixedClock) {
        let clock = FixedClock::at_hour(14);
        let drivers = Arc::new(DriverDirectory::from_config(&config));
        (
            RideOrchestrator::from_config(drivers, Arc::new(clock), &config),
            clock,
        )
    }

    fn request(class: RideClass) -> RideRequest {
        RideRequest::new(
            Location::at(Coordinate {
                lat: 40.7128,
                lng: -74.0060,
            }),
            Location::at(Coordinate {
                lat: 40.7580,
                lng: -73.9855,
            }),
            class,
        )
    }

    #[test]
    fn derived_status_uses_code_unit_checksum() {
        // 'a' = 97 -> 97 % 4 = 1 -> accepted
        assert_eq!(derive_status("a"), RideStatus::Accepted);
        // 'd' = 100 -> 0 -> pending
        assert_eq!(derive_status("d"), RideStatus::Pending);
        assert_eq!(derive_status("b"), RideStatus::InProgress);
        assert_eq!(derive_status("c"), RideStatus::Completed);
        assert_eq!(derive_status(""), RideStatus::Pending);
    }

    #[tokio::test]
    async fn request_assigns_a_matching_driver() {
        let (rides, clock) = orchestrator(ServiceConfig::default().with_seed(3));
        let record = rides.request_ride(&request(RideClass::BlessedXL)).await.expect("ride");

        assert!(record.ride_id.starts_with("ride-"));
        assert_eq!(record.status, RideStatus::Accepted);
        let driver = record.assigned_driver.expect("driver");
        assert_eq!(driver.ride_class, RideClass::BlessedXL);
        assert_eq!(
            record.estimated_pickup_time,
            Some(clock.now() + Duration::minutes(i64::from(driver.eta_minutes)))
        );
    }

    #[tokio::test]
    async fn empty_directory_falls_back() {
        let config = ServiceConfig::default()
            .with_seed(3)
            .with_directory(DirectoryConfig::empty());
        let (rides, _) = orchestrator(config);
        let record = rides.request_ride(&request(RideClass::LocalLo)).await.expect("ride");

        let driver = record.assigned_driver.expect("driver");
        assert!(driver.id.starts_with("driver-fallback-"));
        assert_eq!(driver.name, FALLBACK_DRIVER_NAME);
        assert_eq!(driver.rating, 4.8);
        assert_eq!(driver.ride_class, RideClass::LocalLo);
        assert_eq!(driver.vehicle, "Toyota Corolla");
        assert!((5..=10).contains(&driver.eta_minutes));
        assert!((driver.position.lat - 40.7128).abs() <= 0.01 + 1e-9);
    }

    #[tokio::test]
    async fn malformed_request_is_rejected() {
        let (rides, _) = orchestrator(ServiceConfig::default().with_seed(3));
        let mut bad = request(RideClass::Standard);
        bad.pickup.coordinate.lng = 200.0;
        let err = rides.request_ride(&bad).await.unwrap_err();
        assert!(matches!(err, RideError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn status_is_idempotent_and_shaped_by_state() {
        let (rides, clock) = orchestrator(ServiceConfig::default().with_seed(5));
        for id in ["a", "b", "c", "d", "ride-123", "ride-xyz"] {
            let first = rides.get_status(id).await.expect("status");
            let second = rides.get_status(id).await.expect("status");
            assert_eq!(first.status, second.status);
            assert_eq!(first.ride_id, id);

            let has_driver = matches!(first.status, RideStatus::Accepted | RideStatus::InProgress);
            assert_eq!(first.assigned_driver.is_some(), has_driver, "{id}");
            let has_pickup = matches!(first.status, RideStatus::Pending | RideStatus::Accepted);
            assert_eq!(first.estimated_pickup_time.is_some(), has_pickup, "{id}");
        }

        let pending = rides.get_status("d").await.expect("status");
        assert_eq!(
            pending.estimated_pickup_time,
            Some(clock.now() + Duration::minutes(5))
        );
    }

    #[tokio::test]
    async fn cancel_always_succeeds() {
        let (rides, _) = orchestrator(ServiceConfig::default());
        for id in ["ride-1", "", "c"] {
            assert!(rides.cancel_ride(id).await.expect("cancel").success);
        }
    }
}

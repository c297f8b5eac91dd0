//! Simulated driver directory.
//!
//! Every call synthesizes a fresh pool around the query point; nothing is stored
//! between calls. Results keep generation order (no distance or ETA sorting) so
//! ranking stays the caller's decision.

use rand::Rng;
use tracing::debug;

use crate::config::{simulate_latency, DirectoryConfig, LatencyConfig, ServiceConfig};
use crate::error::Result;
use crate::geo::Coordinate;
use crate::model::{Driver, Location, RideClass};
use crate::sampling::{jitter, next_id, pick, scatter, SimRng};

const FIRST_NAMES: [&str; 8] = [
    "John", "Jane", "Michael", "Sarah", "David", "Emily", "Robert", "Lisa",
];
const LAST_NAMES: [&str; 8] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia",
];

pub const MIN_RATING: f64 = 3.5;
pub const MAX_RATING: f64 = 5.0;

const RNG_STREAM: u64 = 2;

pub fn random_class<R: Rng + ?Sized>(rng: &mut R) -> RideClass {
    RideClass::ALL[rng.gen_range(0..RideClass::ALL.len())]
}

pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES))
}

/// Driver with randomized profile at `position`. The rating is drawn uniformly
/// and then rounded to one decimal, so it takes the 16 values 3.5, 3.6, ..., 5.0.
pub fn synthesize_driver<R: Rng + ?Sized>(
    rng: &mut R,
    id: String,
    position: Coordinate,
    ride_class: RideClass,
    max_eta_minutes: u32,
) -> Driver {
    let rating = (rng.gen_range(MIN_RATING..=MAX_RATING) * 10.0).round() / 10.0;
    Driver {
        id,
        position,
        ride_class,
        name: random_name(rng),
        rating,
        vehicle: pick(rng, ride_class.vehicles()).to_string(),
        eta_minutes: rng.gen_range(1..=max_eta_minutes.max(1)),
    }
}

#[derive(Debug)]
pub struct DriverDirectory {
    rng: SimRng,
    config: DirectoryConfig,
    latency: LatencyConfig,
}

impl DriverDirectory {
    pub fn new(rng: SimRng, config: DirectoryConfig, latency: LatencyConfig) -> Self {
        Self {
            rng,
            config,
            latency,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            SimRng::derived(config.seed, RNG_STREAM),
            config.directory,
            config.latency,
        )
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Drivers around `location`, optionally restricted to one ride class.
    pub async fn find_nearby(
        &self,
        location: &Location,
        ride_class: Option<RideClass>,
    ) -> Result<Vec<Driver>> {
        location.coordinate.validate()?;
        simulate_latency(self.latency.nearby_ms).await;

        let mut drivers = self
            .rng
            .with(|rng| self.generate_pool(rng, location.coordinate, ride_class));
        let generated = drivers.len();
        if let Some(wanted) = ride_class {
            drivers.retain(|driver| driver.ride_class == wanted);
        }
        debug!(generated, returned = drivers.len(), "found nearby drivers");
        Ok(drivers)
    }

    /// A freshly synthesized profile for `driver_id` near the reference point.
    /// A real backend would answer `NotFound` for unknown ids.
    pub async fn lookup(&self, driver_id: &str) -> Result<Driver> {
        simulate_latency(self.latency.lookup_ms).await;

        let driver = self.rng.with(|rng| {
            let position = scatter(
                rng,
                self.config.reference_point,
                self.config.scatter_degrees / 2.0,
            );
            let class = random_class(rng);
            synthesize_driver(
                rng,
                driver_id.to_string(),
                position,
                class,
                self.config.max_eta_minutes,
            )
        });
        debug!(driver_id, "looked up driver");
        Ok(driver)
    }

    /// One movement tick: positions drift, ETAs drop by a minute (never below 1).
    pub async fn advance(&self, drivers: &[Driver]) -> Vec<Driver> {
        simulate_latency(self.latency.advance_ms).await;

        self.rng.with(|rng| {
            drivers
                .iter()
                .map(|driver| {
                    let d_lat = jitter(rng, self.config.movement_degrees);
                    let d_lng = jitter(rng, self.config.movement_degrees);
                    Driver {
                        position: driver.position.offset(d_lat, d_lng),
                        eta_minutes: driver.eta_minutes.saturating_sub(1).max(1),
                        ..driver.clone()
                    }
                })
                .collect()
        })
    }

    fn generate_pool<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        center: Coordinate,
        requested: Option<RideClass>,
    ) -> Vec<Driver> {
        let min = self.config.min_drivers;
        let count = rng.gen_range(min..=self.config.max_drivers.max(min));
        (0..count)
            .map(|_| {
                let position = scatter(rng, center, self.config.scatter_degrees);
                let class = requested.unwrap_or_else(|| random_class(rng));
                let id = next_id(rng, "driver");
                synthesize_driver(rng, id, position, class, self.config.max_eta_minutes)
            })
            .collect()
    }
}

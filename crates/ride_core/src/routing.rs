//! Route estimation: distance, duration and a drawable path between two locations.
//!
//! [`RouteEngine`] delegates the geometry to a [`RouteProvider`]:
//!
//! - **`GreatCircleRouteProvider`**: Haversine distance at a fixed average speed, with a
//!   four-point path (origin, two jittered midpoints, destination). Always available.
//!
//! A road-network backend would slot in as another provider; the engine adds input
//! validation and simulated latency on top of whichever provider it wraps.

use tracing::debug;

use crate::config::{simulate_latency, LatencyConfig, ServiceConfig};
use crate::error::Result;
use crate::geo::{decode_path, encode_path, haversine_km, interpolate, Coordinate};
use crate::model::{Location, RouteEstimate};
use crate::sampling::{scatter, SimRng};

/// Max per-axis jitter applied to each synthesized midpoint.
pub const MIDPOINT_JITTER_DEGREES: f64 = 0.005;

/// Fractions of the straight segment where midpoints are placed.
const MIDPOINT_FRACTIONS: [f64; 2] = [0.33, 0.66];

const RNG_STREAM: u64 = 1;

/// Trait for routing backends. Must be `Send + Sync` so one engine can serve
/// concurrent callers.
pub trait RouteProvider: Send + Sync {
    /// Compute a route between two already-validated coordinates.
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteEstimate>;
}

/// Straight-line routing over the sphere. No road network.
#[derive(Debug)]
pub struct GreatCircleRouteProvider {
    rng: SimRng,
    average_speed_kmh: f64,
}

impl GreatCircleRouteProvider {
    pub fn new(rng: SimRng, average_speed_kmh: f64) -> Self {
        Self {
            rng,
            average_speed_kmh,
        }
    }

    /// Minutes at the provider's average speed, before rounding.
    pub fn travel_minutes(&self, distance_km: f64) -> f64 {
        distance_km / self.average_speed_kmh * 60.0
    }

    fn synthesize_path(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let midpoints = self.rng.with(|rng| {
            MIDPOINT_FRACTIONS
                .iter()
                .map(|&fraction| scatter(rng, interpolate(from, to, fraction), MIDPOINT_JITTER_DEGREES))
                .collect::<Vec<_>>()
        });
        let mut path = Vec::with_capacity(midpoints.len() + 2);
        path.push(from);
        path.extend(midpoints);
        path.push(to);
        path
    }
}

impl RouteProvider for GreatCircleRouteProvider {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteEstimate> {
        let distance_km = haversine_km(from, to);
        let minutes = self.travel_minutes(distance_km).round() as u32;
        Ok(RouteEstimate {
            path: encode_path(&self.synthesize_path(from, to)),
            eta_minutes: minutes,
            distance_km: (distance_km * 10.0).round() / 10.0,
            duration_minutes: minutes,
        })
    }
}

pub struct RouteEngine {
    provider: Box<dyn RouteProvider>,
    eta_speed_kmh: f64,
    latency: LatencyConfig,
}

impl RouteEngine {
    pub fn new(provider: Box<dyn RouteProvider>, eta_speed_kmh: f64, latency: LatencyConfig) -> Self {
        Self {
            provider,
            eta_speed_kmh,
            latency,
        }
    }

    /// Great-circle engine built from service configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let provider = GreatCircleRouteProvider::new(
            SimRng::derived(config.seed, RNG_STREAM),
            config.average_speed_kmh,
        );
        Self::new(Box::new(provider), config.average_speed_kmh, config.latency)
    }

    pub async fn compute_route(&self, origin: &Location, destination: &Location) -> Result<RouteEstimate> {
        origin.coordinate.validate()?;
        destination.coordinate.validate()?;
        simulate_latency(self.latency.route_ms).await;

        let route = self.provider.route(origin.coordinate, destination.coordinate)?;
        debug!(
            distance_km = route.distance_km,
            duration_minutes = route.duration_minutes,
            "computed route"
        );
        Ok(route)
    }

    /// ETA in whole minutes without synthesizing a path.
    pub async fn eta_minutes(&self, origin: &Location, destination: &Location) -> Result<u32> {
        origin.coordinate.validate()?;
        destination.coordinate.validate()?;
        simulate_latency(self.latency.eta_ms).await;

        let distance_km = haversine_km(origin.coordinate, destination.coordinate);
        Ok((distance_km / self.eta_speed_kmh * 60.0).round() as u32)
    }

    pub fn decode_path(&self, encoded: &str) -> Result<Vec<Coordinate>> {
        decode_path(encoded)
    }
}

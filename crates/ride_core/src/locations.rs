//! Stub geocoding collaborator backed by a fixed set of New York locations.

use rand::Rng;
use tracing::debug;

use crate::config::{simulate_latency, LatencyConfig, ServiceConfig};
use crate::error::Result;
use crate::geo::Coordinate;
use crate::model::Location;
use crate::sampling::{scatter, SimRng};

/// Max per-axis offset applied to a resolved sample.
pub const RESOLVE_JITTER_DEGREES: f64 = 0.005;
const RECENT_COUNT: usize = 3;
const RNG_STREAM: u64 = 4;

struct Sample {
    name: &'static str,
    address: &'static str,
    lat: f64,
    lng: f64,
}

static SAMPLES: [Sample; 5] = [
    Sample {
        name: "Home",
        address: "123 Broadway, New York, NY",
        lat: 40.7128,
        lng: -74.0060,
    },
    Sample {
        name: "Work",
        address: "30 Rockefeller Plaza, New York, NY",
        lat: 40.7580,
        lng: -73.9855,
    },
    Sample {
        name: "Empire State Building",
        address: "350 5th Ave, New York, NY",
        lat: 40.7484,
        lng: -73.9857,
    },
    Sample {
        name: "Grand Central Terminal",
        address: "109 E 42nd St, New York, NY",
        lat: 40.7527,
        lng: -73.9772,
    },
    Sample {
        name: "MetLife Building",
        address: "200 Park Ave, New York, NY",
        lat: 40.7516,
        lng: -73.9776,
    },
];

const CURRENT_LOCATION_NAME: &str = "Current Location";

impl Sample {
    fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }

    fn location(&self) -> Location {
        Location::at(self.coordinate())
            .with_address(self.address)
            .with_name(self.name)
    }
}

/// Every sample location, in catalogue order.
pub fn sample_locations() -> Vec<Location> {
    SAMPLES.iter().map(Sample::location).collect()
}

#[derive(Debug)]
pub struct Geocoder {
    rng: SimRng,
    latency: LatencyConfig,
}

impl Geocoder {
    pub fn new(rng: SimRng, latency: LatencyConfig) -> Self {
        Self { rng, latency }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(SimRng::derived(config.seed, RNG_STREAM), config.latency)
    }

    /// Resolve free text to a location near one of the samples. The caller's
    /// address is kept; a blank one is replaced by the sample's.
    pub async fn resolve_address(&self, address: &str) -> Result<Location> {
        simulate_latency(self.latency.geocode_ms).await;

        let (sample, coordinate) = self.rng.with(|rng| {
            let sample = &SAMPLES[rng.gen_range(0..SAMPLES.len())];
            (sample, scatter(rng, sample.coordinate(), RESOLVE_JITTER_DEGREES))
        });
        let address = match address.trim() {
            "" => sample.address,
            given => given,
        };
        debug!(address, sample = sample.name, "resolved address");
        Ok(Location::at(coordinate).with_address(address))
    }

    pub async fn current_location(&self) -> Result<Location> {
        simulate_latency(self.latency.current_location_ms).await;
        Ok(Location::at(SAMPLES[0].coordinate())
            .with_address(CURRENT_LOCATION_NAME)
            .with_name(CURRENT_LOCATION_NAME))
    }

    /// Samples whose address or name contains `input`, ignoring case.
    pub async fn suggestions(&self, input: &str) -> Result<Vec<Location>> {
        simulate_latency(self.latency.suggestions_ms).await;

        let needle = input.trim().to_lowercase();
        Ok(SAMPLES
            .iter()
            .filter(|sample| {
                sample.address.to_lowercase().contains(&needle)
                    || sample.name.to_lowercase().contains(&needle)
            })
            .map(Sample::location)
            .collect())
    }

    pub async fn recent_locations(&self) -> Result<Vec<Location>> {
        simulate_latency(self.latency.recent_ms).await;
        Ok(SAMPLES.iter().take(RECENT_COUNT).map(Sample::location).collect())
    }
}

//! Fare estimation: per-class rate card plus time-of-day surge.
//!
//! Formula per class:
//!
//! ```text
//! distance = distance_km * per_km
//! time     = duration_minutes * per_minute
//! surge    = (base + distance + time) * (multiplier - 1)   when multiplier > 1
//! total    = base + distance + time + surge
//! ```
//!
//! Every amount is rounded to cents, half away from zero. The total is summed from the
//! rounded components so the breakdown always adds up.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::TimeSource;
use crate::config::{simulate_latency, LatencyConfig, ServiceConfig};
use crate::error::Result;
use crate::model::{FareBreakdown, Location, RideClass, RouteEstimate};
use crate::routing::RouteEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub base: f64,
    pub per_km: f64,
    pub per_minute: f64,
}

/// Rate card for every ride class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub standard: Rates,
    pub blessed_xl: Rates,
    pub local_lo: Rates,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            standard: Rates {
                base: 5.0,
                per_km: 1.5,
                per_minute: 0.2,
            },
            blessed_xl: Rates {
                base: 8.0,
                per_km: 2.0,
                per_minute: 0.3,
            },
            local_lo: Rates {
                base: 3.0,
                per_km: 1.0,
                per_minute: 0.15,
            },
        }
    }
}

impl RateTable {
    pub fn rates_for(&self, ride_class: RideClass) -> Rates {
        match ride_class {
            RideClass::Standard => self.standard,
            RideClass::BlessedXL => self.blessed_xl,
            RideClass::LocalLo => self.local_lo,
        }
    }
}

/// Pre-defined surge profiles.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum SurgeProfileKind {
    /// Rush-hour bands: 07-09 and 17-19 at 1.5x, daytime 1.2x, evening 1.3x.
    #[default]
    Standard,
    /// No surge at any hour.
    Flat,
    /// Custom per-hour multipliers (index 0 = midnight, index 23 = 11 PM).
    Custom([f64; 24]),
}

/// Hourly surge multipliers. 1.0 = no surge.
#[derive(Clone, Debug, PartialEq)]
pub struct SurgeSchedule {
    pub hourly_multipliers: [f64; 24],
}

impl SurgeSchedule {
    /// - 07–09: 1.5 (morning rush, both ends inclusive)
    /// - 10–16: 1.2 (daytime)
    /// - 17–19: 1.5 (evening rush, both ends inclusive)
    /// - 20–22: 1.3 (evening)
    /// - 23–06: 1.0
    pub fn standard() -> Self {
        let mut m = [1.0_f64; 24];
        for slot in &mut m[7..=9] {
            *slot = 1.5;
        }
        for slot in &mut m[10..=16] {
            *slot = 1.2;
        }
        for slot in &mut m[17..=19] {
            *slot = 1.5;
        }
        for slot in &mut m[20..=22] {
            *slot = 1.3;
        }
        Self {
            hourly_multipliers: m,
        }
    }

    pub fn flat() -> Self {
        Self {
            hourly_multipliers: [1.0; 24],
        }
    }

    pub fn from_kind(kind: &SurgeProfileKind) -> Self {
        match kind {
            SurgeProfileKind::Standard => Self::standard(),
            SurgeProfileKind::Flat => Self::flat(),
            SurgeProfileKind::Custom(multipliers) => Self {
                hourly_multipliers: multipliers.map(|m| if m.is_finite() { m.max(1.0) } else { 1.0 }),
            },
        }
    }

    pub fn multiplier_at(&self, hour: u32) -> f64 {
        self.hourly_multipliers[(hour % 24) as usize]
    }
}

/// Round to cents, half away from zero.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Price one route under one rate card and surge multiplier.
pub fn price_route(route: &RouteEstimate, rates: Rates, multiplier: f64, currency: &str) -> FareBreakdown {
    let base = rates.base;
    let distance = route.distance_km * rates.per_km;
    let time = f64::from(route.duration_minutes) * rates.per_minute;
    let surge = if multiplier > 1.0 {
        (base + distance + time) * (multiplier - 1.0)
    } else {
        0.0
    };

    let base = round_currency(base);
    let distance = round_currency(distance);
    let time = round_currency(time);
    let surge = round_currency(surge);
    FareBreakdown {
        total: round_currency(base + distance + time + surge),
        base,
        distance,
        time,
        surge,
        currency: currency.to_string(),
    }
}

/// One shared route priced under every ride class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareComparison {
    pub route: RouteEstimate,
    pub fares: BTreeMap<RideClass, FareBreakdown>,
}

pub struct FareEngine {
    routes: Arc<RouteEngine>,
    clock: Arc<dyn TimeSource>,
    rates: RateTable,
    surge: SurgeSchedule,
    currency: String,
    latency: LatencyConfig,
}

impl FareEngine {
    pub fn new(routes: Arc<RouteEngine>, clock: Arc<dyn TimeSource>, config: &ServiceConfig) -> Self {
        Self {
            routes,
            clock,
            rates: config.rates,
            surge: SurgeSchedule::from_kind(&config.surge),
            currency: config.currency.clone(),
            latency: config.latency,
        }
    }

    /// Multiplier in effect right now.
    pub fn current_multiplier(&self) -> f64 {
        self.surge.multiplier_at(self.clock.hour())
    }

    /// Price a trip. Computes the route first when `route` is `None`.
    pub async fn estimate_fare(
        &self,
        origin: &Location,
        destination: &Location,
        ride_class: RideClass,
        route: Option<&RouteEstimate>,
    ) -> Result<FareBreakdown> {
        origin.coordinate.validate()?;
        destination.coordinate.validate()?;
        simulate_latency(self.latency.fare_ms).await;

        let fare = match route {
            Some(route) => self.price(route, ride_class, self.current_multiplier()),
            None => {
                let route = self.routes.compute_route(origin, destination).await?;
                self.price(&route, ride_class, self.current_multiplier())
            }
        };
        debug!(ride_class = %ride_class, total = fare.total, surge = fare.surge, "estimated fare");
        Ok(fare)
    }

    /// Price every ride class against a single route and a single surge reading.
    pub async fn compare_fares(&self, origin: &Location, destination: &Location) -> Result<FareComparison> {
        origin.coordinate.validate()?;
        destination.coordinate.validate()?;
        simulate_latency(self.latency.compare_ms).await;

        let route = self.routes.compute_route(origin, destination).await?;
        let multiplier = self.current_multiplier();
        let fares = RideClass::ALL
            .into_iter()
            .map(|class| (class, self.price(&route, class, multiplier)))
            .collect();
        debug!(distance_km = route.distance_km, multiplier, "compared fares");
        Ok(FareComparison { route, fares })
    }

    fn price(&self, route: &RouteEstimate, ride_class: RideClass, multiplier: f64) -> FareBreakdown {
        price_route(route, self.rates.rates_for(ride_class), multiplier, &self.currency)
    }
}

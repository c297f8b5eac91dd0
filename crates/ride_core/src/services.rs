//! Service wiring. Each service is built once and shared by handle; there is no
//! global state.

use std::sync::Arc;

use crate::clock::{SystemClock, TimeSource};
use crate::config::ServiceConfig;
use crate::drivers::DriverDirectory;
use crate::locations::Geocoder;
use crate::notes::NotesAnalyzer;
use crate::pricing::FareEngine;
use crate::rides::RideOrchestrator;
use crate::routing::RouteEngine;

pub struct RideServices {
    pub config: ServiceConfig,
    pub clock: Arc<dyn TimeSource>,
    pub routes: Arc<RouteEngine>,
    pub fares: Arc<FareEngine>,
    pub drivers: Arc<DriverDirectory>,
    pub rides: Arc<RideOrchestrator>,
    pub notes: NotesAnalyzer,
    pub geocoder: Arc<Geocoder>,
}

impl RideServices {
    /// Wire every service against the wall clock.
    pub fn from_config(config: ServiceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServiceConfig, clock: Arc<dyn TimeSource>) -> Self {
        let routes = Arc::new(RouteEngine::from_config(&config));
        let fares = Arc::new(FareEngine::new(Arc::clone(&routes), Arc::clone(&clock), &config));
        let drivers = Arc::new(DriverDirectory::from_config(&config));
        let rides = Arc::new(RideOrchestrator::from_config(
            Arc::clone(&drivers),
            Arc::clone(&clock),
            &config,
        ));
        let geocoder = Arc::new(Geocoder::from_config(&config));

        Self {
            config,
            clock,
            routes,
            fares,
            drivers,
            rides,
            notes: NotesAnalyzer::new(),
            geocoder,
        }
    }
}

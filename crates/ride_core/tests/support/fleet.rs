#![allow(dead_code)]

use ride_core::config::{DirectoryConfig, ServiceConfig};
use ride_core::matching::SelectionPolicy;
use ride_core::test_helpers::{services_at_hour, test_config, NIGHT_HOUR};
use ride_core::RideServices;

/// Builder for service bundles with a specific fleet shape.
#[derive(Clone, Debug)]
pub struct FleetBuilder {
    config: ServiceConfig,
    hour: u32,
}

impl Default for FleetBuilder {
    fn default() -> Self {
        Self {
            config: test_config(),
            hour: NIGHT_HOUR,
        }
    }
}

impl FleetBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn hour(mut self, hour: u32) -> Self {
        self.hour = hour;
        self
    }

    /// Nobody is ever nearby.
    pub fn empty(mut self) -> Self {
        self.config.directory = DirectoryConfig::empty();
        self
    }

    pub fn drivers(mut self, min: u32, max: u32) -> Self {
        self.config.directory.min_drivers = min;
        self.config.directory.max_drivers = max;
        self
    }

    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.config.selection = selection;
        self
    }

    pub fn build(self) -> RideServices {
        services_at_hour(self.config, self.hour)
    }
}

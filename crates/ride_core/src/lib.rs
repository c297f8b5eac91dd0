pub mod clock;
pub mod config;
pub mod drivers;
pub mod error;
pub mod geo;
pub mod locations;
pub mod matching;
pub mod model;
pub mod notes;
pub mod pricing;
pub mod rides;
pub mod routing;
pub mod sampling;
pub mod services;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use config::ServiceConfig;
pub use error::{Result, RideError};
pub use geo::Coordinate;
pub use model::{
    Driver, FareBreakdown, Location, NotesAnalysis, NotesValidation, RideClass, RideRecord,
    RideRequest, RideStatus, RouteEstimate,
};
pub use services::RideServices;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, Coordinate};
use crate::model::Driver;

/// Which selection strategy the orchestrator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First candidate in directory order.
    #[default]
    First,
    /// Closest candidate to the pickup point.
    Nearest,
}

/// Trait for picking one driver out of a candidate pool.
///
/// Implementations must not reorder or mutate the pool; they only point into it.
pub trait DriverSelection: Send + Sync {
    /// Returns `None` only when `candidates` is empty.
    fn select<'a>(&self, pickup: Coordinate, candidates: &'a [Driver]) -> Option<&'a Driver>;
}

/// First-come-first-served: index 0, no ranking.
#[derive(Debug, Default)]
pub struct FirstCandidate;

impl DriverSelection for FirstCandidate {
    fn select<'a>(&self, _pickup: Coordinate, candidates: &'a [Driver]) -> Option<&'a Driver> {
        candidates.first()
    }
}

/// Smallest great-circle distance to pickup. Ties go to the lower ETA, then to
/// directory order.
#[derive(Debug, Default)]
pub struct NearestCandidate;

impl DriverSelection for NearestCandidate {
    fn select<'a>(&self, pickup: Coordinate, candidates: &'a [Driver]) -> Option<&'a Driver> {
        candidates.iter().min_by(|a, b| {
            let da = haversine_km(pickup, a.position);
            let db = haversine_km(pickup, b.position);
            da.partial_cmp(&db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.eta_minutes.cmp(&b.eta_minutes))
        })
    }
}

pub fn build_selection(policy: SelectionPolicy) -> Box<dyn DriverSelection> {
    match policy {
        SelectionPolicy::First => Box::new(FirstCandidate),
        SelectionPolicy::Nearest => Box::new(NearestCandidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RideClass;

    fn driver(id: &str, lat: f64, lng: f64, eta_minutes: u32) -> Driver {
        Driver {
            id: id.to_string(),
            position: Coordinate { lat, lng },
            ride_class: RideClass::Standard,
            name: "Test Driver".to_string(),
            rating: 4.5,
            vehicle: "Toyota Camry".to_string(),
            eta_minutes,
        }
    }

    const PICKUP: Coordinate = Coordinate {
        lat: 40.7128,
        lng: -74.0060,
    };

    #[test]
    fn first_candidate_takes_index_zero() {
        let pool = vec![
            driver("far", 40.7200, -74.0060, 9),
            driver("near", 40.7129, -74.0060, 1),
        ];
        let chosen = FirstCandidate.select(PICKUP, &pool).expect("driver");
        assert_eq!(chosen.id, "far");
    }

    #[test]
    fn nearest_candidate_ranks_by_distance() {
        let pool = vec![
            driver("far", 40.7200, -74.0060, 1),
            driver("near", 40.7129, -74.0060, 9),
        ];
        let chosen = NearestCandidate.select(PICKUP, &pool).expect("driver");
        assert_eq!(chosen.id, "near");
    }

    #[test]
    fn nearest_breaks_ties_on_eta_then_order() {
        let pool = vec![
            driver("slow", 40.7150, -74.0060, 8),
            driver("quick", 40.7150, -74.0060, 2),
            driver("quick-later", 40.7150, -74.0060, 2),
        ];
        let chosen = NearestCandidate.select(PICKUP, &pool).expect("driver");
        assert_eq!(chosen.id, "quick");
    }

    #[test]
    fn empty_pool_selects_nobody() {
        for policy in [SelectionPolicy::First, SelectionPolicy::Nearest] {
            assert!(build_selection(policy).select(PICKUP, &[]).is_none());
        }
    }
}

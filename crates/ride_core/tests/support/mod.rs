#![allow(dead_code)]

pub mod fleet;

use ride_core::FareBreakdown;

/// Money comparisons tolerate one cent of float noise.
pub fn assert_amount(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 0.011,
        "expected {expected}, got {actual}"
    );
}

pub fn assert_consistent(fare: &FareBreakdown) {
    assert!(
        fare.is_consistent(),
        "total {} vs components {}",
        fare.total,
        fare.components_sum()
    );
}

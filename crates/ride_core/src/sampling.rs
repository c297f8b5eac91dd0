//! Seedable random source shared by the simulated services.
//!
//! Every service owns one [`SimRng`]. Seeded sources make driver pools, route
//! jitter and generated ids reproducible in tests; unseeded ones draw from OS
//! entropy.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::{Builder, Uuid};

use crate::geo::Coordinate;

#[derive(Debug)]
pub struct SimRng {
    rng: Mutex<StdRng>,
}

impl SimRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Stream for one service: `seed + offset`, so services never share a sequence.
    pub fn derived(seed: Option<u64>, offset: u64) -> Self {
        Self::new(seed.map(|seed| seed.wrapping_add(offset)))
    }

    /// Run `f` with exclusive access to the generator. Do not hold across an `.await`.
    pub fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        // A panic in another caller cannot leave StdRng in a broken state.
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

/// Widest offset that still means something on a lat/lng grid.
const MAX_JITTER_DEGREES: f64 = 360.0;

/// Uniform offset in `[-amplitude, amplitude]`. Amplitude is capped at a full
/// turn; NaN or non-positive amplitudes give no offset.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude.is_nan() || amplitude <= 0.0 {
        return 0.0;
    }
    let amplitude = amplitude.min(MAX_JITTER_DEGREES);
    rng.gen_range(-amplitude..=amplitude)
}

/// `origin` moved independently on each axis by at most `amplitude` degrees.
pub fn scatter<R: Rng + ?Sized>(rng: &mut R, origin: Coordinate, amplitude: f64) -> Coordinate {
    let d_lat = jitter(rng, amplitude);
    let d_lng = jitter(rng, amplitude);
    origin.offset(d_lat, d_lng)
}

pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    if items.is_empty() {
        return "";
    }
    items[rng.gen_range(0..items.len())]
}

/// `prefix-<uuid>` built from generator bytes, so seeded runs yield the same ids.
pub fn next_id<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let uuid: Uuid = Builder::from_random_bytes(rng.gen()).into_uuid();
    format!("{prefix}-{}", uuid.simple())
}

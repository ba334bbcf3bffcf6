//! Test-only utilities for `minibus-solver-vrp`.
//!
//! The helpers in this module are available to unit tests, behavioural tests
//! and benchmarks. They are gated behind the `test-support` feature (and
//! `cfg(test)`).

use minibus_core::{Location, OptimizationRequest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Depot used by generated requests: central Accra.
pub const ACCRA_DEPOT: Location = Location::new(5.6037, -0.1870);

/// Generate a deterministic request with `stops` stops scattered within
/// roughly 5 km of [`ACCRA_DEPOT`].
///
/// Demands fall in `1..=20` so any request with
/// `vehicles >= ceil(total / 60)` is usually feasible.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "coordinates are offset from the depot by random deltas"
)]
pub fn scattered_request(stops: usize, vehicles: usize, seed: u64) -> OptimizationRequest {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut locations = Vec::with_capacity(stops + 1);
    let mut demands = Vec::with_capacity(stops + 1);
    locations.push(ACCRA_DEPOT);
    demands.push(0);
    for _ in 0..stops {
        let d_lat: f64 = rng.gen_range(-0.045..0.045);
        let d_lon: f64 = rng.gen_range(-0.045..0.045);
        locations.push(Location::new(
            ACCRA_DEPOT.latitude + d_lat,
            ACCRA_DEPOT.longitude + d_lon,
        ));
        demands.push(rng.gen_range(1..=20));
    }
    OptimizationRequest::new(locations, demands, vehicles)
}

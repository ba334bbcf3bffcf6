//! Round-robin fallback router.
//!
//! Used when the constrained solver fails. Stops are split into contiguous
//! chunks in input order, one chunk per vehicle, and each vehicle walks its
//! chunk from the depot and back. The result is always usable but ignores
//! geography, so routes may break fleet limits; such routes are flagged
//! rather than repaired.

use log::warn;

use crate::route::DEPOT;
use crate::{FleetLimits, Location, MatrixBuilder, MatrixError, Route};
use crate::matrix::validate_locations;

/// Cheap construction that always yields at most one route per vehicle.
///
/// # Examples
/// ```
/// use minibus_core::{FallbackRouter, FleetLimits, Location, MatrixBuilder};
///
/// let router = FallbackRouter::new(MatrixBuilder::default(), FleetLimits::default());
/// let locations = [
///     Location::new(5.6037, -0.1870),
///     Location::new(5.6137, -0.1870),
///     Location::new(5.5937, -0.1770),
///     Location::new(5.6237, -0.1970),
/// ];
/// let routes = router.route(&locations, &[0, 10, 10, 10], 2).expect("valid input");
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes[0].visits().collect::<Vec<_>>(), vec![1, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FallbackRouter {
    builder: MatrixBuilder,
    limits: FleetLimits,
}

impl FallbackRouter {
    /// Create a router that estimates hops with `builder`.
    #[must_use]
    pub const fn new(builder: MatrixBuilder, limits: FleetLimits) -> Self {
        Self { builder, limits }
    }

    /// Split stops across `num_vehicles` and trace each chunk.
    ///
    /// The vehicle count is clamped to `1..=N-1`; chunks hold
    /// `ceil((N-1) / vehicles)` stops, so trailing vehicles may stay idle and
    /// are omitted.
    ///
    /// # Errors
    /// Returns [`MatrixError`] when fewer than two locations are supplied or
    /// a coordinate is unusable.
    pub fn route(
        &self,
        locations: &[Location],
        demands: &[u32],
        num_vehicles: usize,
    ) -> Result<Vec<Route>, MatrixError> {
        validate_locations(locations)?;

        let stops: Vec<usize> = (0..locations.len()).filter(|&i| i != DEPOT).collect();
        let vehicles = num_vehicles.clamp(1, stops.len());
        let chunk = stops.len().div_ceil(vehicles);

        let routes: Vec<Route> = stops
            .chunks(chunk)
            .enumerate()
            .map(|(vehicle_id, sequence)| {
                Route::trace(vehicle_id, sequence, demands, &self.limits, |from, to| {
                    match (locations.get(from), locations.get(to)) {
                        (Some(a), Some(b)) => self.builder.hop(*a, *b, from == to),
                        _ => (0, 0),
                    }
                })
            })
            .collect();

        for route in routes.iter().filter(|route| !route.is_feasible) {
            warn!(
                "fallback route for vehicle {} breaks fleet limits (load {}, {} min, {} m)",
                route.vehicle_id,
                route.total_load,
                route.total_time_minutes,
                route.total_distance_meters
            );
        }
        Ok(routes)
    }
}

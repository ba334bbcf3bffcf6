//! Vehicle routes through stops.
//!
//! Aggregates an ordered stop sequence with cumulative load, time and
//! distance, and flags routes that break a fleet limit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FleetLimits;

/// Index of the depot in every request.
pub(crate) const DEPOT: usize = 0;

/// One visit along a route with cumulative totals at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    /// Index of the visited location.
    pub location: usize,
    /// Passengers on board after the visit.
    pub load: u32,
    /// Minutes elapsed since leaving the depot.
    pub time_minutes: u32,
    /// Meters travelled since leaving the depot.
    pub distance_meters: u32,
}

/// A depot-to-depot route owned by one vehicle.
///
/// # Examples
/// ```
/// use minibus_core::{FleetLimits, Route};
///
/// let route = Route::trace(0, &[1, 2], &[0, 10, 15], &FleetLimits::default(), |_, _| (1000, 5));
/// assert_eq!(route.total_load, 25);
/// assert_eq!(route.total_distance_meters, 3000);
/// assert!(route.starts_and_ends_at_depot());
/// assert!(route.is_feasible);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Index of the owning vehicle.
    pub vehicle_id: usize,
    /// Visits in order, depot first and last.
    pub stops: Vec<Stop>,
    /// Passengers collected along the route.
    pub total_load: u32,
    /// Route duration in minutes, return leg included.
    pub total_time_minutes: u32,
    /// Route length in meters, return leg included.
    pub total_distance_meters: u32,
    /// False when the route breaks capacity, time or distance limits.
    pub is_feasible: bool,
}

impl Route {
    /// Walk `sequence` from the depot and back, accumulating totals.
    ///
    /// `leg(from, to)` returns the meters and minutes of one hop. Missing
    /// demands count as zero.
    pub fn trace<F>(
        vehicle_id: usize,
        sequence: &[usize],
        demands: &[u32],
        limits: &FleetLimits,
        mut leg: F,
    ) -> Self
    where
        F: FnMut(usize, usize) -> (u32, u32),
    {
        let mut stops = Vec::with_capacity(sequence.len() + 2);
        stops.push(Stop {
            location: DEPOT,
            load: 0,
            time_minutes: 0,
            distance_meters: 0,
        });

        let mut current = Stop {
            location: DEPOT,
            load: 0,
            time_minutes: 0,
            distance_meters: 0,
        };
        for &location in sequence.iter().chain(std::iter::once(&DEPOT)) {
            let (meters, minutes) = leg(current.location, location);
            let demand = demands.get(location).copied().unwrap_or(0);
            current = Stop {
                location,
                load: current.load.saturating_add(demand),
                time_minutes: current.time_minutes.saturating_add(minutes),
                distance_meters: current.distance_meters.saturating_add(meters),
            };
            stops.push(current);
        }

        let is_feasible = limits.admits(current.load, current.time_minutes, current.distance_meters);
        Self {
            vehicle_id,
            stops,
            total_load: current.load,
            total_time_minutes: current.time_minutes,
            total_distance_meters: current.distance_meters,
            is_feasible,
        }
    }

    /// Non-depot locations in visiting order.
    #[must_use]
    pub fn visits(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops
            .iter()
            .map(|stop| stop.location)
            .filter(|&location| location != DEPOT)
    }

    /// Report whether the first and last stops are the depot.
    #[must_use]
    pub fn starts_and_ends_at_depot(&self) -> bool {
        self.stops.first().map(|stop| stop.location) == Some(DEPOT)
            && self.stops.last().map(|stop| stop.location) == Some(DEPOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn trace_accumulates_totals_and_returns_to_depot() {
        let route = Route::trace(3, &[2, 1], &[0, 5, 7], &FleetLimits::default(), |from, to| {
            let hops = u32::try_from(from.abs_diff(to)).unwrap_or(u32::MAX);
            (hops * 100, hops * 2)
        });

        let locations: Vec<usize> = route.stops.iter().map(|stop| stop.location).collect();
        assert_eq!(locations, vec![0, 2, 1, 0]);
        assert_eq!(route.vehicle_id, 3);
        assert_eq!(route.total_load, 12);
        assert_eq!(route.total_distance_meters, 400);
        assert_eq!(route.total_time_minutes, 8);
        assert_eq!(route.visits().collect::<Vec<_>>(), vec![2, 1]);
        assert!(route.starts_and_ends_at_depot());
    }

    #[rstest]
    fn trace_flags_capacity_violation() {
        let limits = FleetLimits {
            vehicle_capacity: 10,
            ..FleetLimits::default()
        };
        let route = Route::trace(0, &[1, 2], &[0, 6, 6], &limits, |_, _| (10, 1));
        assert_eq!(route.total_load, 12);
        assert!(!route.is_feasible);
    }

    #[rstest]
    fn trace_flags_time_violation() {
        let limits = FleetLimits {
            max_route_time_minutes: 30,
            waiting_slack_minutes: 0,
            ..FleetLimits::default()
        };
        let route = Route::trace(0, &[1], &[0, 1], &limits, |_, _| (10, 20));
        assert_eq!(route.total_time_minutes, 40);
        assert!(!route.is_feasible);
    }
}

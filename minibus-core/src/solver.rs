//! Solver seam between the optimizer service and routing backends.

use std::time::Duration;

use thiserror::Error;

use crate::{FleetLimits, RoutingMatrices};

/// Search budget used when a request does not name one.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

/// Hard ceiling on any search budget.
pub const MAX_TIME_LIMIT: Duration = Duration::from_secs(120);

/// Ordered non-depot stop indices per vehicle; empty tours are omitted.
pub type VehicleTours = Vec<Vec<usize>>;

/// Everything a backend needs to route one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingProblem {
    /// Distance and time matrices, depot at index `0`.
    pub matrices: RoutingMatrices,
    /// Passenger demand per location.
    pub demands: Vec<u32>,
    /// Vehicles available, already clamped to `1..=N-1`.
    pub num_vehicles: usize,
    /// Limits shared by every vehicle.
    pub limits: FleetLimits,
    /// Search budget, never above [`MAX_TIME_LIMIT`].
    pub time_limit: Duration,
}

impl RoutingProblem {
    /// Number of locations including the depot.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.matrices.size()
    }

    /// Demand at `location`, zero when out of range.
    #[must_use]
    pub fn demand(&self, location: usize) -> u32 {
        self.demands.get(location).copied().unwrap_or(0)
    }

    /// Check that `tours` visit every stop exactly once, use at most
    /// `num_vehicles` vehicles and respect every fleet limit.
    ///
    /// # Errors
    /// Returns [`SolverFailure::NoSolutionFound`] on any violation.
    pub fn check_tours(&self, tours: &[Vec<usize>]) -> Result<(), SolverFailure> {
        let size = self.size();
        let mut seen = vec![false; size];
        for &stop in tours.iter().flatten() {
            match seen.get_mut(stop) {
                Some(slot) if stop != 0 && !*slot => *slot = true,
                _ => return Err(SolverFailure::NoSolutionFound),
            }
        }
        let covered = seen.iter().skip(1).all(|&visited| visited);
        let active = tours.iter().filter(|tour| !tour.is_empty()).count();
        if !covered || active > self.num_vehicles {
            return Err(SolverFailure::NoSolutionFound);
        }
        if tours.iter().all(|tour| self.tour_within_limits(tour)) {
            Ok(())
        } else {
            Err(SolverFailure::NoSolutionFound)
        }
    }

    fn tour_within_limits(&self, tour: &[usize]) -> bool {
        let mut load = 0_u32;
        let mut minutes = 0_u32;
        let mut meters = 0_u32;
        let mut previous = 0;
        for &stop in tour.iter().chain(std::iter::once(&0)) {
            load = load.saturating_add(self.demand(stop));
            minutes = minutes.saturating_add(self.matrices.time_between(previous, stop).unwrap_or(0));
            meters =
                meters.saturating_add(self.matrices.distance_between(previous, stop).unwrap_or(0));
            previous = stop;
        }
        self.limits.admits(load, minutes, meters)
    }
}

/// Reasons a backend could not produce routes.
///
/// The optimizer answers every variant by running the fallback router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverFailure {
    /// The backend rejected the model before searching.
    #[error("model creation failed: {reason}")]
    ModelCreationFailed {
        /// Backend-specific explanation.
        reason: String,
    },
    /// The search finished without a complete feasible assignment.
    #[error("no solution found")]
    NoSolutionFound,
}

/// Produce per-vehicle tours for a [`RoutingProblem`].
///
/// Implementations must not panic; every failure is reported as a
/// [`SolverFailure`]. Solvers must be `Send + Sync` so one instance can
/// serve concurrent callers.
pub trait RouteSolver: Send + Sync {
    /// Solve the problem, returning ordered stops per vehicle.
    ///
    /// # Errors
    /// Returns [`SolverFailure`] when no feasible tours were found.
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure>;
}

impl<S: RouteSolver + ?Sized> RouteSolver for Box<S> {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        (**self).solve(problem)
    }
}

impl<S: RouteSolver + ?Sized> RouteSolver for std::sync::Arc<S> {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        (**self).solve(problem)
    }
}

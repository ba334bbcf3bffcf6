//! Deterministic solvers and fixtures used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::{
    Location, OptimizationRequest, RouteSolver, RoutingProblem, SolverFailure, VehicleTours,
};

/// Accra request with four stops, demands `[0, 15, 20, 25, 10]` and two
/// vehicles.
#[must_use]
pub fn accra_request() -> OptimizationRequest {
    OptimizationRequest::new(
        vec![
            Location::new(5.6037, -0.1870),
            Location::new(5.6137, -0.1870),
            Location::new(5.5937, -0.1770),
            Location::new(5.6237, -0.1970),
            Location::new(5.5837, -0.1670),
        ],
        vec![0, 15, 20, 25, 10],
        2,
    )
}

/// Solver that always fails with a fixed [`SolverFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingSolver {
    failure: SolverFailure,
}

impl FailingSolver {
    /// Fail with [`SolverFailure::NoSolutionFound`].
    #[must_use]
    pub const fn no_solution() -> Self {
        Self {
            failure: SolverFailure::NoSolutionFound,
        }
    }

    /// Fail with [`SolverFailure::ModelCreationFailed`].
    #[must_use]
    pub fn model_creation(reason: &str) -> Self {
        Self {
            failure: SolverFailure::ModelCreationFailed {
                reason: reason.to_owned(),
            },
        }
    }
}

impl RouteSolver for FailingSolver {
    fn solve(&self, _problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        Err(self.failure.clone())
    }
}

/// Solver returning the same tours for every problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedToursSolver {
    tours: VehicleTours,
}

impl FixedToursSolver {
    /// Return `tours` from every call.
    #[must_use]
    pub const fn new(tours: VehicleTours) -> Self {
        Self { tours }
    }
}

impl RouteSolver for FixedToursSolver {
    fn solve(&self, _problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        Ok(self.tours.clone())
    }
}

/// First-fit solver visiting stops in index order.
///
/// A stop joins the current tour while capacity allows, otherwise a new tour
/// opens. Running out of vehicles is reported as
/// [`SolverFailure::NoSolutionFound`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSolver;

impl RouteSolver for SweepSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        let capacity = problem.limits.vehicle_capacity;
        let mut tours: VehicleTours = vec![Vec::new()];
        let mut load = 0_u32;
        for stop in 1..problem.size() {
            let demand = problem.demand(stop);
            if demand > capacity {
                return Err(SolverFailure::NoSolutionFound);
            }
            if load.saturating_add(demand) > capacity {
                tours.push(Vec::new());
                load = 0;
            }
            load = load.saturating_add(demand);
            if let Some(tour) = tours.last_mut() {
                tour.push(stop);
            }
        }
        if tours.len() > problem.num_vehicles {
            return Err(SolverFailure::NoSolutionFound);
        }
        Ok(tours)
    }
}

/// [`SweepSolver`] that counts calls and pauses to widen race windows.
#[derive(Debug, Default)]
pub struct CountingSolver {
    calls: AtomicUsize,
    pause: Duration,
}

impl CountingSolver {
    /// Count calls and sleep for `pause` inside each one.
    #[must_use]
    pub const fn with_pause(pause: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            pause,
        }
    }

    /// Number of completed `solve` calls.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteSolver for CountingSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        SweepSolver.solve(problem)
    }
}

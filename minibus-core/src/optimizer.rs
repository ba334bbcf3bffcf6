//! Fleet optimizer service.
//!
//! [`FleetOptimizer`] owns its configuration and a [`RouteSolver`] backend.
//! Each call validates the request, builds fresh matrices, asks the backend
//! for tours and falls back to the round-robin router when the backend
//! reports a [`SolverFailure`](crate::SolverFailure). The chosen routes are then costed.

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

use crate::cost::CostModelError;
use crate::{
    ConfigError, CostModel, CostWeights, Diagnostics, EconomicParameters, FallbackRouter,
    FleetLimits, MatrixBuilder, MatrixError, MatrixSettings, OptimizationRequest, RequestError,
    Route, RouteSolver, RoutingMatrices, RoutingProblem, Solution, SolutionStatus,
    DEFAULT_TIME_LIMIT, MAX_TIME_LIMIT,
};

/// Errors returned by [`FleetOptimizer`].
///
/// Solver failures never surface here; they trigger the fallback instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// The request failed validation.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Matrices could not be built.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// The optimizer configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The cost model rejected its weights or constants.
    #[error(transparent)]
    Cost(#[from] CostModelError),
    /// A fleet-size search was given an empty range.
    #[error("fleet size range {start}..={end} is empty")]
    EmptyFleetRange {
        /// First vehicle count in the range.
        start: usize,
        /// Last vehicle count in the range.
        end: usize,
    },
}

/// Settings for a [`FleetOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Matrix estimation settings, shared with the fallback router.
    pub matrix: MatrixSettings,
    /// Limits shared by every vehicle.
    pub limits: FleetLimits,
    /// Economic constants for the cost model.
    pub economics: EconomicParameters,
    /// Cost dimension weights.
    pub weights: CostWeights,
    /// Search budget used when a request names none.
    pub time_limit: Duration,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            matrix: MatrixSettings::default(),
            limits: FleetLimits::default(),
            economics: EconomicParameters::default(),
            weights: CostWeights::default(),
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

impl OptimizerConfig {
    /// Validate every nested setting.
    ///
    /// # Errors
    /// Returns [`OptimizeError::Config`] or [`OptimizeError::Cost`] for the
    /// first invalid setting.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        self.matrix.validate()?;
        self.limits.validate()?;
        self.economics.validate()?;
        self.weights.validate()?;
        if self.time_limit.is_zero() {
            return Err(ConfigError::invalid("time_limit", "must be positive").into());
        }
        Ok(())
    }
}

/// Routes requests through a [`RouteSolver`] with a guaranteed fallback.
///
/// # Examples
/// ```
/// use minibus_core::{
///     FleetOptimizer, Location, OptimizationRequest, RouteSolver, RoutingProblem, SolverFailure,
///     VehicleTours,
/// };
///
/// struct Declining;
///
/// impl RouteSolver for Declining {
///     fn solve(&self, _problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
///         Err(SolverFailure::NoSolutionFound)
///     }
/// }
///
/// let request = OptimizationRequest::new(
///     vec![Location::new(5.6037, -0.1870), Location::new(5.6137, -0.1870)],
///     vec![0, 12],
///     1,
/// );
/// let solution = FleetOptimizer::new(Declining).optimize(&request).expect("valid request");
/// assert!(solution.is_fallback);
/// assert_eq!(solution.message, "Fallback solution generated");
/// ```
#[derive(Debug, Clone)]
pub struct FleetOptimizer<S> {
    solver: S,
    config: OptimizerConfig,
    builder: MatrixBuilder,
    cost_model: CostModel,
    fallback: FallbackRouter,
}

impl<S: RouteSolver> FleetOptimizer<S> {
    /// Create an optimizer with default settings.
    #[must_use]
    pub fn new(solver: S) -> Self {
        let config = OptimizerConfig::default();
        let builder = MatrixBuilder::new(config.matrix);
        Self {
            solver,
            config,
            builder,
            cost_model: CostModel::default(),
            fallback: FallbackRouter::new(builder, config.limits),
        }
    }

    /// Create an optimizer after validating `config`.
    ///
    /// # Errors
    /// Returns [`OptimizeError`] when any setting is invalid.
    pub fn with_config(solver: S, config: OptimizerConfig) -> Result<Self, OptimizeError> {
        config.validate()?;
        let builder = MatrixBuilder::new(config.matrix);
        Ok(Self {
            solver,
            config,
            builder,
            cost_model: CostModel::new(config.economics, config.weights)?,
            fallback: FallbackRouter::new(builder, config.limits),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Backend in use.
    #[must_use]
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Route one request.
    ///
    /// # Errors
    /// Returns [`OptimizeError`] when the request is invalid. Backend failures
    /// are answered with a fallback solution instead of an error.
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<Solution, OptimizeError> {
        let started = Instant::now();
        request.validate()?;
        let matrices = self.builder.build(&request.locations)?;
        let problem = RoutingProblem {
            matrices,
            demands: request.demands.clone(),
            num_vehicles: request.effective_vehicles(),
            limits: self.config.limits,
            time_limit: self.time_limit(request),
        };

        let outcome = self
            .solver
            .solve(&problem)
            .and_then(|tours| problem.check_tours(&tours).map(|()| tours));
        let (routes, status, fallback_reason) = match outcome {
            Ok(tours) => (
                trace_tours(&problem, &tours),
                SolutionStatus::Optimal,
                None,
            ),
            Err(failure) => {
                warn!("route solver failed ({failure}); using fallback router");
                let routes =
                    self.fallback
                        .route(&request.locations, &request.demands, problem.num_vehicles)?;
                (routes, SolutionStatus::Fallback, Some(failure.to_string()))
            }
        };

        let diagnostics = Diagnostics {
            wall_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            matrix_size: problem.size(),
            time_limit_seconds: problem.time_limit.as_secs(),
        };
        let solution = Solution::assemble(
            routes,
            status,
            fallback_reason,
            &self.cost_model,
            self.config.limits.vehicle_capacity,
            diagnostics,
        );
        debug!(
            "{} with {} vehicles, {} m, scalarized cost {:.3} in {} ms",
            solution.status.label(),
            solution.vehicles_used,
            solution.total_distance_meters,
            solution.cost.scalarized_cost,
            solution.diagnostics.wall_time_ms
        );
        Ok(solution)
    }

    /// Solve for every fleet size in `vehicles` and keep the cheapest.
    ///
    /// Feasible solutions beat infeasible ones. Within the same feasibility
    /// candidates compare by [`crate::CostEvaluation::cmp_preference`] and the
    /// smaller fleet wins an exact tie.
    ///
    /// # Errors
    /// Returns [`OptimizeError::EmptyFleetRange`] for an empty range and the
    /// first request error otherwise.
    pub fn optimize_fleet_size(
        &self,
        request: &OptimizationRequest,
        vehicles: RangeInclusive<usize>,
    ) -> Result<Solution, OptimizeError> {
        if vehicles.is_empty() {
            return Err(OptimizeError::EmptyFleetRange {
                start: *vehicles.start(),
                end: *vehicles.end(),
            });
        }
        let mut best: Option<Solution> = None;
        for num_vehicles in vehicles {
            let candidate = self.optimize(&OptimizationRequest {
                num_vehicles,
                ..request.clone()
            })?;
            let better = best
                .as_ref()
                .is_none_or(|current| prefer(&candidate, current).is_lt());
            if better {
                best = Some(candidate);
            }
        }
        best.ok_or(OptimizeError::EmptyFleetRange { start: 0, end: 0 })
    }

    fn time_limit(&self, request: &OptimizationRequest) -> Duration {
        request
            .time_limit_seconds
            .map_or(self.config.time_limit, Duration::from_secs)
            .min(MAX_TIME_LIMIT)
    }
}

fn prefer(candidate: &Solution, current: &Solution) -> std::cmp::Ordering {
    current
        .is_feasible()
        .cmp(&candidate.is_feasible())
        .then_with(|| candidate.cost.cmp_preference(&current.cost))
}

fn trace_tours(problem: &RoutingProblem, tours: &[Vec<usize>]) -> Vec<Route> {
    let matrices: &RoutingMatrices = &problem.matrices;
    tours
        .iter()
        .filter(|tour| !tour.is_empty())
        .enumerate()
        .map(|(vehicle_id, tour)| {
            Route::trace(
                vehicle_id,
                tour,
                &problem.demands,
                &problem.limits,
                |from, to| {
                    (
                        matrices.distance_between(from, to).unwrap_or(0),
                        matrices.time_between(from, to).unwrap_or(0),
                    )
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSolver, FixedToursSolver, SweepSolver, accra_request};
    use rstest::rstest;

    #[rstest]
    fn uses_solver_tours_when_they_check_out() {
        let optimizer = FleetOptimizer::new(FixedToursSolver::new(vec![vec![1, 2], vec![3, 4]]));
        let solution = optimizer.optimize(&accra_request()).expect("valid request");
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(!solution.is_fallback);
        assert_eq!(solution.fallback_reason, None);
        assert_eq!(solution.total_load, 70);
        assert_eq!(solution.vehicles_used, 2);
        assert_eq!(solution.diagnostics.matrix_size, 5);
    }

    #[rstest]
    #[case::no_solution(FailingSolver::no_solution(), "no solution found")]
    #[case::model(FailingSolver::model_creation("boom"), "model creation failed: boom")]
    fn falls_back_on_solver_failure(#[case] solver: FailingSolver, #[case] reason: &str) {
        let optimizer = FleetOptimizer::new(solver);
        let solution = optimizer.optimize(&accra_request()).expect("valid request");
        assert!(solution.is_fallback);
        assert_eq!(solution.status, SolutionStatus::Fallback);
        assert_eq!(solution.message, "Fallback solution generated");
        assert_eq!(solution.fallback_reason.as_deref(), Some(reason));
        assert_eq!(solution.total_load, 70);
        assert!(solution.routes.len() <= 2);
    }

    #[rstest]
    fn falls_back_when_tours_miss_stops() {
        let optimizer = FleetOptimizer::new(FixedToursSolver::new(vec![vec![1, 2]]));
        let solution = optimizer.optimize(&accra_request()).expect("valid request");
        assert!(solution.is_fallback);
    }

    #[rstest]
    fn rejects_invalid_requests_before_solving() {
        let mut request = accra_request();
        request.demands[0] = 3;
        let err = FleetOptimizer::new(FailingSolver::no_solution())
            .optimize(&request)
            .expect_err("depot demand");
        assert_eq!(
            err,
            OptimizeError::Request(RequestError::DepotDemand { demand: 3 })
        );
    }

    #[rstest]
    fn caps_request_time_limit() {
        let request = accra_request().with_time_limit(Duration::from_secs(600));
        let solution = FleetOptimizer::new(SweepSolver)
            .optimize(&request)
            .expect("valid request");
        assert_eq!(
            solution.diagnostics.time_limit_seconds,
            MAX_TIME_LIMIT.as_secs()
        );
    }

    #[rstest]
    fn with_config_rejects_invalid_weights() {
        let config = OptimizerConfig {
            weights: CostWeights {
                financial: 1.0,
                ..CostWeights::default()
            },
            ..OptimizerConfig::default()
        };
        let err = FleetOptimizer::with_config(SweepSolver, config).expect_err("bad weights");
        assert!(matches!(err, OptimizeError::Cost(_)));
    }

    #[rstest]
    fn fleet_size_search_keeps_preferred_solution() {
        let optimizer = FleetOptimizer::new(SweepSolver);
        let request = accra_request();
        let best = optimizer
            .optimize_fleet_size(&request, 1..=4)
            .expect("valid request");
        for vehicles in 1..=4 {
            let candidate = optimizer
                .optimize(&OptimizationRequest {
                    num_vehicles: vehicles,
                    ..request.clone()
                })
                .expect("valid request");
            if candidate.is_feasible() {
                assert!(best.cost.cmp_preference(&candidate.cost).is_le());
            }
        }
        assert!(best.is_feasible());
        assert!(best.vehicles_used >= 2);
    }

    #[rstest]
    fn fleet_size_search_rejects_empty_range() {
        #[expect(clippy::reversed_empty_ranges, reason = "exercising the empty case")]
        let range = 3..=1;
        let err = FleetOptimizer::new(SweepSolver)
            .optimize_fleet_size(&accra_request(), range)
            .expect_err("empty range");
        assert_eq!(err, OptimizeError::EmptyFleetRange { start: 3, end: 1 });
    }
}

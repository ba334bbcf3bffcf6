//! `vrp-core` modelling helpers for `VrpSolver`.
//!
//! This module converts a [`RoutingProblem`] into a capacitated `vrp-core`
//! problem with one job per stop and one vehicle per fleet slot, runs the
//! metaheuristic, and translates the resulting tours back into stop indices.
//!
//! Capacity is enforced by the capacity feature, route time by the
//! time-constrained transport feature with each shift ending at the route
//! time limit, and route distance by the travel limit feature.
//!
//! `vrp-core` reports progress through an [`InfoLogger`] that prints to
//! stdout by default. Both the problem and the solver environment get a
//! logger that forwards to `log::debug!` instead.

use std::sync::Arc;

use minibus_core::{RoutingProblem, SolverFailure, VehicleTours};
use vrp_core::construction::features::{TravelLimitFn, create_travel_limit_feature};
use vrp_core::models::common::{Distance, Duration, Location, Profile};
use vrp_core::models::problem::{Actor, TravelTime};
use vrp_core::models::solution::Route as VrpRoute;
use vrp_core::prelude::*;

use crate::solver::VrpSolverConfig;

/// Matrix-backed transport cost: distances in meters, durations in minutes.
struct MatrixTransportCost {
    meters: Vec<Vec<f64>>,
    minutes: Vec<Vec<f64>>,
}

impl MatrixTransportCost {
    fn new(problem: &RoutingProblem) -> Self {
        let widen = |matrix: &[Vec<u32>]| -> Vec<Vec<f64>> {
            matrix
                .iter()
                .map(|row| row.iter().copied().map(f64::from).collect())
                .collect()
        };
        Self {
            meters: widen(problem.matrices.distance()),
            minutes: widen(problem.matrices.time()),
        }
    }

    fn lookup(matrix: &[Vec<f64>], from: Location, to: Location) -> f64 {
        let value = matrix.get(from).and_then(|row| row.get(to)).copied();
        debug_assert!(value.is_some(), "Matrix lookup failed: from={from}, to={to}");
        value.unwrap_or(0.0)
    }

    fn meters(&self, from: Location, to: Location) -> f64 {
        Self::lookup(&self.meters, from, to)
    }

    fn minutes(&self, from: Location, to: Location) -> f64 {
        Self::lookup(&self.minutes, from, to)
    }
}

impl TransportCost for MatrixTransportCost {
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        self.meters(from, to)
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> f64 {
        self.minutes(from, to)
    }

    fn distance_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.meters(from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.minutes(from, to)
    }
}

const DISTANCE_LIMIT_CODE: ViolationCode = ViolationCode(1);
const DURATION_LIMIT_CODE: ViolationCode = ViolationCode(2);

/// Routes `vrp-core` progress messages through the `log` facade so nothing
/// reaches stdout.
fn debug_logger() -> InfoLogger {
    Arc::new(|message: &str| log::debug!("vrp-core: {message}"))
}

fn define_goal(transport: Arc<MatrixTransportCost>, limit_meters: f64) -> GenericResult<GoalContext> {
    let minimize_unassigned = MinimizeUnassignedBuilder::new("min-unassigned").build()?;
    let capacity_feature = CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?;
    let transport_feature = TransportFeatureBuilder::new("min-distance")
        .set_transport_cost(transport.clone())
        .set_time_constrained(true)
        .build_minimize_distance()?;
    // Route time is bounded by the shift end, so only distance is limited here.
    let distance_limit: TravelLimitFn<Distance> = Arc::new(move |_: &Actor| Some(limit_meters));
    let no_duration_limit: TravelLimitFn<Duration> = Arc::new(|_: &Actor| None);
    let distance_feature = create_travel_limit_feature(
        "max-route-distance",
        transport,
        DISTANCE_LIMIT_CODE,
        DURATION_LIMIT_CODE,
        distance_limit,
        no_duration_limit,
    )?;

    GoalContextBuilder::with_features(&[
        minimize_unassigned,
        transport_feature,
        capacity_feature,
        distance_feature,
    ])?
    .build()
}

fn to_load(value: u32) -> GenericResult<i32> {
    i32::try_from(value).map_err(|_| format!("load {value} exceeds the solver range").into())
}

fn define_problem(
    problem: &RoutingProblem,
    goal: GoalContext,
    transport: Arc<MatrixTransportCost>,
) -> GenericResult<Problem> {
    let jobs = (1..problem.size())
        .map(|stop| {
            SingleBuilder::default()
                .id(format!("stop{stop}").as_str())
                .demand(Demand::delivery(to_load(problem.demand(stop))?))
                .location(stop)?
                .build_as_job()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let capacity = to_load(problem.limits.vehicle_capacity)?;
    let shift_end = f64::from(problem.limits.max_route_time_minutes);
    let vehicles = (0..problem.num_vehicles)
        .map(|idx| {
            VehicleBuilder::default()
                .id(format!("minibus{idx}").as_str())
                .add_detail(
                    VehicleDetailBuilder::default()
                        .set_start_location(0)
                        .set_start_time(0.0)
                        .set_end_location(0)
                        .set_end_time(shift_end)
                        .build()?,
                )
                .capacity(SingleDimLoad::new(capacity))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .with_logger(debug_logger())
        .build()
}

fn model_error(err: impl std::fmt::Display) -> SolverFailure {
    SolverFailure::ModelCreationFailed {
        reason: err.to_string(),
    }
}

/// Context for running a `vrp-core` solve with shared configuration.
pub(super) struct VrpSolveContext<'a> {
    config: &'a VrpSolverConfig,
}

impl<'a> VrpSolveContext<'a> {
    /// Create a new solve context.
    pub(super) const fn new(config: &'a VrpSolverConfig) -> Self {
        Self { config }
    }

    /// Build the model for `problem` and search for tours.
    pub(super) fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        let transport = Arc::new(MatrixTransportCost::new(problem));
        let limit_meters = f64::from(problem.limits.max_route_distance_meters);
        let goal = define_goal(transport.clone(), limit_meters).map_err(model_error)?;
        let vrp_problem =
            Arc::new(define_problem(problem, goal, transport).map_err(model_error)?);

        let max_seconds = usize::try_from(problem.time_limit.as_secs())
            .unwrap_or(usize::MAX)
            .max(1);
        let environment = Arc::new(Environment {
            logger: debug_logger(),
            ..Environment::default()
        });
        let vrp_config = VrpConfigBuilder::new(vrp_problem.clone())
            .set_environment(environment)
            .prebuild()
            .map_err(model_error)?
            .with_max_time(Some(max_seconds))
            .with_max_generations(Some(self.config.max_generations))
            .build()
            .map_err(model_error)?;

        let solution = vrp_core::solver::Solver::new(vrp_problem, vrp_config)
            .solve()
            .map_err(|err| {
                log::warn!("vrp-core search failed: {err}");
                SolverFailure::NoSolutionFound
            })?;

        if !solution.unassigned.is_empty() {
            log::warn!(
                "vrp-core left {} of {} stops unassigned",
                solution.unassigned.len(),
                problem.size().saturating_sub(1)
            );
            return Err(SolverFailure::NoSolutionFound);
        }

        Ok(solution
            .get_locations()
            .map(|tour| tour.filter(|&location| location != 0).collect::<Vec<_>>())
            .filter(|tour| !tour.is_empty())
            .collect())
    }
}

//! Tests for the `VrpSolver`.

use std::time::Duration;

use super::*;
use minibus_core::test_support::accra_request;
use minibus_core::{FleetLimits, MatrixBuilder};
use rstest::{fixture, rstest};

#[fixture]
fn problem() -> RoutingProblem {
    let request = accra_request();
    let matrices = MatrixBuilder::default()
        .build(&request.locations)
        .expect("valid locations");
    RoutingProblem {
        matrices,
        demands: request.demands,
        num_vehicles: 2,
        limits: FleetLimits::default(),
        time_limit: Duration::from_secs(1),
    }
}

fn quick_solver() -> VrpSolver {
    VrpSolver::with_config(VrpSolverConfig {
        max_generations: 50,
    })
    .expect("valid config")
}

#[rstest]
fn splits_demand_across_vehicles_within_capacity(problem: RoutingProblem) {
    let tours = quick_solver().solve(&problem).expect("solve should succeed");
    assert_eq!(tours.len(), 2);
    for tour in &tours {
        let load: u32 = tour.iter().map(|&stop| problem.demand(stop)).sum();
        assert!(load <= 60, "tour {tour:?} carries {load} passengers");
    }
    let mut visited: Vec<usize> = tours.into_iter().flatten().collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3, 4]);
}

#[rstest]
fn reports_no_solution_when_capacity_is_short(mut problem: RoutingProblem) {
    problem.num_vehicles = 1;
    let err = quick_solver().solve(&problem).expect_err("70 passengers exceed one bus");
    assert_eq!(err, SolverFailure::NoSolutionFound);
}

#[rstest]
fn respects_route_distance_limit(mut problem: RoutingProblem) {
    problem.limits.max_route_distance_meters = 100;
    let err = quick_solver().solve(&problem).expect_err("no stop fits in 100 m");
    assert_eq!(err, SolverFailure::NoSolutionFound);
}

#[rstest]
fn respects_route_time_limit(mut problem: RoutingProblem) {
    problem.limits.max_route_time_minutes = 2;
    problem.limits.waiting_slack_minutes = 0;
    let err = quick_solver().solve(&problem).expect_err("no round trip fits in 2 min");
    assert_eq!(err, SolverFailure::NoSolutionFound);
}

#[rstest]
fn rejects_zero_generations() {
    let err = VrpSolver::with_config(VrpSolverConfig { max_generations: 0 })
        .expect_err("zero generations");
    assert!(matches!(err, ConfigError::Invalid { field: "max_generations", .. }));
}

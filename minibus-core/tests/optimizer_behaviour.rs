//! Behavioural tests for `FleetOptimizer` using rstest-bdd.

use std::cell::RefCell;

use minibus_core::{
    FleetOptimizer, Location, OptimizationRequest, OptimizeError, RequestError, Route,
    RouteSolver, RoutingProblem, Solution, SolutionStatus, SolverFailure, VehicleTours,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Clone, Default)]
enum SolverChoice {
    Tours(VehicleTours),
    #[default]
    Failing,
}

impl RouteSolver for SolverChoice {
    fn solve(&self, _problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        match self {
            Self::Tours(tours) => Ok(tours.clone()),
            Self::Failing => Err(SolverFailure::NoSolutionFound),
        }
    }
}

#[derive(Debug)]
struct OptimizerWorld {
    request: RefCell<Option<OptimizationRequest>>,
    solver: RefCell<SolverChoice>,
    outcome: RefCell<Option<Result<Solution, OptimizeError>>>,
}

impl OptimizerWorld {
    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<Solution, OptimizeError> {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_solution(&self) -> Solution {
        self.expect_outcome().expect("expected optimize success")
    }
}

#[fixture]
fn world() -> OptimizerWorld {
    OptimizerWorld {
        request: RefCell::new(None),
        solver: RefCell::new(SolverChoice::default()),
        outcome: RefCell::new(None),
    }
}

#[given("the Accra request with two vehicles")]
fn given_accra_request(world: &OptimizerWorld) {
    world.request.replace(Some(OptimizationRequest::new(
        vec![
            Location::new(5.6037, -0.1870),
            Location::new(5.6137, -0.1870),
            Location::new(5.5937, -0.1770),
            Location::new(5.6237, -0.1970),
            Location::new(5.5837, -0.1670),
        ],
        vec![0, 15, 20, 25, 10],
        2,
    )));
}

#[given("the depot demand is set to 5")]
fn given_depot_demand(world: &OptimizerWorld) {
    if let Some(request) = world.request.borrow_mut().as_mut() {
        if let Some(depot) = request.demands.first_mut() {
            *depot = 5;
        }
    }
}

#[given("a solver that returns tours covering every stop")]
fn given_covering_solver(world: &OptimizerWorld) {
    world
        .solver
        .replace(SolverChoice::Tours(vec![vec![1, 3], vec![2, 4]]));
}

#[given("a solver that always fails")]
fn given_failing_solver(world: &OptimizerWorld) {
    world.solver.replace(SolverChoice::Failing);
}

#[when("the fleet optimizer runs")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_optimizer_runs(world: &OptimizerWorld) {
    let request = world
        .request
        .borrow()
        .clone()
        .expect("request should be configured");
    let optimizer = FleetOptimizer::new(world.solver.borrow().clone());
    world.outcome.replace(Some(optimizer.optimize(&request)));
}

#[then("the solution status is optimal")]
fn then_optimal(world: &OptimizerWorld) {
    let solution = world.expect_solution();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert!(!solution.is_fallback);
}

#[then("the total load is 70")]
fn then_total_load(world: &OptimizerWorld) {
    assert_eq!(world.expect_solution().total_load, 70);
}

#[then("no route carries more than 60 passengers")]
fn then_capacity_respected(world: &OptimizerWorld) {
    let solution = world.expect_solution();
    assert!(solution.routes.iter().all(|route| route.total_load <= 60));
    assert!(solution.is_feasible());
}

#[then("the solution is a fallback solution")]
fn then_fallback(world: &OptimizerWorld) {
    let solution = world.expect_solution();
    assert!(solution.is_fallback);
    assert_eq!(solution.status, SolutionStatus::Fallback);
    assert!(solution.fallback_reason.is_some());
}

#[then("the status message is Fallback solution generated")]
fn then_fallback_message(world: &OptimizerWorld) {
    assert_eq!(
        world.expect_solution().message,
        "Fallback solution generated"
    );
}

#[then("every route starts and ends at the depot")]
fn then_depot_bookends(world: &OptimizerWorld) {
    let solution = world.expect_solution();
    assert!(!solution.routes.is_empty());
    assert!(solution.routes.iter().all(Route::starts_and_ends_at_depot));
}

#[then("the request is rejected for depot demand")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_depot_demand_rejected(world: &OptimizerWorld) {
    let err = world.expect_outcome().expect_err("expected a request error");
    assert_eq!(
        err,
        OptimizeError::Request(RequestError::DepotDemand { demand: 5 })
    );
}

#[scenario(path = "tests/features/optimizer.feature", index = 0)]
fn accepts_solver_tours(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/optimizer.feature", index = 1)]
fn falls_back_on_failure(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/optimizer.feature", index = 2)]
fn rejects_depot_demand(world: OptimizerWorld) {
    let _ = world;
}

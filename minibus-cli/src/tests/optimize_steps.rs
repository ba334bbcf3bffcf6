//! Behaviour-driven step definitions driving the optimize CLI scenarios.

use super::helpers::{StubBuilder, StubSolver, Workspace, accra_request};
use super::*;
use crate::optimize::run_optimize_with;
use minibus_core::{OptimizeError, RequestError, Solution, SolutionStatus};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Debug)]
struct OptimizeWorld {
    workspace: Workspace,
    include_request: RefCell<bool>,
    solver: RefCell<StubSolver>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl OptimizeWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            include_request: RefCell::new(true),
            solver: RefCell::new(StubSolver(None)),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["minibus".to_owned(), "optimize".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.workspace.path("request.json").as_str().to_owned());
        }
        argv
    }

    fn solution(&self) -> Solution {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be a JSON solution")
    }

    fn error(&self) -> CliError {
        self.result
            .replace(None)
            .expect("result recorded")
            .expect_err("expected error")
    }
}

#[fixture]
fn world() -> OptimizeWorld {
    OptimizeWorld::new()
}

#[given("a valid optimization request exists on disk")]
fn valid_request_exists(#[from(world)] world: &OptimizeWorld) {
    let request = serde_json::to_value(accra_request()).expect("serialize request");
    world.workspace.write_json("request.json", &request);
}

#[given("an optimization request whose depot has demand exists on disk")]
fn depot_demand_request_exists(#[from(world)] world: &OptimizeWorld) {
    let mut request = accra_request();
    request.demands[0] = 4;
    let value = serde_json::to_value(request).expect("serialize request");
    world.workspace.write_json("request.json", &value);
}

#[given("I omit the request path")]
fn omit_request_path(#[from(world)] world: &OptimizeWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("the routing solver returns two tours")]
fn solver_returns_tours(#[from(world)] world: &OptimizeWorld) {
    world
        .solver
        .replace(StubSolver(Some(vec![vec![1, 3], vec![2, 4]])));
}

#[given("the routing solver fails")]
fn solver_fails(#[from(world)] world: &OptimizeWorld) {
    world.solver.replace(StubSolver(None));
}

#[when("I run the optimize command")]
fn run_optimize_command(#[from(world)] world: &OptimizeWorld) {
    let parsed = Cli::try_parse_from(world.build_command_line()).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Optimize(args) => {
            let builder = StubBuilder(world.solver.borrow().clone());
            let mut buffer = world.stdout.borrow_mut();
            run_optimize_with(args, &builder, &mut *buffer)
        }
        other => panic!("expected optimize command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints an optimal solution")]
fn prints_optimal_solution(#[from(world)] world: &OptimizeWorld) {
    let solution = world.solution();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_eq!(solution.total_load, 70);
    assert!(solution.routes.iter().all(|route| route.total_load <= 60));
}

#[then("the command succeeds and prints a fallback solution")]
fn prints_fallback_solution(#[from(world)] world: &OptimizeWorld) {
    let solution = world.solution();
    assert!(solution.is_fallback);
    assert_eq!(solution.message, "Fallback solution generated");
}

#[then("the command fails because the request is invalid")]
fn fails_invalid_request(#[from(world)] world: &OptimizeWorld) {
    match world.error() {
        CliError::Optimize(OptimizeError::Request(RequestError::DepotDemand { demand })) => {
            assert_eq!(demand, 4);
        }
        other => panic!("expected a depot demand error, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn fails_missing_request_path(#[from(world)] world: &OptimizeWorld) {
    match world.error() {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_OPTIMIZE_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_optimize_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/optimize_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: OptimizeWorld) {
            let _ = world;
        }
    };
}

register_optimize_scenario!(optimize_happy_path, "optimizing a request from JSON");
register_optimize_scenario!(optimize_fallback, "falling back when the routing solver fails");
register_optimize_scenario!(optimize_depot_demand, "rejecting a depot with demand");
register_optimize_scenario!(optimize_missing_request, "rejecting missing request paths");

//! Property-based tests for the fleet scheduler.
//!
//! # Invariants tested
//!
//! - **Exact assignment:** every candidate route appears in exactly one
//!   assignment and no slot exceeds the vehicle bound.
//! - **Optimality:** every bundled backend matches exhaustive search on
//!   small programs.
#![cfg(any(feature = "mip-backend", feature = "flow-backend"))]
#![expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point objectives"
)]

use std::collections::HashMap;

#[cfg(feature = "flow-backend")]
use minibus_scheduler::FlowBackend;
#[cfg(feature = "mip-backend")]
use minibus_scheduler::MipBackend;
use minibus_scheduler::{
    AssignmentProgram, CandidateRoute, FleetScheduler, ScheduleBackend, SchedulerSettings,
};
use proptest::prelude::*;

fn bundled_backends() -> Vec<Box<dyn ScheduleBackend>> {
    let mut backends: Vec<Box<dyn ScheduleBackend>> = Vec::new();
    #[cfg(feature = "mip-backend")]
    backends.push(Box::new(MipBackend));
    #[cfg(feature = "flow-backend")]
    backends.push(Box::new(FlowBackend));
    backends
}

fn route_strategy() -> impl Strategy<Value = Vec<CandidateRoute>> {
    prop::collection::vec((0_u32..120, 0.0_f64..500.0), 0..30).prop_map(|routes| {
        routes
            .into_iter()
            .enumerate()
            .map(|(idx, (demand, cost))| CandidateRoute::new(format!("route-{idx}"), demand, cost))
            .collect()
    })
}

/// Lowest objective over every feasible assignment, by enumeration.
fn brute_force_optimum(program: &AssignmentProgram) -> Option<f64> {
    let routes = program.routes();
    let slots = program.slots();
    let mut assignment = vec![0_usize; routes];
    let mut best: Option<f64> = None;
    loop {
        if let Some(value) = program.objective(&assignment) {
            best = Some(best.map_or(value, |current| current.min(value)));
        }
        // Advance the odometer; stop once every digit has wrapped.
        let mut digit = 0;
        loop {
            let Some(entry) = assignment.get_mut(digit) else {
                return best;
            };
            *entry += 1;
            if *entry < slots {
                break;
            }
            *entry = 0;
            digit += 1;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_route_is_assigned_exactly_once(
        routes in route_strategy(),
        max_vehicles in 1_usize..4,
        horizon in 1_u32..13,
    ) {
        let settings = SchedulerSettings {
            time_horizon_hours: horizon,
            max_vehicles,
            ..SchedulerSettings::default()
        };
        let capacity = settings.slots() * max_vehicles;
        let outcome = FleetScheduler::new(settings)
            .map_err(|err| TestCaseError::fail(err.to_string()))?
            .schedule(&routes);

        if routes.len() > capacity {
            prop_assert!(outcome.is_err());
            return Ok(());
        }
        let schedule = outcome.map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(schedule.assignments.len(), routes.len());
        for (route, assignment) in routes.iter().zip(&schedule.assignments) {
            prop_assert_eq!(&route.route_id, &assignment.route_id);
        }
        let mut occupancy: HashMap<usize, usize> = HashMap::new();
        for assignment in &schedule.assignments {
            *occupancy.entry(assignment.time_slot).or_default() += 1;
        }
        prop_assert!(occupancy.values().all(|&count| count <= max_vehicles));
        prop_assert!(occupancy.keys().all(|&slot| slot < settings.slots()));
        prop_assert!((schedule.coverage_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn backends_match_exhaustive_search(
        rows in prop::collection::vec(prop::collection::vec(-50.0_f64..50.0, 3), 1..5),
        slot_capacity in 1_usize..3,
    ) {
        let program = AssignmentProgram::new(3, slot_capacity, rows)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let expected = brute_force_optimum(&program);
        for backend in bundled_backends() {
            match backend.solve(&program) {
                Ok(assignment) => {
                    let (Some(value), Some(expected)) = (program.objective(&assignment), expected)
                    else {
                        return Err(TestCaseError::fail(format!(
                            "{} returned an assignment without a matching optimum",
                            backend.name()
                        )));
                    };
                    prop_assert!(
                        (value - expected).abs() < 1e-6,
                        "{} found {value}, exhaustive search {expected}",
                        backend.name()
                    );
                }
                Err(_) => prop_assert!(expected.is_none(), "{} missed a feasible program", backend.name()),
            }
        }
    }
}

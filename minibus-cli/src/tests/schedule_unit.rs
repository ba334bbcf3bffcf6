//! Unit tests covering the schedule command.

use super::helpers::Workspace;
use super::*;
use crate::schedule::{ScheduleConfig, run_schedule_with};
use minibus_scheduler::{FleetSchedule, ScheduleError, SchedulerSettings};
use rstest::rstest;
use serde_json::json;

fn routes_fixture(workspace: &Workspace) -> camino::Utf8PathBuf {
    workspace.write_json(
        "routes.json",
        &json!({
            "routes": [
                { "route_id": "r1", "demand": 60, "cost": 150.0 },
                { "route_id": "r2", "demand": 45, "cost": 110.0 },
                { "route_id": "r3", "demand": 80, "cost": 200.0 }
            ]
        }),
    )
}

#[rstest]
fn converting_without_request_errors() {
    let err = ScheduleConfig::try_from(ScheduleArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { env, .. } => assert_eq!(env, ENV_SCHEDULE_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn flags_override_scheduler_defaults() {
    let args = ScheduleArgs {
        request_path: Some("routes.json".into()),
        max_vehicles: Some(2),
        rush_discount: Some(0.5),
        ..ScheduleArgs::default()
    };
    let config = ScheduleConfig::try_from(args).expect("config");
    assert_eq!(
        config.settings,
        SchedulerSettings {
            max_vehicles: 2,
            rush_discount: 0.5,
            ..SchedulerSettings::default()
        }
    );
}

#[rstest]
fn writes_schedule_json() {
    let workspace = Workspace::new();
    let args = ScheduleArgs {
        request_path: Some(routes_fixture(&workspace)),
        ..ScheduleArgs::default()
    };
    let mut sink = Vec::new();
    run_schedule_with(args, &mut sink).expect("schedule succeeds");

    let schedule: FleetSchedule = serde_json::from_slice(&sink).expect("schedule JSON");
    assert_eq!(schedule.assignments.len(), 3);
    assert!(schedule.meets_coverage_target);
}

#[rstest]
fn infeasible_schedule_maps_to_no_solution() {
    let workspace = Workspace::new();
    let args = ScheduleArgs {
        request_path: Some(routes_fixture(&workspace)),
        time_horizon_hours: Some(1),
        max_vehicles: Some(1),
        ..ScheduleArgs::default()
    };
    let err = run_schedule_with(args, &mut Vec::new()).expect_err("three routes, two slots");
    assert!(matches!(
        err,
        CliError::Schedule(ScheduleError::InfeasibleSchedule { .. })
    ));
    assert_eq!(err.status_label(), "no_solution");
}

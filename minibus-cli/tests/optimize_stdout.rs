//! End-to-end check that `minibus optimize` keeps stdout machine-readable
//! when the `vrp-core` backend runs.
#![cfg(feature = "solver-vrp")]

use std::process::Command;

use minibus_core::{Location, OptimizationRequest};
use rstest::rstest;
use serde_json::Value;
use tempfile::TempDir;

fn accra_request() -> OptimizationRequest {
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

#[rstest]
fn stdout_holds_only_the_solution_json() {
    let dir = TempDir::new().expect("tempdir");
    let request_path = dir.path().join("accra.json");
    let payload = serde_json::to_vec(&accra_request()).expect("serialize request");
    std::fs::write(&request_path, payload).expect("write request");

    let output = Command::new(env!("CARGO_BIN_EXE_minibus"))
        .current_dir(dir.path())
        .arg("optimize")
        .arg(&request_path)
        .args(["--max-generations", "20", "--time-limit-seconds", "2"])
        .output()
        .expect("run minibus");

    assert!(
        output.status.success(),
        "minibus failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let solution: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}):\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    });
    assert_eq!(solution["status"], "optimal");
    assert_eq!(solution["total_load"], 70);
}

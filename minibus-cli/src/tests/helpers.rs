//! Test helpers for writing request files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use minibus_core::{
    Location, OptimizationRequest, RouteSolver, RoutingProblem, SolverFailure, VehicleTours,
};
use std::fs;
use tempfile::TempDir;

use crate::CliError;
use crate::optimize::{OptimizeConfig, RouteSolverBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory with a UTF-8 root path.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_json(&self, name: &str, value: &serde_json::Value) -> Utf8PathBuf {
        let path = self.path(name);
        let payload = serde_json::to_string_pretty(value).expect("serialize fixture");
        write_utf8(&path, payload.as_bytes());
        path
    }
}

pub(super) fn accra_request() -> OptimizationRequest {
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

/// Solver that replays fixed tours or fails.
#[derive(Debug, Clone)]
pub(super) struct StubSolver(pub(super) Option<VehicleTours>);

impl RouteSolver for StubSolver {
    fn solve(&self, _problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        self.0.clone().ok_or(SolverFailure::NoSolutionFound)
    }
}

#[derive(Debug, Clone)]
pub(super) struct StubBuilder(pub(super) StubSolver);

impl RouteSolverBuilder for StubBuilder {
    fn build(&self, _config: &OptimizeConfig) -> Result<Box<dyn RouteSolver>, CliError> {
        Ok(Box::new(self.0.clone()))
    }
}

//! Core domain types for the minibus fleet optimizer.
//!
//! The crate owns everything that does not need a third-party search engine:
//! request validation, the geospatial matrix builder, the multi-objective
//! cost model, the round-robin fallback router, the re-optimization advisor
//! and the [`FleetOptimizer`] service that ties a [`RouteSolver`] backend to
//! the fallback path. Backends live in sibling crates.
//!
//! Constructors and `validate` methods return `Result` so invalid input is
//! rejected at the boundary instead of reaching a solver.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod advisor;
mod cache;
mod config;
pub mod cost;
mod fallback;
mod location;
pub mod matrix;
mod optimizer;
mod request;
mod route;
mod solution;
mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use advisor::{
    AdvisorError, AdvisorSettings, DecisionReason, ReoptimizationAction, ReoptimizationAdvisor,
    ReoptimizationDecision, ReoptimizationReport, RouteConditions,
};
pub use cache::CachedOptimizer;
pub use config::{ConfigError, FleetLimits};
pub use cost::{
    CostEvaluation, CostModel, CostModelError, CostVector, CostWeights, EconomicParameters,
    SolutionMetrics,
};
pub use fallback::FallbackRouter;
pub use location::Location;
pub use matrix::{
    DistanceMatrix, MatrixBuilder, MatrixError, MatrixSettings, RoutingMatrices, TimeMatrix,
    haversine_km,
};
pub use optimizer::{FleetOptimizer, OptimizeError, OptimizerConfig};
pub use request::{OptimizationRequest, RequestError};
pub use route::{Route, Stop};
pub use solution::{Diagnostics, Solution, SolutionStatus};
pub use solver::{
    DEFAULT_TIME_LIMIT, MAX_TIME_LIMIT, RouteSolver, RoutingProblem, SolverFailure, VehicleTours,
};

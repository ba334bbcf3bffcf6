//! Facade crate for the minibus fleet optimizer.
//!
//! This crate re-exports the core domain types and services, and exposes the
//! `vrp-core` routing solver and the time-slot scheduler behind feature flags.

#![forbid(unsafe_code)]

pub use minibus_core::{
    CachedOptimizer, CostEvaluation, CostModel, CostVector, CostWeights, EconomicParameters,
    FallbackRouter, FleetLimits, FleetOptimizer, Location, MatrixBuilder, MatrixSettings,
    OptimizationRequest, OptimizeError, OptimizerConfig, ReoptimizationAdvisor,
    ReoptimizationReport, Route, RouteConditions, RouteSolver, RoutingMatrices, Solution,
    SolutionStatus, SolverFailure,
};

#[cfg(feature = "solver-vrp")]
pub use minibus_solver_vrp::{VrpSolver, VrpSolverConfig};

#[cfg(feature = "scheduler")]
pub use minibus_scheduler::{
    CandidateRoute, FleetSchedule, FleetScheduler, ScheduleError, SchedulerSettings,
};

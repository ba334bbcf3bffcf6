//! Constrained routing backend for the minibus fleet optimizer.
//!
//! This crate provides [`VrpSolver`], the default implementation of the
//! [`RouteSolver`](minibus_core::RouteSolver) trait. It models the fleet as
//! homogeneous capacitated vehicles leaving from and returning to the depot,
//! with hard limits on route time and distance, and uses the `vrp-core`
//! metaheuristics to minimise total distance.
//!
//! Every failure (model construction, unassigned stops, or tours that break a
//! limit) surfaces as a [`SolverFailure`](minibus_core::SolverFailure), which
//! the optimizer answers with its fallback router.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
mod vrp;

pub use solver::{VrpSolver, VrpSolverConfig};

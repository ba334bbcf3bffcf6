//! `VrpSolver` implementation backed by `vrp-core`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use log::{debug, warn};
use minibus_core::{ConfigError, RouteSolver, RoutingProblem, SolverFailure, VehicleTours};

use crate::vrp::VrpSolveContext;

/// Configuration for [`VrpSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VrpSolverConfig {
    /// Upper bound on `vrp-core` generations; the search also stops when the
    /// problem's time budget runs out.
    pub max_generations: usize,
}

impl Default for VrpSolverConfig {
    fn default() -> Self {
        Self {
            max_generations: 3000,
        }
    }
}

impl VrpSolverConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `max_generations` is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_generations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_generations",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Capacitated routing solver using the `vrp-core` metaheuristics.
///
/// Initial tours come from the insertion heuristics and are improved by
/// ruin-and-recreate search until the time budget or generation cap is
/// reached. Returned tours are re-checked against the fleet limits.
///
/// # Examples
/// ```no_run
/// use minibus_core::{FleetOptimizer, Location, OptimizationRequest};
/// use minibus_solver_vrp::VrpSolver;
///
/// let optimizer = FleetOptimizer::new(VrpSolver::new());
/// let request = OptimizationRequest::new(
///     vec![Location::new(5.6037, -0.1870), Location::new(5.6137, -0.1870)],
///     vec![0, 12],
///     1,
/// );
/// let solution = optimizer.optimize(&request).expect("valid request");
/// assert_eq!(solution.total_load, 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VrpSolver {
    config: VrpSolverConfig,
}

impl VrpSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the configuration is invalid.
    pub fn with_config(config: VrpSolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &VrpSolverConfig {
        &self.config
    }
}

impl RouteSolver for VrpSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<VehicleTours, SolverFailure> {
        let started_at = Instant::now();
        let context = VrpSolveContext::new(&self.config);
        let tours = catch_unwind(AssertUnwindSafe(|| context.solve(problem))).unwrap_or_else(|_| {
            warn!("vrp-core panicked while solving; reporting no solution");
            Err(SolverFailure::NoSolutionFound)
        })?;
        problem.check_tours(&tours)?;
        debug!(
            "vrp-core routed {} stops on {} vehicles in {:?}",
            problem.size().saturating_sub(1),
            tours.len(),
            started_at.elapsed()
        );
        Ok(tours)
    }
}

#[cfg(test)]
mod tests;

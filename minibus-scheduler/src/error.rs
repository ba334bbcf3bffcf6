//! Errors reported by the fleet scheduler.

use minibus_core::ConfigError;
use thiserror::Error;

/// Failure modes of [`crate::FleetScheduler::schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// No backend is configured to solve the assignment program.
    #[error("no schedule backend is available")]
    SolverUnavailable,
    /// More routes than the horizon can hold, even with every slot full.
    #[error("{routes} routes exceed the {capacity} available slot assignments")]
    InfeasibleSchedule {
        /// Number of candidate routes.
        routes: usize,
        /// Slots multiplied by the vehicles allowed per slot.
        capacity: usize,
    },
    /// The backend could not produce a valid assignment.
    #[error("no schedule found")]
    NoSolutionFound,
    /// Scheduler settings failed validation.
    #[error(transparent)]
    InvalidSettings(#[from] ConfigError),
    /// A candidate route is malformed.
    #[error("route {route_id}: {reason}")]
    InvalidRoute {
        /// Identifier of the offending route.
        route_id: String,
        /// Why the route was rejected.
        reason: &'static str,
    },
}

impl ScheduleError {
    /// Machine-readable status label for reporting the failure.
    ///
    /// # Examples
    /// ```
    /// use minibus_scheduler::ScheduleError;
    ///
    /// assert_eq!(ScheduleError::NoSolutionFound.status_label(), "no_solution");
    /// assert_eq!(ScheduleError::SolverUnavailable.status_label(), "error");
    /// ```
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::InfeasibleSchedule { .. } | Self::NoSolutionFound => "no_solution",
            Self::SolverUnavailable | Self::InvalidSettings(_) | Self::InvalidRoute { .. } => {
                "error"
            }
        }
    }
}

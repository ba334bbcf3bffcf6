//! Backends that solve an [`AssignmentProgram`].

#[cfg(feature = "flow-backend")]
mod flow;
#[cfg(feature = "mip-backend")]
mod mip;

#[cfg(feature = "flow-backend")]
pub use flow::FlowBackend;
#[cfg(feature = "mip-backend")]
pub use mip::MipBackend;

use std::sync::Arc;

use crate::{AssignmentProgram, ScheduleError};

/// Solves a binary assignment program.
///
/// Implementations return the chosen slot for every route in route order.
/// The scheduler checks the answer against the program, so a backend that
/// returns an infeasible assignment is treated as finding no solution.
pub trait ScheduleBackend: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Solve `program`.
    ///
    /// # Errors
    /// Returns [`ScheduleError::NoSolutionFound`] when the program is
    /// infeasible, or [`ScheduleError::SolverUnavailable`] when the backend
    /// cannot run.
    fn solve(&self, program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError>;
}

impl<B: ScheduleBackend + ?Sized> ScheduleBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError> {
        (**self).solve(program)
    }
}

impl<B: ScheduleBackend + ?Sized> ScheduleBackend for Arc<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError> {
        (**self).solve(program)
    }
}

//! Fleet time-slot scheduling for already-costed minibus routes.
//!
//! The scheduler turns candidate routes into a binary assignment program
//! ([`AssignmentProgram`]) with one variable per route and half-hour slot,
//! hands it to a [`ScheduleBackend`], and reports the resulting
//! [`FleetSchedule`]. Rush-hour slots discount route cost and earn a larger
//! coverage bonus, so the optimum favours peak departures while no slot runs
//! more routes than the fleet has vehicles.
//!
//! Two backends ship with the crate:
//!
//! - `MipBackend` (default `mip-backend` feature) hands the program to the
//!   `microlp` mixed-integer solver through `good_lp`.
//! - `FlowBackend` (`flow-backend` feature) solves the same program exactly
//!   as a min-cost flow, which is faster on long horizons.
//!
//! With neither feature enabled, callers supply their own backend through
//! [`FleetScheduler::with_backend`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod error;
mod program;
mod scheduler;

#[cfg(feature = "flow-backend")]
#[cfg_attr(docsrs, doc(cfg(feature = "flow-backend")))]
pub use backend::FlowBackend;
#[cfg(feature = "mip-backend")]
#[cfg_attr(docsrs, doc(cfg(feature = "mip-backend")))]
pub use backend::MipBackend;
pub use backend::ScheduleBackend;
pub use error::ScheduleError;
pub use program::AssignmentProgram;
pub use scheduler::{
    CandidateRoute, FleetSchedule, FleetScheduler, SLOT_MINUTES, ScheduleAssignment,
    ScheduleStatus, SchedulerSettings,
};

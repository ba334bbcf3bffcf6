//! Shared test harness modules for the minibus CLI.

use super::*;

mod helpers;
mod optimize_steps;
mod schedule_unit;

//! Formatted optimization results.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CostEvaluation, CostModel, Route, SolutionMetrics};

/// How a [`Solution`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolutionStatus {
    /// The constrained solver returned routes.
    Optimal,
    /// The solver failed and the round-robin fallback produced the routes.
    Fallback,
}

impl SolutionStatus {
    /// Human-readable status message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal solution found",
            Self::Fallback => "Fallback solution generated",
        }
    }

    /// Machine-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Fallback => "fallback",
        }
    }
}

/// Timing and sizing facts about one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Wall time of the whole optimize call in milliseconds.
    pub wall_time_ms: u64,
    /// Number of locations in the matrices.
    pub matrix_size: usize,
    /// Search budget handed to the solver in seconds.
    pub time_limit_seconds: u64,
}

/// Routes for one request together with their totals and costs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Non-empty routes, one per vehicle used.
    pub routes: Vec<Route>,
    /// Sum of route distances in meters.
    pub total_distance_meters: u64,
    /// Sum of route times in minutes.
    pub total_time_minutes: u64,
    /// Passengers carried across all routes.
    pub total_load: u64,
    /// Number of vehicles that run a route.
    pub vehicles_used: usize,
    /// Cost vector and scalarized cost.
    pub cost: CostEvaluation,
    /// How the routes were produced.
    pub status: SolutionStatus,
    /// Status message matching `status`.
    pub message: String,
    /// True when the fallback router produced the routes.
    pub is_fallback: bool,
    /// Solver failure that triggered the fallback.
    pub fallback_reason: Option<String>,
    /// Timing and sizing facts.
    pub diagnostics: Diagnostics,
}

impl Solution {
    /// Aggregate `routes`, evaluate their cost and attach a status.
    ///
    /// Routes without visits are dropped.
    #[must_use]
    pub fn assemble(
        routes: Vec<Route>,
        status: SolutionStatus,
        fallback_reason: Option<String>,
        cost_model: &CostModel,
        vehicle_capacity: u32,
        diagnostics: Diagnostics,
    ) -> Self {
        let routes: Vec<Route> = routes
            .into_iter()
            .filter(|route| route.visits().next().is_some())
            .collect();
        let total_distance_meters = routes
            .iter()
            .map(|route| u64::from(route.total_distance_meters))
            .sum();
        let total_time_minutes = routes
            .iter()
            .map(|route| u64::from(route.total_time_minutes))
            .sum();
        let total_load = routes
            .iter()
            .map(|route| u64::from(route.total_load))
            .sum();
        let vehicles_used = routes.len();
        let cost = cost_model.evaluate(&metrics(
            total_distance_meters,
            total_time_minutes,
            total_load,
            vehicles_used,
            vehicle_capacity,
        ));

        Self {
            routes,
            total_distance_meters,
            total_time_minutes,
            total_load,
            vehicles_used,
            cost,
            status,
            message: status.message().to_owned(),
            is_fallback: status == SolutionStatus::Fallback,
            fallback_reason,
            diagnostics,
        }
    }

    /// Report whether every route respects the fleet limits.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.routes.iter().all(|route| route.is_feasible)
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "unit conversion for the cost model"
)]
fn metrics(
    distance_meters: u64,
    time_minutes: u64,
    passengers: u64,
    vehicles: usize,
    vehicle_capacity: u32,
) -> SolutionMetrics {
    SolutionMetrics {
        distance_km: distance_meters as f64 / 1000.0,
        time_hours: time_minutes as f64 / 60.0,
        passengers,
        vehicles,
        vehicle_capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FleetLimits;
    use rstest::rstest;

    fn route(vehicle_id: usize, sequence: &[usize]) -> Route {
        Route::trace(
            vehicle_id,
            sequence,
            &[0, 10, 20, 30],
            &FleetLimits::default(),
            |_, _| (1000, 10),
        )
    }

    #[rstest]
    #[case(SolutionStatus::Optimal, "optimal", "Optimal solution found", false)]
    #[case(SolutionStatus::Fallback, "fallback", "Fallback solution generated", true)]
    fn assembles_totals_and_status(
        #[case] status: SolutionStatus,
        #[case] label: &str,
        #[case] message: &str,
        #[case] is_fallback: bool,
    ) {
        let solution = Solution::assemble(
            vec![route(0, &[1, 2]), route(1, &[]), route(2, &[3])],
            status,
            None,
            &CostModel::default(),
            60,
            Diagnostics::default(),
        );
        assert_eq!(solution.vehicles_used, 2);
        assert_eq!(solution.total_load, 60);
        assert_eq!(solution.total_distance_meters, 5000);
        assert_eq!(solution.total_time_minutes, 50);
        assert_eq!(solution.status.label(), label);
        assert_eq!(solution.message, message);
        assert_eq!(solution.is_fallback, is_fallback);
        assert!(solution.is_feasible());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_status_as_snake_case_label() {
        let json = serde_json::to_string(&SolutionStatus::Fallback).expect("serialise status");
        assert_eq!(json, "\"fallback\"");
    }
}

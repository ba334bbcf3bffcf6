//! Dynamic re-optimization advisor.
//!
//! A cheap decision table over live congestion signals for routes that are
//! already dispatched. It never re-solves the routing problem; it only
//! suggests whether a route should be kept, rerouted or pushed back.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. congestion factor above [`AdvisorSettings::congestion_threshold`]
//!    suggests a reroute;
//! 2. speed below [`AdvisorSettings::slow_speed_kmh`] suggests a reschedule;
//! 3. otherwise the route is maintained.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConfigError;

/// Errors raised by [`ReoptimizationAdvisor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    /// A live signal was negative or not finite.
    #[error("route {route_id}: {field} must be a non-negative finite value")]
    InvalidSignal {
        /// Route carrying the bad signal.
        route_id: String,
        /// Name of the offending signal.
        field: &'static str,
    },
    /// The advisor thresholds were unusable.
    #[error(transparent)]
    Settings(#[from] ConfigError),
}

/// Live signals for one dispatched route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteConditions {
    /// Identifier of the dispatched route.
    pub route_id: String,
    /// Travel time multiplier versus free flow; above 1 is slower.
    pub congestion_factor: f64,
    /// Observed vehicle speed.
    pub current_speed_kmh: f64,
}

/// Suggested response to live conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReoptimizationAction {
    /// Keep the route as dispatched.
    Maintain,
    /// Send the vehicle along a different path.
    Reroute,
    /// Delay the remaining service.
    Reschedule,
}

/// Rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DecisionReason {
    /// Congestion exceeded the threshold.
    HighCongestion,
    /// Speed fell below the threshold.
    SlowTraffic,
    /// No rule fired.
    OptimalConditions,
}

impl DecisionReason {
    /// Snake-case label used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighCongestion => "high_congestion",
            Self::SlowTraffic => "slow_traffic",
            Self::OptimalConditions => "optimal_conditions",
        }
    }
}

/// Advice for one route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReoptimizationDecision {
    /// Route the advice applies to.
    pub route_id: String,
    /// Suggested action.
    pub action: ReoptimizationAction,
    /// Rule that fired.
    pub reason: DecisionReason,
    /// Suggested delay before acting, in minutes.
    pub suggested_delay_minutes: u32,
    /// Estimated fractional reduction in remaining travel time.
    pub expected_time_reduction: f64,
}

/// Advice for a batch of routes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReoptimizationReport {
    /// One decision per input route, in input order.
    pub decisions: Vec<ReoptimizationDecision>,
    /// Routes left unchanged.
    pub maintain_count: usize,
    /// Routes to reroute.
    pub reroute_count: usize,
    /// Routes to reschedule.
    pub reschedule_count: usize,
    /// Mean expected time reduction across the batch; zero when empty.
    pub average_improvement: f64,
}

/// Thresholds and estimates for the decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdvisorSettings {
    /// Congestion factor above which a route is rerouted.
    pub congestion_threshold: f64,
    /// Speed below which a route is rescheduled.
    pub slow_speed_kmh: f64,
    /// Delay suggested with a reroute.
    pub reroute_delay_minutes: u32,
    /// Delay suggested with a reschedule.
    pub reschedule_delay_minutes: u32,
    /// Expected time reduction of a reroute.
    pub reroute_improvement: f64,
    /// Expected time reduction of a reschedule.
    pub reschedule_improvement: f64,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            congestion_threshold: 1.5,
            slow_speed_kmh: 15.0,
            reroute_delay_minutes: 30,
            reschedule_delay_minutes: 60,
            reroute_improvement: 0.25,
            reschedule_improvement: 0.40,
        }
    }
}

impl AdvisorSettings {
    /// Validate thresholds and estimates.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for non-finite or negative thresholds
    /// and improvements outside `0..=1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.congestion_threshold.is_finite() || self.congestion_threshold < 1.0 {
            return Err(ConfigError::invalid(
                "congestion_threshold",
                "must be a finite value of at least 1.0",
            ));
        }
        if !self.slow_speed_kmh.is_finite() || self.slow_speed_kmh < 0.0 {
            return Err(ConfigError::invalid(
                "slow_speed_kmh",
                "must be a non-negative finite value",
            ));
        }
        for (field, value) in [
            ("reroute_improvement", self.reroute_improvement),
            ("reschedule_improvement", self.reschedule_improvement),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, "must lie within 0.0..=1.0"));
            }
        }
        Ok(())
    }
}

/// Applies the decision table to live route conditions.
///
/// # Examples
/// ```
/// use minibus_core::{ReoptimizationAction, ReoptimizationAdvisor, RouteConditions};
///
/// let advisor = ReoptimizationAdvisor::default();
/// let decision = advisor
///     .decide(&RouteConditions {
///         route_id: "R1".into(),
///         congestion_factor: 2.0,
///         current_speed_kmh: 40.0,
///     })
///     .expect("valid signal");
/// assert_eq!(decision.action, ReoptimizationAction::Reroute);
/// assert_eq!(decision.suggested_delay_minutes, 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReoptimizationAdvisor {
    settings: AdvisorSettings,
}

impl ReoptimizationAdvisor {
    /// Create an advisor after validating `settings`.
    ///
    /// # Errors
    /// Returns [`AdvisorError::Settings`] when a threshold is unusable.
    pub fn new(settings: AdvisorSettings) -> Result<Self, AdvisorError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Decide on one route.
    ///
    /// # Errors
    /// Returns [`AdvisorError::InvalidSignal`] for negative or non-finite
    /// signals.
    pub fn decide(
        &self,
        conditions: &RouteConditions,
    ) -> Result<ReoptimizationDecision, AdvisorError> {
        check_signal(conditions, "congestion_factor", conditions.congestion_factor)?;
        check_signal(conditions, "current_speed_kmh", conditions.current_speed_kmh)?;

        let s = &self.settings;
        let (action, reason, suggested_delay_minutes, expected_time_reduction) =
            if conditions.congestion_factor > s.congestion_threshold {
                (
                    ReoptimizationAction::Reroute,
                    DecisionReason::HighCongestion,
                    s.reroute_delay_minutes,
                    s.reroute_improvement,
                )
            } else if conditions.current_speed_kmh < s.slow_speed_kmh {
                (
                    ReoptimizationAction::Reschedule,
                    DecisionReason::SlowTraffic,
                    s.reschedule_delay_minutes,
                    s.reschedule_improvement,
                )
            } else {
                (
                    ReoptimizationAction::Maintain,
                    DecisionReason::OptimalConditions,
                    0,
                    0.0,
                )
            };

        Ok(ReoptimizationDecision {
            route_id: conditions.route_id.clone(),
            action,
            reason,
            suggested_delay_minutes,
            expected_time_reduction,
        })
    }

    /// Decide on every route in `batch` and summarise the outcome.
    ///
    /// # Errors
    /// Returns the first [`AdvisorError::InvalidSignal`] in the batch.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "average improvement is a mean over the batch"
    )]
    pub fn advise(&self, batch: &[RouteConditions]) -> Result<ReoptimizationReport, AdvisorError> {
        let decisions = batch
            .iter()
            .map(|conditions| self.decide(conditions))
            .collect::<Result<Vec<_>, _>>()?;
        let count = |action| decisions.iter().filter(|d| d.action == action).count();
        let average_improvement = if decisions.is_empty() {
            0.0
        } else {
            decisions
                .iter()
                .map(|d| d.expected_time_reduction)
                .sum::<f64>()
                / decisions.len() as f64
        };

        Ok(ReoptimizationReport {
            maintain_count: count(ReoptimizationAction::Maintain),
            reroute_count: count(ReoptimizationAction::Reroute),
            reschedule_count: count(ReoptimizationAction::Reschedule),
            average_improvement,
            decisions,
        })
    }
}

fn check_signal(
    conditions: &RouteConditions,
    field: &'static str,
    value: f64,
) -> Result<(), AdvisorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AdvisorError::InvalidSignal {
            route_id: conditions.route_id.clone(),
            field,
        })
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point estimates"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn conditions(congestion_factor: f64, current_speed_kmh: f64) -> RouteConditions {
        RouteConditions {
            route_id: "R1".to_owned(),
            congestion_factor,
            current_speed_kmh,
        }
    }

    #[rstest]
    #[case(2.0, 30.0, ReoptimizationAction::Reroute, DecisionReason::HighCongestion, 30)]
    #[case(2.0, 5.0, ReoptimizationAction::Reroute, DecisionReason::HighCongestion, 30)]
    #[case(1.0, 10.0, ReoptimizationAction::Reschedule, DecisionReason::SlowTraffic, 60)]
    #[case(1.0, 30.0, ReoptimizationAction::Maintain, DecisionReason::OptimalConditions, 0)]
    #[case(1.5, 15.0, ReoptimizationAction::Maintain, DecisionReason::OptimalConditions, 0)]
    fn applies_rules_in_order(
        #[case] congestion: f64,
        #[case] speed: f64,
        #[case] action: ReoptimizationAction,
        #[case] reason: DecisionReason,
        #[case] delay: u32,
    ) {
        let decision = ReoptimizationAdvisor::default()
            .decide(&conditions(congestion, speed))
            .expect("valid signal");
        assert_eq!(decision.action, action);
        assert_eq!(decision.reason, reason);
        assert_eq!(decision.suggested_delay_minutes, delay);
    }

    #[rstest]
    #[case(f64::NAN, 30.0, "congestion_factor")]
    #[case(1.0, -1.0, "current_speed_kmh")]
    #[case(1.0, f64::INFINITY, "current_speed_kmh")]
    fn rejects_invalid_signals(
        #[case] congestion: f64,
        #[case] speed: f64,
        #[case] expected: &str,
    ) {
        let err = ReoptimizationAdvisor::default()
            .decide(&conditions(congestion, speed))
            .expect_err("invalid signal");
        let AdvisorError::InvalidSignal { field, .. } = err else {
            panic!("expected an invalid signal error, got {err:?}");
        };
        assert_eq!(field, expected);
    }

    #[rstest]
    fn report_counts_actions_and_averages_improvement() {
        let report = ReoptimizationAdvisor::default()
            .advise(&[
                conditions(2.0, 30.0),
                conditions(1.0, 10.0),
                conditions(1.0, 30.0),
                conditions(1.1, 40.0),
            ])
            .expect("valid batch");
        assert_eq!(report.decisions.len(), 4);
        assert_eq!(report.reroute_count, 1);
        assert_eq!(report.reschedule_count, 1);
        assert_eq!(report.maintain_count, 2);
        assert!((report.average_improvement - 0.1625).abs() < 1e-9);
    }

    #[rstest]
    fn empty_batch_reports_no_improvement() {
        let report = ReoptimizationAdvisor::default()
            .advise(&[])
            .expect("empty batch");
        assert!(report.decisions.is_empty());
        assert!(report.average_improvement.abs() < f64::EPSILON);
    }

    #[rstest]
    fn rejects_invalid_settings() {
        let settings = AdvisorSettings {
            reroute_improvement: 1.5,
            ..AdvisorSettings::default()
        };
        assert!(matches!(
            ReoptimizationAdvisor::new(settings),
            Err(AdvisorError::Settings(_))
        ));
    }
}

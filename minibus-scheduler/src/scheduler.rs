//! Fleet scheduler: candidate routes in, half-hour slot assignments out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use minibus_core::ConfigError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AssignmentProgram, ScheduleBackend, ScheduleError};

/// Length of one time slot in minutes.
pub const SLOT_MINUTES: u32 = 30;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Morning and evening peaks as `[start, end)` minutes after midnight.
const RUSH_WINDOWS: [(u32, u32); 2] = [(7 * 60, 9 * 60), (17 * 60, 19 * 60)];

/// Weight of the coverage bonus outside rush hour.
const OFF_PEAK_BONUS_SHARE: f64 = 0.5;

/// Tunables for [`FleetScheduler`].
///
/// # Examples
/// ```
/// use minibus_scheduler::SchedulerSettings;
///
/// let settings = SchedulerSettings::default();
/// assert_eq!(settings.slots(), 24);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerSettings {
    /// Length of the service day in hours.
    pub time_horizon_hours: u32,
    /// Routes that may depart in the same slot.
    pub max_vehicles: usize,
    /// Start of the first slot in minutes after midnight.
    pub service_start_minutes: u32,
    /// Fractional cost discount for rush-hour departures.
    pub rush_discount: f64,
    /// Objective credit per passenger of demand served.
    pub coverage_bonus: f64,
    /// Coverage percentage a schedule must reach to meet its target.
    pub min_coverage_percent: f64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            time_horizon_hours: 12,
            max_vehicles: 10,
            service_start_minutes: 6 * 60,
            rush_discount: 0.2,
            coverage_bonus: 0.1,
            min_coverage_percent: 80.0,
        }
    }
}

impl SchedulerSettings {
    /// Number of half-hour slots in the horizon.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.time_horizon_hours as usize * 2
    }

    /// Validate the settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first unusable field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_horizon_hours == 0 {
            return Err(ConfigError::invalid("time_horizon_hours", "must be positive"));
        }
        if self.max_vehicles == 0 {
            return Err(ConfigError::invalid("max_vehicles", "must be positive"));
        }
        if self.service_start_minutes >= MINUTES_PER_DAY {
            return Err(ConfigError::invalid(
                "service_start_minutes",
                "must fall within one day",
            ));
        }
        if !(0.0..=1.0).contains(&self.rush_discount) {
            return Err(ConfigError::invalid("rush_discount", "must be within [0, 1]"));
        }
        if !self.coverage_bonus.is_finite() || self.coverage_bonus < 0.0 {
            return Err(ConfigError::invalid(
                "coverage_bonus",
                "must be finite and non-negative",
            ));
        }
        if !(0.0..=100.0).contains(&self.min_coverage_percent) {
            return Err(ConfigError::invalid(
                "min_coverage_percent",
                "must be within [0, 100]",
            ));
        }
        Ok(())
    }

    /// Minutes after midnight at which `slot` starts, wrapping past midnight.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "slot clock wraps at midnight"
    )]
    pub fn slot_start_minutes(&self, slot: usize) -> u32 {
        let offset = u32::try_from(slot)
            .unwrap_or(u32::MAX)
            .saturating_mul(SLOT_MINUTES);
        self.service_start_minutes.saturating_add(offset) % MINUTES_PER_DAY
    }

    /// Whether `slot` starts inside a rush-hour window.
    #[must_use]
    pub fn is_rush_hour(&self, slot: usize) -> bool {
        let start = self.slot_start_minutes(slot);
        RUSH_WINDOWS
            .iter()
            .any(|&(from, to)| (from..to).contains(&start))
    }
}

/// A costed route awaiting a departure slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateRoute {
    /// Caller-chosen identifier, unique within one call.
    pub route_id: String,
    /// Passengers the route serves.
    pub demand: u32,
    /// Operating cost of running the route once.
    pub cost: f64,
}

impl CandidateRoute {
    /// Convenience constructor.
    #[must_use]
    pub fn new(route_id: impl Into<String>, demand: u32, cost: f64) -> Self {
        Self {
            route_id: route_id.into(),
            demand,
            cost,
        }
    }
}

/// One route placed in one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleAssignment {
    /// Identifier of the scheduled route.
    pub route_id: String,
    /// Zero-based slot index within the horizon.
    pub time_slot: usize,
    /// Slot start as `HH:MM`.
    pub start_time: String,
    /// Whether the slot starts in a rush-hour window.
    pub is_rush_hour: bool,
}

/// Outcome classification of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScheduleStatus {
    /// The backend proved the assignment optimal.
    Optimal,
}

impl ScheduleStatus {
    /// Machine-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
        }
    }
}

/// Departure plan for a set of candidate routes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FleetSchedule {
    /// One assignment per candidate route, in input order.
    pub assignments: Vec<ScheduleAssignment>,
    /// Sum of the undiscounted route costs.
    pub total_cost: f64,
    /// Value of the assignment program's objective.
    pub objective_value: f64,
    /// Scheduled demand as a percentage of total demand.
    pub coverage_percentage: f64,
    /// Whether coverage reaches the configured minimum.
    pub meets_coverage_target: bool,
    /// How the schedule was obtained.
    pub status: ScheduleStatus,
    /// Wall time of the scheduling call in milliseconds.
    pub solve_time_ms: u64,
}

/// Assigns candidate routes to departure slots.
///
/// # Examples
/// ```
/// # #[cfg(any(feature = "mip-backend", feature = "flow-backend"))]
/// # {
/// use minibus_scheduler::{CandidateRoute, FleetScheduler, SchedulerSettings};
///
/// let scheduler = FleetScheduler::new(SchedulerSettings::default()).expect("valid settings");
/// let schedule = scheduler
///     .schedule(&[CandidateRoute::new("r1", 40, 120.0)])
///     .expect("one route fits");
/// assert_eq!(schedule.assignments.len(), 1);
/// assert!(schedule.assignments[0].is_rush_hour);
/// # }
/// ```
#[derive(Clone)]
pub struct FleetScheduler {
    settings: SchedulerSettings,
    backend: Option<Arc<dyn ScheduleBackend>>,
}

impl std::fmt::Debug for FleetScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetScheduler")
            .field("settings", &self.settings)
            .field("backend", &self.backend.as_ref().map(|backend| backend.name()))
            .finish()
    }
}

impl FleetScheduler {
    /// Create a scheduler using a bundled backend when one is compiled in.
    ///
    /// `MipBackend` is preferred over `FlowBackend` when both are enabled.
    ///
    /// # Errors
    /// Returns [`ScheduleError::InvalidSettings`] when `settings` fail
    /// validation.
    pub fn new(settings: SchedulerSettings) -> Result<Self, ScheduleError> {
        settings.validate()?;
        Ok(Self {
            settings,
            backend: default_backend(),
        })
    }

    /// Replace the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: impl ScheduleBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Name of the configured backend, if any.
    #[must_use]
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|backend| backend.name())
    }

    /// Assign every route in `routes` to exactly one slot.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidRoute`] for a duplicate id or a negative or
    ///   non-finite cost.
    /// - [`ScheduleError::SolverUnavailable`] when no backend is configured.
    /// - [`ScheduleError::InfeasibleSchedule`] when the horizon cannot hold
    ///   every route.
    /// - [`ScheduleError::NoSolutionFound`] when the backend fails or returns
    ///   an assignment that breaks a constraint.
    pub fn schedule(&self, routes: &[CandidateRoute]) -> Result<FleetSchedule, ScheduleError> {
        let started = Instant::now();
        validate_routes(routes)?;
        let backend = self.backend.as_ref().ok_or(ScheduleError::SolverUnavailable)?;

        let slots = self.settings.slots();
        let capacity = slots.saturating_mul(self.settings.max_vehicles);
        if routes.len() > capacity {
            return Err(ScheduleError::InfeasibleSchedule {
                routes: routes.len(),
                capacity,
            });
        }

        let program = self.program(routes)?;
        let assignment = backend.solve(&program)?;
        let Some(objective_value) = program.objective(&assignment) else {
            warn!(
                "{} returned an assignment that breaks the program constraints",
                backend.name()
            );
            return Err(ScheduleError::NoSolutionFound);
        };

        let schedule = self.assemble(routes, &assignment, objective_value, started);
        debug!(
            "{} scheduled {} routes over {slots} slots, objective {:.3}, coverage {:.1}%",
            backend.name(),
            schedule.assignments.len(),
            schedule.objective_value,
            schedule.coverage_percentage
        );
        Ok(schedule)
    }

    fn program(&self, routes: &[CandidateRoute]) -> Result<AssignmentProgram, ScheduleError> {
        let slots = self.settings.slots();
        let rush: Vec<bool> = (0..slots)
            .map(|slot| self.settings.is_rush_hour(slot))
            .collect();
        let coefficients = routes
            .iter()
            .map(|route| {
                rush.iter()
                    .map(|&is_rush| self.coefficient(route, is_rush))
                    .collect()
            })
            .collect();
        AssignmentProgram::new(slots, self.settings.max_vehicles, coefficients)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "objective coefficients combine discounted cost and bonus"
    )]
    fn coefficient(&self, route: &CandidateRoute, is_rush: bool) -> f64 {
        let bonus = self.settings.coverage_bonus * f64::from(route.demand);
        if is_rush {
            route.cost * (1.0 - self.settings.rush_discount) - bonus
        } else {
            route.cost - bonus * OFF_PEAK_BONUS_SHARE
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "coverage is a percentage of demand"
    )]
    fn assemble(
        &self,
        routes: &[CandidateRoute],
        assignment: &[usize],
        objective_value: f64,
        started: Instant,
    ) -> FleetSchedule {
        let slots = self.settings.slots();
        let placed: Vec<(&CandidateRoute, usize)> = routes
            .iter()
            .zip(assignment.iter().copied())
            .filter(|&(_, slot)| slot < slots)
            .collect();
        let assignments: Vec<ScheduleAssignment> = placed
            .iter()
            .map(|&(route, slot)| ScheduleAssignment {
                route_id: route.route_id.clone(),
                time_slot: slot,
                start_time: clock_label(self.settings.slot_start_minutes(slot)),
                is_rush_hour: self.settings.is_rush_hour(slot),
            })
            .collect();

        // A verified assignment places every route, so this is 100% unless
        // the assignment is short or names a slot past the horizon.
        let total_demand: u64 = routes.iter().map(|route| u64::from(route.demand)).sum();
        let scheduled_demand: u64 = placed
            .iter()
            .map(|&(route, _)| u64::from(route.demand))
            .sum();
        #[expect(
            clippy::cast_precision_loss,
            reason = "passenger totals are far below 2^52"
        )]
        let coverage_percentage = if total_demand == 0 {
            100.0
        } else {
            scheduled_demand as f64 / total_demand as f64 * 100.0
        };

        FleetSchedule {
            assignments,
            total_cost: routes.iter().map(|route| route.cost).sum(),
            objective_value,
            coverage_percentage,
            meets_coverage_target: coverage_percentage >= self.settings.min_coverage_percent,
            status: ScheduleStatus::Optimal,
            solve_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(feature = "mip-backend")]
fn default_backend() -> Option<Arc<dyn ScheduleBackend>> {
    Some(Arc::new(crate::MipBackend))
}

#[cfg(all(feature = "flow-backend", not(feature = "mip-backend")))]
fn default_backend() -> Option<Arc<dyn ScheduleBackend>> {
    Some(Arc::new(crate::FlowBackend))
}

#[cfg(not(any(feature = "mip-backend", feature = "flow-backend")))]
const fn default_backend() -> Option<Arc<dyn ScheduleBackend>> {
    None
}

fn validate_routes(routes: &[CandidateRoute]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::with_capacity(routes.len());
    for route in routes {
        let reason = if !route.cost.is_finite() {
            Some("cost must be finite")
        } else if route.cost < 0.0 {
            Some("cost must be non-negative")
        } else if !seen.insert(route.route_id.as_str()) {
            Some("duplicate route id")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ScheduleError::InvalidRoute {
                route_id: route.route_id.clone(),
                reason,
            });
        }
    }
    Ok(())
}

#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "splitting minutes into hours and minutes"
)]
fn clock_label(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point totals"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Always answers with the same assignment.
    struct FixedBackend(Result<Vec<usize>, ScheduleError>);

    impl ScheduleBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, _program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError> {
            self.0.clone()
        }
    }

    #[fixture]
    fn routes() -> Vec<CandidateRoute> {
        vec![
            CandidateRoute::new("r1", 60, 150.0),
            CandidateRoute::new("r2", 45, 110.0),
            CandidateRoute::new("r3", 80, 200.0),
        ]
    }

    fn scheduler() -> FleetScheduler {
        FleetScheduler::new(SchedulerSettings::default()).expect("default settings are valid")
    }

    #[rstest]
    #[case(0, 360, false)]
    #[case(2, 420, true)]
    #[case(5, 510, true)]
    #[case(6, 540, false)]
    #[case(22, 1020, true)]
    #[case(23, 1050, true)]
    fn classifies_rush_slots(#[case] slot: usize, #[case] start: u32, #[case] rush: bool) {
        let settings = SchedulerSettings::default();
        assert_eq!(settings.slot_start_minutes(slot), start);
        assert_eq!(settings.is_rush_hour(slot), rush);
    }

    #[rstest]
    fn slot_clock_wraps_past_midnight() {
        let settings = SchedulerSettings {
            service_start_minutes: 23 * 60,
            ..SchedulerSettings::default()
        };
        assert_eq!(clock_label(settings.slot_start_minutes(3)), "00:30");
    }

    #[rstest]
    fn horizon_may_span_past_one_day() {
        let settings = SchedulerSettings {
            time_horizon_hours: 36,
            ..SchedulerSettings::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.slots(), 72);
        assert_eq!(clock_label(settings.slot_start_minutes(48)), "06:00");
        assert!(settings.is_rush_hour(50));
    }

    #[rstest]
    #[case::zero_horizon(SchedulerSettings { time_horizon_hours: 0, ..SchedulerSettings::default() }, "time_horizon_hours")]
    #[case::zero_vehicles(SchedulerSettings { max_vehicles: 0, ..SchedulerSettings::default() }, "max_vehicles")]
    #[case::discount(SchedulerSettings { rush_discount: 1.5, ..SchedulerSettings::default() }, "rush_discount")]
    #[case::bonus(SchedulerSettings { coverage_bonus: f64::NAN, ..SchedulerSettings::default() }, "coverage_bonus")]
    fn rejects_invalid_settings(#[case] settings: SchedulerSettings, #[case] field: &str) {
        let err = FleetScheduler::new(settings).expect_err("invalid settings");
        assert!(matches!(
            err,
            ScheduleError::InvalidSettings(ConfigError::Invalid { field: f, .. }) if f == field
        ));
    }

    #[rstest]
    fn rush_discount_pulls_routes_into_peaks(routes: Vec<CandidateRoute>) {
        let schedule = scheduler().schedule(&routes).expect("feasible");
        assert_eq!(schedule.assignments.len(), 3);
        assert!(schedule.assignments.iter().all(|a| a.is_rush_hour));
        assert!((schedule.total_cost - 460.0).abs() < 1e-9);
        // 0.8 * 460 - 0.1 * 185
        assert!((schedule.objective_value - 349.5).abs() < 1e-9);
        assert!((schedule.coverage_percentage - 100.0).abs() < 1e-9);
        assert!(schedule.meets_coverage_target);
    }

    #[rstest]
    fn slot_capacity_spreads_routes(routes: Vec<CandidateRoute>) {
        let settings = SchedulerSettings {
            max_vehicles: 1,
            ..SchedulerSettings::default()
        };
        let schedule = FleetScheduler::new(settings)
            .expect("valid")
            .schedule(&routes)
            .expect("feasible");
        let mut slots: Vec<usize> = schedule.assignments.iter().map(|a| a.time_slot).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 3);
    }

    #[rstest]
    fn empty_route_set_reports_full_coverage() {
        let schedule = scheduler().schedule(&[]).expect("nothing to place");
        assert!(schedule.assignments.is_empty());
        assert!((schedule.coverage_percentage - 100.0).abs() < 1e-9);
    }

    #[rstest]
    fn coverage_counts_only_placed_routes(routes: Vec<CandidateRoute>) {
        let partial = scheduler().assemble(&routes, &[0, 48], 0.0, Instant::now());
        assert_eq!(partial.assignments.len(), 1);
        assert_eq!(partial.assignments[0].route_id, "r1");
        // 60 of 185 passengers
        assert!((partial.coverage_percentage - 6000.0 / 185.0).abs() < 1e-9);
        assert!(!partial.meets_coverage_target);
    }

    #[rstest]
    fn rejects_more_routes_than_slots() {
        let settings = SchedulerSettings {
            time_horizon_hours: 1,
            max_vehicles: 1,
            ..SchedulerSettings::default()
        };
        let routes: Vec<_> = (0..3)
            .map(|idx| CandidateRoute::new(format!("r{idx}"), 10, 10.0))
            .collect();
        let err = FleetScheduler::new(settings)
            .expect("valid")
            .schedule(&routes)
            .expect_err("three routes, two slots");
        assert_eq!(
            err,
            ScheduleError::InfeasibleSchedule {
                routes: 3,
                capacity: 2
            }
        );
        assert_eq!(err.status_label(), "no_solution");
    }

    #[rstest]
    #[case::duplicate(vec![CandidateRoute::new("a", 1, 1.0), CandidateRoute::new("a", 2, 2.0)], "duplicate route id")]
    #[case::negative(vec![CandidateRoute::new("a", 1, -1.0)], "cost must be non-negative")]
    #[case::infinite(vec![CandidateRoute::new("a", 1, f64::INFINITY)], "cost must be finite")]
    fn rejects_invalid_routes(#[case] routes: Vec<CandidateRoute>, #[case] expected: &str) {
        let err = scheduler().schedule(&routes).expect_err("invalid route");
        assert!(matches!(
            err,
            ScheduleError::InvalidRoute { reason, .. } if reason == expected
        ));
    }

    #[rstest]
    fn rejects_backend_output_that_breaks_constraints(routes: Vec<CandidateRoute>) {
        let settings = SchedulerSettings {
            max_vehicles: 1,
            ..SchedulerSettings::default()
        };
        let err = FleetScheduler::new(settings)
            .expect("valid")
            .with_backend(FixedBackend(Ok(vec![0, 0, 0])))
            .schedule(&routes)
            .expect_err("slot 0 overbooked");
        assert_eq!(err, ScheduleError::NoSolutionFound);
    }

    #[rstest]
    fn surfaces_backend_unavailability(routes: Vec<CandidateRoute>) {
        let err = scheduler()
            .with_backend(FixedBackend(Err(ScheduleError::SolverUnavailable)))
            .schedule(&routes)
            .expect_err("backend down");
        assert_eq!(err, ScheduleError::SolverUnavailable);
        assert_eq!(
            scheduler().backend_name().is_some(),
            cfg!(any(feature = "mip-backend", feature = "flow-backend"))
        );
    }

    #[cfg(feature = "mip-backend")]
    #[rstest]
    fn defaults_to_the_mip_backend() {
        assert_eq!(scheduler().backend_name(), Some("microlp"));
    }

    #[cfg(not(any(feature = "mip-backend", feature = "flow-backend")))]
    #[rstest]
    fn reports_missing_backend(routes: Vec<CandidateRoute>) {
        let err = scheduler().schedule(&routes).expect_err("no backend");
        assert_eq!(err, ScheduleError::SolverUnavailable);
    }
}

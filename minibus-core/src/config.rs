//! Shared fleet limits and configuration validation errors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a configuration value is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    #[must_use]
    pub const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// Limits shared by every vehicle in the homogeneous fleet.
///
/// # Examples
/// ```
/// use minibus_core::FleetLimits;
///
/// let limits = FleetLimits::default();
/// assert_eq!(limits.vehicle_capacity, 60);
/// assert!(limits.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetLimits {
    /// Maximum number of passengers a vehicle carries on one route.
    pub vehicle_capacity: u32,
    /// Maximum cumulative route time in minutes.
    pub max_route_time_minutes: u32,
    /// Maximum cumulative route distance in meters.
    pub max_route_distance_meters: u32,
    /// Idle time a vehicle may spend at a stop before the time dimension
    /// accrues. Stops carry no time windows, so no waiting is ever scheduled.
    pub waiting_slack_minutes: u32,
}

impl Default for FleetLimits {
    fn default() -> Self {
        Self {
            vehicle_capacity: 60,
            max_route_time_minutes: 480,
            max_route_distance_meters: 200_000,
            waiting_slack_minutes: 30,
        }
    }
}

impl FleetLimits {
    /// Validate the limits.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a limit is zero or the waiting
    /// slack exceeds the route time limit.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.vehicle_capacity == 0 {
            return Err(ConfigError::invalid("vehicle_capacity", "must be positive"));
        }
        if self.max_route_time_minutes == 0 {
            return Err(ConfigError::invalid(
                "max_route_time_minutes",
                "must be positive",
            ));
        }
        if self.max_route_distance_meters == 0 {
            return Err(ConfigError::invalid(
                "max_route_distance_meters",
                "must be positive",
            ));
        }
        if self.waiting_slack_minutes > self.max_route_time_minutes {
            return Err(ConfigError::invalid(
                "waiting_slack_minutes",
                "must not exceed the route time limit",
            ));
        }
        Ok(())
    }

    /// Report whether a route's totals fit inside every limit.
    #[must_use]
    pub const fn admits(&self, load: u32, time_minutes: u32, distance_meters: u32) -> bool {
        load <= self.vehicle_capacity
            && time_minutes <= self.max_route_time_minutes
            && distance_meters <= self.max_route_distance_meters
    }
}

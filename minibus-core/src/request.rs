//! Validated optimization requests.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Location;
use crate::matrix::{MatrixError, validate_locations};

/// Errors raised by [`OptimizationRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The locations themselves were unusable.
    #[error(transparent)]
    Locations(#[from] MatrixError),
    /// The number of demands does not match the number of locations.
    #[error("expected {locations} demands, found {demands}")]
    DemandCountMismatch {
        /// Number of locations supplied.
        locations: usize,
        /// Number of demands supplied.
        demands: usize,
    },
    /// The depot carried a non-zero demand.
    #[error("depot demand must be zero, found {demand}")]
    DepotDemand {
        /// Demand supplied for index 0.
        demand: u32,
    },
}

/// Parameters for a routing solve.
///
/// Index `0` of `locations` is the depot; `demands[i]` is the passenger
/// load collected at `locations[i]`.
///
/// # Examples
/// ```
/// use minibus_core::{Location, OptimizationRequest};
///
/// let request = OptimizationRequest::new(
///     vec![Location::new(5.6037, -0.1870), Location::new(5.6137, -0.1870)],
///     vec![0, 12],
///     4,
/// );
/// assert!(request.validate().is_ok());
/// assert_eq!(request.effective_vehicles(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationRequest {
    /// Stop coordinates, depot first.
    pub locations: Vec<Location>,
    /// Passenger demand per location.
    pub demands: Vec<u32>,
    /// Requested fleet size; clamped to `1..=locations.len() - 1`.
    pub num_vehicles: usize,
    /// Optional search budget overriding the optimizer default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_limit_seconds: Option<u64>,
}

impl OptimizationRequest {
    /// Construct a request using the optimizer's default time budget.
    #[must_use]
    pub const fn new(locations: Vec<Location>, demands: Vec<u32>, num_vehicles: usize) -> Self {
        Self {
            locations,
            demands,
            num_vehicles,
            time_limit_seconds: None,
        }
    }

    /// Override the search time budget.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_seconds = Some(limit.as_secs());
        self
    }

    /// Validate the request before it reaches a solver.
    ///
    /// # Errors
    /// Returns [`RequestError`] when locations are invalid, demand counts do
    /// not line up, or the depot carries demand.
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_locations(&self.locations)?;
        if self.demands.len() != self.locations.len() {
            return Err(RequestError::DemandCountMismatch {
                locations: self.locations.len(),
                demands: self.demands.len(),
            });
        }
        match self.demands.first() {
            Some(&demand) if demand != 0 => Err(RequestError::DepotDemand { demand }),
            _ => Ok(()),
        }
    }

    /// Fleet size after clamping to `1..=N-1`.
    #[must_use]
    pub fn effective_vehicles(&self) -> usize {
        let stops = self.locations.len().saturating_sub(1).max(1);
        self.num_vehicles.clamp(1, stops)
    }

    /// Sum of all demands.
    #[must_use]
    pub fn total_demand(&self) -> u64 {
        self.demands.iter().map(|&demand| u64::from(demand)).sum()
    }
}

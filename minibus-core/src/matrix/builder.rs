//! Haversine-based matrix builder and its settings.

use geo::{Distance, HaversineMeasure, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::MatrixError;
use crate::{ConfigError, Location};

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const EARTH: HaversineMeasure = HaversineMeasure::new(6_371_000.0);

/// Square matrix of road distances in meters.
pub type DistanceMatrix = Vec<Vec<u32>>;

/// Square matrix of travel times in whole minutes.
pub type TimeMatrix = Vec<Vec<u32>>;

/// Great-circle distance between two points in kilometers.
///
/// Points follow the `geo` convention: `x` is longitude and `y` latitude.
///
/// # Examples
/// ```
/// use geo::Point;
/// use minibus_core::haversine_km;
///
/// let one_degree = haversine_km(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
/// assert!((one_degree - 111.19).abs() < 0.01);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "meters to kilometers")]
pub fn haversine_km(from: Point<f64>, to: Point<f64>) -> f64 {
    EARTH.distance(from, to) / 1000.0
}

/// Check that at least two locations exist and every coordinate is usable.
///
/// # Errors
/// Returns [`MatrixError::InsufficientLocations`] for fewer than two entries
/// and [`MatrixError::InvalidLocation`] for the first invalid coordinate.
pub fn validate_locations(locations: &[Location]) -> Result<(), MatrixError> {
    if locations.len() < 2 {
        return Err(MatrixError::InsufficientLocations {
            found: locations.len(),
        });
    }
    match locations.iter().position(|location| !location.is_valid()) {
        Some(index) => Err(MatrixError::InvalidLocation { index }),
        None => Ok(()),
    }
}

/// Tunables for [`MatrixBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatrixSettings {
    /// Multiplier applied to every off-diagonal distance as a stand-in for
    /// live traffic.
    pub congestion_factor: f64,
    /// Average vehicle speed used to convert distance into time.
    pub average_speed_kmh: f64,
    /// Service time added to every hop between distinct stops.
    pub service_time_minutes: u32,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            congestion_factor: 1.3,
            average_speed_kmh: 30.0,
            service_time_minutes: 2,
        }
    }
}

impl MatrixSettings {
    /// Validate the settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the congestion factor is below
    /// one or the speed is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.congestion_factor.is_finite() || self.congestion_factor < 1.0 {
            return Err(ConfigError::invalid(
                "congestion_factor",
                "must be a finite value of at least 1.0",
            ));
        }
        if !self.average_speed_kmh.is_finite() || self.average_speed_kmh <= 0.0 {
            return Err(ConfigError::invalid(
                "average_speed_kmh",
                "must be a positive finite value",
            ));
        }
        Ok(())
    }
}

/// Distance and time matrices for one set of locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingMatrices {
    distance: DistanceMatrix,
    time: TimeMatrix,
}

impl RoutingMatrices {
    /// Wrap pre-computed matrices.
    ///
    /// Intended for tests and callers supplying their own estimates; both
    /// matrices must be square and of equal size.
    ///
    /// # Errors
    /// Returns [`MatrixError::InsufficientLocations`] when the matrices are
    /// smaller than 2x2 or their shapes disagree.
    pub fn from_parts(distance: DistanceMatrix, time: TimeMatrix) -> Result<Self, MatrixError> {
        let size = distance.len();
        let square = |matrix: &[Vec<u32>]| matrix.iter().all(|row| row.len() == size);
        if size < 2 || time.len() != size || !square(&distance) || !square(&time) {
            return Err(MatrixError::InsufficientLocations { found: size });
        }
        Ok(Self { distance, time })
    }

    /// Number of locations covered by the matrices.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.distance.len()
    }

    /// Distance matrix in meters.
    #[must_use]
    pub fn distance(&self) -> &DistanceMatrix {
        &self.distance
    }

    /// Time matrix in minutes.
    #[must_use]
    pub fn time(&self) -> &TimeMatrix {
        &self.time
    }

    /// Distance in meters from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn distance_between(&self, from: usize, to: usize) -> Option<u32> {
        self.distance.get(from).and_then(|row| row.get(to)).copied()
    }

    /// Travel time in minutes from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn time_between(&self, from: usize, to: usize) -> Option<u32> {
        self.time.get(from).and_then(|row| row.get(to)).copied()
    }
}

/// Pure, deterministic builder for [`RoutingMatrices`].
///
/// # Examples
/// ```
/// use minibus_core::{Location, MatrixBuilder, MatrixSettings};
///
/// let builder = MatrixBuilder::new(MatrixSettings::default());
/// let matrices = builder
///     .build(&[Location::new(5.6037, -0.1870), Location::new(5.6137, -0.1870)])
///     .expect("two valid locations");
/// assert_eq!(matrices.size(), 2);
/// assert_eq!(matrices.distance_between(0, 0), Some(0));
/// assert!(matrices.time_between(0, 1) > Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatrixBuilder {
    settings: MatrixSettings,
}

impl MatrixBuilder {
    /// Create a builder with the given settings.
    #[must_use]
    pub const fn new(settings: MatrixSettings) -> Self {
        Self { settings }
    }

    /// Settings used by this builder.
    #[must_use]
    pub const fn settings(&self) -> &MatrixSettings {
        &self.settings
    }

    /// Road distance estimate in kilometers between two locations.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "congestion inflation scales a floating-point distance"
    )]
    pub fn road_km(&self, from: Location, to: Location) -> f64 {
        haversine_km(from.into(), to.into()) * self.settings.congestion_factor
    }

    /// Travel time in minutes for a hop of `road_km` between distinct stops,
    /// service time included.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "time derives from distance over speed"
    )]
    pub fn hop_minutes(&self, road_km: f64) -> f64 {
        road_km / self.settings.average_speed_kmh * 60.0
            + f64::from(self.settings.service_time_minutes)
    }

    /// Meters and whole minutes for the hop `from -> to`; zero for a stay.
    #[must_use]
    pub fn hop(&self, from: Location, to: Location, same_stop: bool) -> (u32, u32) {
        if same_stop {
            return (0, 0);
        }
        let road_km = self.road_km(from, to);
        (km_to_meters(road_km), whole_units(self.hop_minutes(road_km)))
    }

    /// Build distance and time matrices for `locations`.
    ///
    /// # Errors
    /// Returns [`MatrixError::InsufficientLocations`] for fewer than two
    /// locations, [`MatrixError::InvalidLocation`] for unusable coordinates and
    /// [`MatrixError::Settings`] when the builder settings are invalid.
    pub fn build(&self, locations: &[Location]) -> Result<RoutingMatrices, MatrixError> {
        self.settings.validate()?;
        validate_locations(locations)?;

        let (distance, time): (DistanceMatrix, TimeMatrix) = locations
            .iter()
            .enumerate()
            .map(|(row, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(column, to)| self.hop(*from, *to, row == column))
                    .unzip::<u32, u32, Vec<u32>, Vec<u32>>()
            })
            .unzip();

        Ok(RoutingMatrices { distance, time })
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "kilometers convert to meters by scaling"
)]
fn km_to_meters(km: f64) -> u32 {
    whole_units(km * 1000.0)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "inputs are finite, non-negative and far below u32::MAX"
)]
fn whole_units(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

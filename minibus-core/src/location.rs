//! Geographic stop positions.

use geo::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A stop position expressed as latitude and longitude in degrees.
///
/// Locations are identified by their index in the request; index `0` is the
/// depot. On the wire a location is a `[latitude, longitude]` pair.
///
/// # Examples
/// ```
/// use minibus_core::Location;
///
/// let depot = Location::new(5.6037, -0.1870);
/// assert!(depot.is_valid());
/// assert!(!Location::new(f64::NAN, 0.0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(f64, f64)", into = "(f64, f64)"))]
pub struct Location {
    /// Latitude in degrees, within `-90..=90`.
    pub latitude: f64,
    /// Longitude in degrees, within `-180..=180`.
    pub longitude: f64,
}

impl Location {
    /// Construct a location without validating it.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Report whether both coordinates are finite and inside their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for Location {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Location> for (f64, f64) {
    fn from(location: Location) -> Self {
        (location.latitude, location.longitude)
    }
}

impl From<Location> for Point<f64> {
    fn from(location: Location) -> Self {
        Self::new(location.longitude, location.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, true)]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.5, 0.0, false)]
    #[case(0.0, -181.0, false)]
    #[case(f64::NAN, 0.0, false)]
    #[case(0.0, f64::INFINITY, false)]
    fn validates_coordinate_ranges(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(Location::new(latitude, longitude).is_valid(), expected);
    }

    #[rstest]
    fn converts_to_point_with_longitude_as_x() {
        let point = Point::from(Location::new(5.6, -0.18));
        assert!((point.x() - -0.18).abs() < f64::EPSILON);
        assert!((point.y() - 5.6).abs() < f64::EPSILON);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialises_from_coordinate_pair() {
        let location: Location = serde_json::from_str("[5.6037, -0.187]").expect("valid pair");
        assert_eq!(location, Location::new(5.6037, -0.187));
    }
}

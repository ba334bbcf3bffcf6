//! Estimate pairwise distances and travel times between stops.
//!
//! [`MatrixBuilder`] turns an ordered slice of [`Location`](crate::Location)
//! values into a [`RoutingMatrices`] pair: road distances in meters and
//! travel times in minutes. Distances are great-circle estimates inflated by
//! a fixed congestion factor; no routing service is consulted.
//!
//! Errors are returned when inputs are invalid, e.g. fewer than two stops.

mod builder;
mod error;

pub use builder::{
    DistanceMatrix, EARTH_RADIUS_KM, MatrixBuilder, MatrixSettings, RoutingMatrices, TimeMatrix,
    haversine_km, validate_locations,
};
pub use error::MatrixError;

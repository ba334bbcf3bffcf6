use thiserror::Error;

use crate::ConfigError;

/// Errors from [`crate::matrix::MatrixBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Fewer than two locations were provided.
    ///
    /// A routing matrix needs the depot and at least one stop.
    #[error("at least two locations are required, found {found}")]
    InsufficientLocations {
        /// Number of locations supplied.
        found: usize,
    },
    /// A coordinate was NaN, infinite or out of range.
    #[error("location {index} has an invalid coordinate")]
    InvalidLocation {
        /// Index of the offending location.
        index: usize,
    },
    /// The builder settings were unusable.
    #[error(transparent)]
    Settings(#[from] ConfigError),
}

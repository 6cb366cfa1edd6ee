use courier_matrix_providers::travel_matrix_client::MatrixProviderError;
use thiserror::Error;

/// Rejections raised before any solve attempt. The display string is the
/// `title` returned to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required input: {0}")]
    MissingField(&'static str),

    #[error("Numerical input must be positive")]
    NonPositive(&'static str),

    #[error("Numerical input cannot be negative")]
    Negative(&'static str),

    #[error("Invalid {0}")]
    InvalidValue(&'static str),

    #[error("Invalid order {0}: expected a pickup and at least one delivery")]
    InvalidOrder(usize),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Bad request: OSRM cannot be used with more than {limit} points")]
    TooManyNodes { nodes: usize, limit: usize },

    #[error("Bad request: {0} and {1} cannot be combined")]
    Conflicting(&'static str, &'static str),

    #[error("Bad request: matrix service is not configured")]
    MatrixServiceUnavailable,

    #[error("Bad request: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Upstream service error: {0}")]
    Upstream(#[from] MatrixProviderError),
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Upstream(_) => 502,
        }
    }
}

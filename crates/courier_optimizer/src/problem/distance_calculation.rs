use std::{fmt::Display, str::FromStr};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceCalculation {
    #[default]
    Geodesic,
    MatrixService,
    /// Matrix service for small requests when one is configured, geodesic otherwise.
    Auto,
}

impl FromStr for DistanceCalculation {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "geodesic" | "vincenty" => Ok(DistanceCalculation::Geodesic),
            "matrix-service" | "matrix_service" | "osrm" => Ok(DistanceCalculation::MatrixService),
            "auto" => Ok(DistanceCalculation::Auto),
            _ => Err(ValidationError::InvalidValue("distance_calculation")),
        }
    }
}

impl Display for DistanceCalculation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DistanceCalculation::Geodesic => "geodesic",
                DistanceCalculation::MatrixService => "matrix-service",
                DistanceCalculation::Auto => "auto",
            }
        )
    }
}

use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundPolicy {
    #[default]
    Soft,
    Hard,
}

impl FromStr for BoundPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(BoundPolicy::Soft),
            "hard" => Ok(BoundPolicy::Hard),
            _ => Err(ValidationError::InvalidValue("min_parcels_policy")),
        }
    }
}

/// Minimum number of parcels a used vehicle should collect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinParcels {
    pub value: f64,
    pub policy: BoundPolicy,
}

impl MinParcels {
    pub fn new(value: f64, policy: BoundPolicy) -> Self {
        MinParcels { value, policy }
    }

    pub fn is_active(&self) -> bool {
        self.value > 0.0
    }
}

use std::str::FromStr;

use crate::error::ValidationError;

/// How parcel quantities accumulate along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadModel {
    /// Pickup loads `q`, delivery unloads `q`. The cumul is the on-board load.
    #[default]
    Paired,
    /// Pickup counts `q`, delivery counts nothing. The cumul is what the route collected.
    Collected,
}

impl FromStr for LoadModel {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paired" => Ok(LoadModel::Paired),
            "collected" => Ok(LoadModel::Collected),
            _ => Err(ValidationError::InvalidValue("load_model")),
        }
    }
}

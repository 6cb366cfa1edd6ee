use std::str::FromStr;

use crate::error::ValidationError;

/// How visited nodes are projected in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultMode {
    /// `"{order}-{leg}"` per node.
    #[default]
    Orders,
    /// `[lat, lon]` per node, with the depot where the vehicle actually is.
    Coordinates,
}

impl FromStr for ResultMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "orders" | "order" => Ok(ResultMode::Orders),
            "coordinates" | "coordinate" => Ok(ResultMode::Coordinates),
            _ => Err(ValidationError::InvalidValue("result_mode")),
        }
    }
}

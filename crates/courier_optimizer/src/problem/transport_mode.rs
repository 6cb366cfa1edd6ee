use std::{fmt::Display, str::FromStr};

use crate::error::ValidationError;

/// Which depot-adjacent legs carry a real cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportMode {
    /// Leaves the depot, never comes back: return arcs cost nothing.
    #[default]
    OutboundOnly,
    /// Starts pre-positioned, ends at the depot: departure arcs cost nothing.
    InboundOnly,
    RoundTrip,
}

impl TransportMode {
    pub fn masks_return(&self) -> bool {
        matches!(self, TransportMode::OutboundOnly)
    }

    pub fn masks_departure(&self) -> bool {
        matches!(self, TransportMode::InboundOnly)
    }
}

impl FromStr for TransportMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "outbound-only" | "outbound_only" | "1n" => Ok(TransportMode::OutboundOnly),
            "inbound-only" | "inbound_only" | "n1" => Ok(TransportMode::InboundOnly),
            "round-trip" | "round_trip" | "1n1" => Ok(TransportMode::RoundTrip),
            _ => Err(ValidationError::InvalidValue("transport_mode")),
        }
    }
}

impl Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransportMode::OutboundOnly => "outbound-only",
                TransportMode::InboundOnly => "inbound-only",
                TransportMode::RoundTrip => "round-trip",
            }
        )
    }
}

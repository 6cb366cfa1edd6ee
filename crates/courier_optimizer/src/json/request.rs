use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    decoder::result_mode::ResultMode,
    error::ValidationError,
    problem::{
        location::Location,
        order::Order,
        routing_problem::{
            DEFAULT_MATRIX_SERVICE_MAX_NODES, RoutingProblem, RoutingProblemBuilder,
        },
    },
};

/// `[lat, lon]`, `[lat, lon, cod]` or `{lat, lon, cod?, parcels?}`. In `points`
/// the third array value is the parcel count instead of the cash.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged, rename = "Location")]
pub enum JsonLocation {
    Array(Vec<f64>),
    Object {
        lat: f64,
        lon: f64,
        cod: Option<f64>,
        parcels: Option<f64>,
    },
}

impl JsonLocation {
    fn to_point(&self) -> Result<Location, ValidationError> {
        match self {
            JsonLocation::Array(values) => match values.as_slice() {
                [lat, lon] => Ok(Location::from_lat_lon(*lat, *lon)),
                [lat, lon, parcels] => {
                    Ok(Location::from_lat_lon(*lat, *lon).with_parcels(*parcels))
                }
                _ => Err(ValidationError::InvalidLocation(format!(
                    "expected [lat, lon] or [lat, lon, parcels], got {} values",
                    values.len()
                ))),
            },
            JsonLocation::Object { .. } => Location::try_from(self),
        }
    }
}

impl TryFrom<&JsonLocation> for Location {
    type Error = ValidationError;

    fn try_from(value: &JsonLocation) -> Result<Self, Self::Error> {
        match value {
            JsonLocation::Array(values) => match values.as_slice() {
                [lat, lon] => Ok(Location::from_lat_lon(*lat, *lon)),
                [lat, lon, cod] => Ok(Location::from_lat_lon(*lat, *lon).with_cod(*cod)),
                _ => Err(ValidationError::InvalidLocation(format!(
                    "expected [lat, lon] or [lat, lon, cod], got {} values",
                    values.len()
                ))),
            },
            JsonLocation::Object {
                lat,
                lon,
                cod,
                parcels,
            } => {
                let mut location = Location::from_lat_lon(*lat, *lon);
                if let Some(cod) = cod {
                    location = location.with_cod(*cod);
                }
                if let Some(parcels) = parcels {
                    location = location.with_parcels(*parcels);
                }
                Ok(location)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename = "RoutingRequest")]
pub struct JsonRoutingRequest {
    pub depot: Option<JsonLocation>,
    pub vehicle_num: Option<i64>,
    /// Each order lists its pickup first, then one or more deliveries.
    pub orders: Option<Vec<Vec<JsonLocation>>>,
    /// Standalone stops, served without pairing. Replaces `orders`.
    pub points: Option<Vec<JsonLocation>>,
    /// Meters, 0 means unbounded.
    pub max_distance: Option<f64>,
    #[serde(alias = "max_parcels")]
    pub vehicle_capacity: Option<f64>,
    pub max_cod: Option<f64>,
    pub min_parcels: Option<f64>,
    /// `soft` or `hard`
    pub min_parcels_policy: Option<String>,
    pub min_vehicles: Option<bool>,
    /// `paired` or `collected`
    pub load_model: Option<String>,
    /// `outbound-only`, `inbound-only` or `round-trip`
    pub transport_mode: Option<String>,
    /// `geodesic`, `matrix-service` or `auto`
    pub distance_calculation: Option<String>,
    /// `orders` or `coordinates`
    pub result_mode: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedRequest {
    pub problem: RoutingProblem,
    pub result_mode: ResultMode,
}

impl JsonRoutingRequest {
    pub fn from_json_str(input: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(input).map_err(|error| ValidationError::Malformed(error.to_string()))
    }

    pub fn build_problem(self) -> Result<ValidatedRequest, ValidationError> {
        self.build_problem_within(DEFAULT_MATRIX_SERVICE_MAX_NODES)
    }

    /// Validates the request and flattens it, rejecting matrix-service requests
    /// above `matrix_service_max_nodes` before any node is built.
    #[instrument(skip_all, level = "debug")]
    pub fn build_problem_within(
        self,
        matrix_service_max_nodes: usize,
    ) -> Result<ValidatedRequest, ValidationError> {
        let depot = self
            .depot
            .as_ref()
            .ok_or(ValidationError::MissingField("depot"))?;
        let vehicle_num = self
            .vehicle_num
            .ok_or(ValidationError::MissingField("vehicle_num"))?;
        if self.orders.is_none() && self.points.is_none() {
            return Err(ValidationError::MissingField("orders"));
        }

        let mut builder = RoutingProblemBuilder::default();
        builder.set_matrix_service_max_nodes(matrix_service_max_nodes);

        if let Some(policy) = &self.min_parcels_policy {
            builder.set_min_parcels_policy(policy.parse()?);
        }

        if let Some(load_model) = &self.load_model {
            builder.set_load_model(load_model.parse()?);
        }

        if let Some(transport_mode) = &self.transport_mode {
            builder.set_transport_mode(transport_mode.parse()?);
        }

        if let Some(distance_calculation) = &self.distance_calculation {
            builder.set_distance_calculation(distance_calculation.parse()?);
        }

        let result_mode = match &self.result_mode {
            Some(result_mode) => result_mode.parse()?,
            None => ResultMode::default(),
        };

        builder
            .set_depot(Location::try_from(depot)?)
            .set_vehicle_num(vehicle_num);

        if let Some(orders) = &self.orders {
            let mut parsed = Vec::with_capacity(orders.len());
            for (index, locations) in orders.iter().enumerate() {
                let locations = locations
                    .iter()
                    .map(Location::try_from)
                    .collect::<Result<Vec<_>, _>>()?;

                parsed.push(
                    Order::from_locations(locations).ok_or(ValidationError::InvalidOrder(index))?,
                );
            }
            builder.set_orders(parsed);
        }

        if let Some(points) = &self.points {
            let points = points
                .iter()
                .map(JsonLocation::to_point)
                .collect::<Result<Vec<_>, _>>()?;
            builder.set_points(points);
        }

        if let Some(max_distance) = self.max_distance {
            builder.set_max_distance(max_distance);
        }

        if let Some(vehicle_capacity) = self.vehicle_capacity {
            builder.set_vehicle_capacity(vehicle_capacity);
        }

        if let Some(max_cod) = self.max_cod {
            builder.set_max_cod(max_cod);
        }

        if let Some(min_parcels) = self.min_parcels {
            builder.set_min_parcels(min_parcels);
        }

        if let Some(min_vehicles) = self.min_vehicles {
            builder.set_min_vehicles(min_vehicles);
        }

        Ok(ValidatedRequest {
            problem: builder.build()?,
            result_mode,
        })
    }
}

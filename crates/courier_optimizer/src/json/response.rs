use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    decoder::decoded_route::{DecodedSolution, RouteStop},
    distance::violated_points::ViolatedPoint,
    error::Error,
};

pub const NO_SOLUTION_FOUND: &str = "No solution found";

#[derive(Debug, Clone, PartialEq)]
pub enum RoutingResponse {
    Solved(DecodedSolution),
    /// Both escalation phases ended without an assignment.
    NoSolution,
}

#[derive(Debug, Serialize)]
#[serde(rename = "RoutingSolution")]
pub struct JsonRoutingSolution<'a> {
    pub cluster: Vec<&'a [RouteStop]>,
    pub violated_cluster: Vec<&'a [RouteStop]>,
    pub violated_points: &'a [ViolatedPoint],
}

impl<'a> From<&'a DecodedSolution> for JsonRoutingSolution<'a> {
    fn from(value: &'a DecodedSolution) -> Self {
        JsonRoutingSolution {
            cluster: value
                .cluster
                .iter()
                .map(|route| route.stops.as_slice())
                .collect(),
            violated_cluster: value
                .violated_cluster
                .iter()
                .map(|route| route.stops.as_slice())
                .collect(),
            violated_points: &value.violated_points,
        }
    }
}

impl RoutingResponse {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RoutingResponse::Solved(solution) => json!(JsonRoutingSolution::from(solution)),
            RoutingResponse::NoSolution => json!(NO_SOLUTION_FOUND),
        }
    }
}

/// Status code plus the serialized JSON body, the envelope callers of the
/// service expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn from_result(result: &Result<RoutingResponse, Error>) -> Self {
        match result {
            Ok(response) => GatewayResponse {
                status_code: 200,
                body: response.to_json().to_string(),
            },
            Err(error) => GatewayResponse {
                status_code: error.status_code(),
                body: json!({ "title": error.to_string() }).to_string(),
            },
        }
    }
}

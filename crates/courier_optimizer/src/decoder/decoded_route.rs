use serde::Serialize;

use crate::distance::violated_points::ViolatedPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteStop {
    Order(String),
    /// `[lat, lon]`
    Coordinates([f64; 2]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteViolation {
    MaximumDistance,
    MinimumParcels,
    Capacity,
    Cod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRoute {
    pub vehicle: usize,
    pub stops: Vec<RouteStop>,
    pub distance: f64,
    /// Parcels picked up along the route.
    pub parcels: f64,
    pub peak_load: f64,
    pub peak_cod: f64,
    pub violations: Vec<RouteViolation>,
}

impl DecodedRoute {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DecodedSolution {
    pub cluster: Vec<DecodedRoute>,
    pub violated_cluster: Vec<DecodedRoute>,
    pub violated_points: Vec<ViolatedPoint>,
}

impl DecodedSolution {
    /// Nothing left to route once the depot is alone.
    pub fn without_routes(violated_points: Vec<ViolatedPoint>) -> Self {
        DecodedSolution {
            cluster: vec![],
            violated_cluster: vec![],
            violated_points,
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &DecodedRoute> {
        self.cluster.iter().chain(self.violated_cluster.iter())
    }
}

use crate::problem::node::NodeIdx;

/// Visits of one vehicle between its start and end depot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub visits: Vec<NodeIdx>,
}

impl VehicleRoute {
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// One entry per vehicle, empty when the vehicle is unused.
    pub routes: Vec<VehicleRoute>,
    pub objective: f64,
}

impl Assignment {
    pub fn from_visits(visits: Vec<Vec<NodeIdx>>, objective: f64) -> Self {
        Assignment {
            routes: visits
                .into_iter()
                .enumerate()
                .map(|(vehicle, visits)| VehicleRoute { vehicle, visits })
                .collect(),
            objective,
        }
    }

    pub fn used_routes(&self) -> impl Iterator<Item = &VehicleRoute> {
        self.routes.iter().filter(|route| !route.is_empty())
    }

    pub fn num_used_vehicles(&self) -> usize {
        self.used_routes().count()
    }
}

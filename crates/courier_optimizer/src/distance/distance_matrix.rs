use courier_matrix_providers::travel_matrices::TravelMatrices;

use crate::problem::{node::NodeIdx, transport_mode::TransportMode};

/// Arc surcharge applied on large graphs to discourage long arcs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterCostParams {
    /// Surcharge is only applied above this node count.
    pub node_threshold: usize,
    pub distance_threshold: f64,
    pub surcharge: f64,
}

impl Default for ClusterCostParams {
    fn default() -> Self {
        ClusterCostParams {
            node_threshold: 100,
            distance_threshold: 500.0,
            surcharge: 1000.0,
        }
    }
}

/// Frozen node to node distances (meters), masked per transport mode.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Vec<f64>,
    num_nodes: usize,
    transport_mode: TransportMode,
    cluster: Option<ClusterCostParams>,
}

impl DistanceMatrix {
    pub fn new(matrices: &TravelMatrices, transport_mode: TransportMode) -> Self {
        let num_nodes = matrices.num_points;
        let mut distances = matrices.distances.clone();

        for from in 0..num_nodes {
            for to in 0..num_nodes {
                let masked = from == to
                    || (to == 0 && transport_mode.masks_return())
                    || (from == 0 && transport_mode.masks_departure());

                if masked {
                    distances[from * num_nodes + to] = 0.0;
                }
            }
        }

        DistanceMatrix {
            distances,
            num_nodes,
            transport_mode,
            cluster: None,
        }
    }

    /// Enables the arc surcharge when the graph is larger than the configured threshold.
    pub fn with_cluster_cost(mut self, params: ClusterCostParams) -> Self {
        self.cluster = (self.num_nodes > params.node_threshold).then_some(params);
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn is_cluster_mode(&self) -> bool {
        self.cluster.is_some()
    }

    #[inline(always)]
    pub fn travel_distance(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.distances[from.get() * self.num_nodes + to.get()]
    }

    /// Distance plus the cluster surcharge, used as the arc cost of the objective.
    pub fn travel_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        let distance = self.travel_distance(from, to);
        match &self.cluster {
            Some(cluster) if distance > cluster.distance_threshold => distance + cluster.surcharge,
            _ => distance,
        }
    }
}

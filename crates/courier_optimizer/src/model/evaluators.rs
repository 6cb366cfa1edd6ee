use std::sync::Arc;

use crate::{
    distance::distance_matrix::DistanceMatrix,
    model::dimension::Evaluator,
    problem::{
        load_model::LoadModel,
        node::{NodeIdx, NodeRole},
        routing_problem::RoutingProblem,
    },
};

// Node quantities are charged when leaving the node, so the cumul on arrival
// at a node excludes that node's own quantity.

fn node_deltas(problem: &RoutingProblem, delta: impl Fn(NodeRole, f64, f64) -> f64) -> Arc<[f64]> {
    problem
        .nodes()
        .iter()
        .map(|node| delta(node.role(), node.parcels(), node.cod()))
        .collect()
}

fn from_node_evaluator(deltas: Arc<[f64]>) -> Evaluator {
    Arc::new(move |from: NodeIdx, _to: NodeIdx| deltas[from.get()])
}

pub fn distance_evaluator(matrix: Arc<DistanceMatrix>) -> Evaluator {
    Arc::new(move |from, to| matrix.travel_distance(from, to))
}

/// Arc cost of the objective, including the cluster surcharge when active.
pub fn arc_cost_evaluator(matrix: Arc<DistanceMatrix>) -> Evaluator {
    Arc::new(move |from, to| matrix.travel_cost(from, to))
}

pub fn load_evaluator(problem: &RoutingProblem) -> Evaluator {
    let load_model = problem.load_model();
    from_node_evaluator(node_deltas(problem, |role, parcels, _| {
        match (role, load_model) {
            (NodeRole::Depot, _) => 0.0,
            (NodeRole::Pickup | NodeRole::Stop, _) => parcels,
            (NodeRole::Delivery, LoadModel::Paired) => -parcels,
            (NodeRole::Delivery, LoadModel::Collected) => 0.0,
        }
    }))
}

pub fn collected_evaluator(problem: &RoutingProblem) -> Evaluator {
    from_node_evaluator(node_deltas(problem, |role, parcels, _| match role {
        NodeRole::Pickup | NodeRole::Stop => parcels,
        NodeRole::Depot | NodeRole::Delivery => 0.0,
    }))
}

pub fn cod_evaluator(problem: &RoutingProblem) -> Evaluator {
    from_node_evaluator(node_deltas(problem, |role, _, cod| match role {
        NodeRole::Depot | NodeRole::Stop => 0.0,
        NodeRole::Pickup => cod,
        NodeRole::Delivery => -cod,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{location::Location, routing_problem::RoutingProblemBuilder},
        test_utils::create_problem,
    };

    fn idx(index: usize) -> NodeIdx {
        NodeIdx::new(index)
    }

    #[test]
    fn test_cod_evaluator_signs() {
        let problem = create_problem(
            (10.0, 106.0),
            vec![vec![(10.1, 106.1), (10.2, 106.2)]],
            |_| {},
        );
        // fixture deliveries carry cod = 100 * (leg)
        let cod = cod_evaluator(&problem);

        assert_eq!(cod(idx(0), idx(1)), 0.0);
        assert_eq!(cod(idx(1), idx(2)), 100.0);
        assert_eq!(cod(idx(2), idx(0)), -100.0);
    }

    #[test]
    fn test_load_evaluator_per_model() {
        let paired = create_problem(
            (10.0, 106.0),
            vec![vec![(10.1, 106.1), (10.2, 106.2)]],
            |_| {},
        );
        let load = load_evaluator(&paired);
        assert_eq!(load(idx(1), idx(2)), 1.0);
        assert_eq!(load(idx(2), idx(0)), -1.0);

        let collected = create_problem(
            (10.0, 106.0),
            vec![vec![(10.1, 106.1), (10.2, 106.2)]],
            |builder| {
                builder.set_load_model(LoadModel::Collected);
            },
        );
        let load = load_evaluator(&collected);
        assert_eq!(load(idx(1), idx(2)), 1.0);
        assert_eq!(load(idx(2), idx(0)), 0.0);

        let collected = collected_evaluator(&paired);
        assert_eq!(collected(idx(2), idx(0)), 0.0);
        assert_eq!(collected(idx(1), idx(2)), 1.0);
    }

    #[test]
    fn test_stops_carry_a_flat_parcel_count() {
        let mut builder = RoutingProblemBuilder::default();
        builder
            .set_depot(Location::from_lat_lon(10.0, 106.0))
            .set_vehicle_num(1)
            .set_points(vec![
                Location::from_lat_lon(10.1, 106.1).with_parcels(3.0),
                Location::from_lat_lon(10.2, 106.2).with_parcels(2.0),
            ]);
        let problem = builder.build().unwrap();

        let load = load_evaluator(&problem);
        let collected = collected_evaluator(&problem);
        let cod = cod_evaluator(&problem);

        assert_eq!(load(idx(1), idx(2)), 3.0);
        assert_eq!(load(idx(2), idx(0)), 2.0);
        assert_eq!(collected(idx(1), idx(2)), 3.0);
        assert_eq!(cod(idx(1), idx(2)), 0.0);
    }
}

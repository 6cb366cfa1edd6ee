use serde::Serialize;

use crate::problem::{
    node::{Node, NodeIdx},
    routing_problem::{NodeRemoval, RoutingProblem},
};

/// A node dropped before solving because the depot is already farther than the distance bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolatedPoint {
    pub order: String,
    /// `[lat, lon]`
    pub coordinates: [f64; 2],
}

impl From<&Node> for ViolatedPoint {
    fn from(node: &Node) -> Self {
        ViolatedPoint {
            order: node
                .order_ref()
                .map(|order_ref| order_ref.to_string())
                .unwrap_or_default(),
            coordinates: node.location().lat_lon(),
        }
    }
}

pub fn find_violated_nodes(depot_distances: &[f64], max_distance: f64) -> Vec<NodeIdx> {
    depot_distances
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, distance)| *distance > max_distance)
        .map(|(index, _)| NodeIdx::new(index))
        .collect()
}

/// Removes every node (and its pair partner) whose direct depot distance is above
/// the problem's distance bound. `depot_distances` is indexed like the problem nodes.
pub fn filter_violated_points(
    problem: &mut RoutingProblem,
    depot_distances: &[f64],
) -> (NodeRemoval, Vec<ViolatedPoint>) {
    if !problem.has_max_distance() {
        return (
            NodeRemoval {
                removed: vec![],
                retained: NodeIdx::range(problem.num_nodes()).collect(),
            },
            vec![],
        );
    }

    let violated = find_violated_nodes(depot_distances, problem.max_distance());
    let removal = problem.remove_nodes(&violated);
    let violated_points = removal
        .removed
        .iter()
        .map(|(_, node)| ViolatedPoint::from(node))
        .collect();

    (removal, violated_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_problem;

    #[test]
    fn test_find_violated_nodes_skips_depot() {
        let violated = find_violated_nodes(&[9999.0, 10.0, 600.0, 20.0], 500.0);
        assert_eq!(violated, vec![NodeIdx::new(2)]);
    }

    #[test]
    fn test_filter_reports_pairs_and_is_idempotent() {
        // depot, (1,2) near, (3,4) with a far delivery
        let mut problem = create_problem(
            (10.0, 106.0),
            vec![
                vec![(10.001, 106.0), (10.002, 106.0)],
                vec![(10.001, 106.0), (11.0, 106.0)],
            ],
            |builder| {
                builder.set_max_distance(5_000.0);
            },
        );

        let distances = vec![0.0, 110.0, 220.0, 110.0, 110_000.0];
        let (removal, violated) = filter_violated_points(&mut problem, &distances);

        assert_eq!(removal.removed.len(), 2);
        assert_eq!(problem.num_nodes(), 3);
        assert_eq!(
            violated,
            vec![
                ViolatedPoint {
                    order: String::from("1-0"),
                    coordinates: [10.001, 106.0]
                },
                ViolatedPoint {
                    order: String::from("1-1"),
                    coordinates: [11.0, 106.0]
                }
            ]
        );

        let remaining: Vec<f64> = removal
            .retained
            .iter()
            .map(|index| distances[index.get()])
            .collect();
        let (second, violated_again) = filter_violated_points(&mut problem, &remaining);

        assert!(second.is_empty());
        assert!(violated_again.is_empty());
        assert_eq!(problem.num_nodes(), 3);
    }

    #[test]
    fn test_unbounded_distance_removes_nothing() {
        let mut problem = create_problem(
            (10.0, 106.0),
            vec![vec![(10.001, 106.0), (12.0, 106.0)]],
            |_| {},
        );

        let (removal, violated) = filter_violated_points(&mut problem, &[0.0, 1.0, 1e9]);

        assert!(removal.is_empty());
        assert!(violated.is_empty());
        assert_eq!(problem.num_nodes(), 3);
    }
}

use std::sync::Arc;

use courier_matrix_providers::{
    cache::MatricesCache, geodesic::geodesic_distance, travel_matrix_client::TravelMatrixClient,
    travel_matrix_provider::TravelMatrixProvider,
};
use tracing::{debug, info, instrument};

use crate::{
    distance::{
        distance_matrix::{ClusterCostParams, DistanceMatrix},
        violated_points::{ViolatedPoint, filter_violated_points},
    },
    error::{Error, ValidationError},
    problem::{distance_calculation::DistanceCalculation, routing_problem::RoutingProblem},
};

#[derive(Debug, Clone)]
pub struct DistanceParams {
    /// Hard limit of the matrix service, larger requests are rejected.
    pub matrix_service_max_nodes: usize,
    /// Above this node count `auto` falls back to geodesic distances.
    pub auto_matrix_service_max_nodes: usize,
    pub cluster: ClusterCostParams,
}

impl Default for DistanceParams {
    fn default() -> Self {
        DistanceParams {
            matrix_service_max_nodes: 100,
            auto_matrix_service_max_nodes: 100,
            cluster: ClusterCostParams::default(),
        }
    }
}

pub struct DistanceOutcome {
    pub matrix: Arc<DistanceMatrix>,
    pub violated_points: Vec<ViolatedPoint>,
}

pub struct DistanceProvider<'a, C> {
    client: &'a TravelMatrixClient<C>,
    params: &'a DistanceParams,
}

impl<'a, C> DistanceProvider<'a, C>
where
    C: MatricesCache,
{
    pub fn new(client: &'a TravelMatrixClient<C>, params: &'a DistanceParams) -> Self {
        Self { client, params }
    }

    pub fn resolve_provider(
        &self,
        calculation: DistanceCalculation,
        num_nodes: usize,
    ) -> Result<TravelMatrixProvider, ValidationError> {
        match calculation {
            DistanceCalculation::Geodesic => Ok(TravelMatrixProvider::Geodesic),
            DistanceCalculation::MatrixService => {
                if num_nodes > self.params.matrix_service_max_nodes {
                    return Err(ValidationError::TooManyNodes {
                        nodes: num_nodes,
                        limit: self.params.matrix_service_max_nodes,
                    });
                }

                if !self.client.has_matrix_service() {
                    return Err(ValidationError::MatrixServiceUnavailable);
                }

                Ok(TravelMatrixProvider::OsrmTable)
            }
            DistanceCalculation::Auto => {
                let limit = self
                    .params
                    .auto_matrix_service_max_nodes
                    .min(self.params.matrix_service_max_nodes);

                if self.client.has_matrix_service() && num_nodes <= limit {
                    Ok(TravelMatrixProvider::OsrmTable)
                } else {
                    Ok(TravelMatrixProvider::Geodesic)
                }
            }
        }
    }

    /// Builds the frozen matrix of the problem, removing the nodes that are out
    /// of reach from the depot first.
    #[instrument(skip_all, fields(nodes = problem.num_nodes()))]
    pub async fn build(&self, problem: &mut RoutingProblem) -> Result<DistanceOutcome, Error> {
        let provider = self.resolve_provider(problem.distance_calculation(), problem.num_nodes())?;
        info!(?provider, "Building distance matrix");

        let (matrices, violated_points) = match provider {
            TravelMatrixProvider::Geodesic => {
                let violated_points = if problem.has_max_distance() {
                    let depot = *problem.node(problem.depot()).location();
                    let depot_distances: Vec<f64> = problem
                        .nodes()
                        .iter()
                        .map(|node| geodesic_distance(&depot, node.location()))
                        .collect();

                    filter_violated_points(problem, &depot_distances).1
                } else {
                    vec![]
                };

                let matrices = self.client.fetch_matrix(problem.nodes(), provider).await?;
                (matrices, violated_points)
            }
            TravelMatrixProvider::OsrmTable => {
                let mut matrices = self.client.fetch_matrix(problem.nodes(), provider).await?;

                let depot_distances = matrices.row(problem.depot().get()).to_vec();
                let (removal, violated_points) = filter_violated_points(problem, &depot_distances);

                if !removal.is_empty() {
                    let retained: Vec<usize> =
                        removal.retained.iter().map(|index| index.get()).collect();
                    matrices = matrices.project(&retained);
                }

                (matrices, violated_points)
            }
        };

        debug!(
            nodes = problem.num_nodes(),
            violated = violated_points.len(),
            "Violated points filtered"
        );

        let matrix = DistanceMatrix::new(&matrices, problem.transport_mode())
            .with_cluster_cost(self.params.cluster);

        if matrix.is_cluster_mode() {
            info!("Cluster mode enabled for {} nodes", matrix.num_nodes());
        }

        Ok(DistanceOutcome {
            matrix: Arc::new(matrix),
            violated_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use courier_matrix_providers::travel_matrices::TravelMatrices;

    use super::*;
    use crate::{
        problem::{node::NodeIdx, transport_mode::TransportMode},
        test_utils::{CannedMatricesCache, create_problem, service_client},
    };

    fn idx(index: usize) -> NodeIdx {
        NodeIdx::new(index)
    }

    #[test]
    fn test_resolve_provider() {
        let params = DistanceParams::default();
        let no_service = TravelMatrixClient::default();
        let provider = DistanceProvider::new(&no_service, &params);

        assert_eq!(
            provider.resolve_provider(DistanceCalculation::Geodesic, 500),
            Ok(TravelMatrixProvider::Geodesic)
        );
        assert_eq!(
            provider.resolve_provider(DistanceCalculation::MatrixService, 10),
            Err(ValidationError::MatrixServiceUnavailable)
        );
        assert_eq!(
            provider.resolve_provider(DistanceCalculation::Auto, 10),
            Ok(TravelMatrixProvider::Geodesic)
        );

        let with_service = service_client(CannedMatricesCache::empty());
        let provider = DistanceProvider::new(&with_service, &params);

        assert_eq!(
            provider.resolve_provider(DistanceCalculation::MatrixService, 101),
            Err(ValidationError::TooManyNodes {
                nodes: 101,
                limit: 100
            })
        );
        assert_eq!(
            provider.resolve_provider(DistanceCalculation::Auto, 100),
            Ok(TravelMatrixProvider::OsrmTable)
        );
        assert_eq!(
            provider.resolve_provider(DistanceCalculation::Auto, 101),
            Ok(TravelMatrixProvider::Geodesic)
        );
    }

    #[tokio::test]
    async fn test_geodesic_filters_before_building() {
        let mut problem = create_problem(
            (10.0, 106.0),
            vec![
                vec![(10.001, 106.0), (10.002, 106.0)],
                vec![(10.001, 106.0), (10.5, 106.0)],
            ],
            |builder| {
                builder
                    .set_max_distance(10_000.0)
                    .set_transport_mode(TransportMode::RoundTrip);
            },
        );

        let client = TravelMatrixClient::default();
        let params = DistanceParams::default();
        let outcome = DistanceProvider::new(&client, &params)
            .build(&mut problem)
            .await
            .unwrap();

        assert_eq!(outcome.violated_points.len(), 2);
        assert_eq!(outcome.violated_points[1].order, "1-1");
        assert_eq!(problem.num_nodes(), 3);
        assert_eq!(outcome.matrix.num_nodes(), 3);
        assert!(outcome.matrix.travel_distance(idx(0), idx(2)) > 200.0);
    }

    #[tokio::test]
    async fn test_service_matrix_is_projected_after_filtering() {
        let mut problem = create_problem(
            (10.0, 106.0),
            vec![
                vec![(10.001, 106.0), (10.002, 106.0)],
                vec![(10.003, 106.0), (10.004, 106.0)],
            ],
            |builder| {
                builder
                    .set_max_distance(1_000.0)
                    .set_distance_calculation(DistanceCalculation::MatrixService);
            },
        );

        let canned = TravelMatrices::from_rows(vec![
            vec![0.0, 100.0, 200.0, 300.0, 5000.0],
            vec![100.0, 0.0, 110.0, 120.0, 130.0],
            vec![200.0, 110.0, 0.0, 140.0, 150.0],
            vec![300.0, 120.0, 140.0, 0.0, 160.0],
            vec![400.0, 130.0, 150.0, 160.0, 0.0],
        ]);
        let client = service_client(CannedMatricesCache::new(canned));
        let params = DistanceParams::default();

        let outcome = DistanceProvider::new(&client, &params)
            .build(&mut problem)
            .await
            .unwrap();

        assert_eq!(outcome.violated_points.len(), 2);
        assert_eq!(problem.num_nodes(), 3);
        assert_eq!(outcome.matrix.num_nodes(), 3);
        assert_eq!(outcome.matrix.travel_distance(idx(0), idx(2)), 200.0);
        assert_eq!(outcome.matrix.travel_distance(idx(1), idx(2)), 110.0);
        // outbound-only by default
        assert_eq!(outcome.matrix.travel_distance(idx(2), idx(0)), 0.0);
    }
}

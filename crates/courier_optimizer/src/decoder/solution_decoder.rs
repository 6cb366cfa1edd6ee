use tracing::debug;

use crate::{
    decoder::{
        decoded_route::{DecodedRoute, DecodedSolution, RouteStop, RouteViolation},
        result_mode::ResultMode,
    },
    distance::{distance_matrix::DistanceMatrix, violated_points::ViolatedPoint},
    model::{
        dimension::Evaluator,
        evaluators::{cod_evaluator, collected_evaluator, load_evaluator},
    },
    problem::{node::NodeIdx, routing_problem::RoutingProblem, transport_mode::TransportMode},
    solver::assignment::{Assignment, VehicleRoute},
};

/// Walks an assignment with the evaluators of the model and splits the
/// routes into compliant and violated ones.
pub struct SolutionDecoder<'a> {
    problem: &'a RoutingProblem,
    matrix: &'a DistanceMatrix,
    result_mode: ResultMode,
    load: Evaluator,
    collected: Evaluator,
    cod: Evaluator,
}

impl<'a> SolutionDecoder<'a> {
    pub fn new(
        problem: &'a RoutingProblem,
        matrix: &'a DistanceMatrix,
        result_mode: ResultMode,
    ) -> Self {
        SolutionDecoder {
            problem,
            matrix,
            result_mode,
            load: load_evaluator(problem),
            collected: collected_evaluator(problem),
            cod: cod_evaluator(problem),
        }
    }

    pub fn decode(
        &self,
        assignment: &Assignment,
        violated_points: Vec<ViolatedPoint>,
    ) -> DecodedSolution {
        let mut solution = DecodedSolution::without_routes(violated_points);

        for route in assignment.used_routes() {
            let decoded = self.decode_route(route);
            debug!(
                vehicle = decoded.vehicle,
                distance = decoded.distance,
                parcels = decoded.parcels,
                peak_load = decoded.peak_load,
                peak_cod = decoded.peak_cod,
                violations = ?decoded.violations,
                "Decoded route"
            );

            if decoded.is_compliant() {
                solution.cluster.push(decoded);
            } else {
                solution.violated_cluster.push(decoded);
            }
        }

        solution
    }

    pub fn decode_route(&self, route: &VehicleRoute) -> DecodedRoute {
        let depot = self.problem.depot();
        let mut path = Vec::with_capacity(route.visits.len() + 2);
        path.push(depot);
        path.extend_from_slice(&route.visits);
        path.push(depot);

        let mut distance = 0.0;
        let mut load = 0.0;
        let mut peak_load: f64 = 0.0;
        let mut parcels = 0.0;
        let mut cod = 0.0;
        let mut peak_cod: f64 = 0.0;

        for arc in path.windows(2) {
            let (from, to) = (arc[0], arc[1]);

            distance += self.matrix.travel_distance(from, to);
            load += (self.load)(from, to);
            parcels += (self.collected)(from, to);
            cod += (self.cod)(from, to);

            peak_load = peak_load.max(load);
            peak_cod = peak_cod.max(cod);
        }

        let mut violations = vec![];

        if self.problem.has_max_distance() && distance > self.problem.max_distance() {
            violations.push(RouteViolation::MaximumDistance);
        }

        if let Some(min_parcels) = self.problem.min_parcels()
            && parcels < min_parcels.value
        {
            violations.push(RouteViolation::MinimumParcels);
        }

        if peak_load > self.problem.vehicle_capacity() {
            violations.push(RouteViolation::Capacity);
        }

        if let Some(max_cod) = self.problem.max_cod()
            && peak_cod > max_cod
        {
            violations.push(RouteViolation::Cod);
        }

        DecodedRoute {
            vehicle: route.vehicle,
            stops: self.project(&route.visits),
            distance,
            parcels,
            peak_load,
            peak_cod,
            violations,
        }
    }

    fn project(&self, visits: &[NodeIdx]) -> Vec<RouteStop> {
        match self.result_mode {
            ResultMode::Orders => visits
                .iter()
                .filter_map(|&node| self.problem.node(node).order_ref())
                .map(|order_ref| RouteStop::Order(order_ref.to_string()))
                .collect(),
            ResultMode::Coordinates => {
                let transport_mode = self.problem.transport_mode();
                let depot = RouteStop::Coordinates(
                    self.problem.node(self.problem.depot()).location().lat_lon(),
                );

                let mut stops = Vec::with_capacity(visits.len() + 2);
                if transport_mode != TransportMode::InboundOnly {
                    stops.push(depot.clone());
                }

                stops.extend(visits.iter().map(|&node| {
                    RouteStop::Coordinates(self.problem.node(node).location().lat_lon())
                }));

                if transport_mode != TransportMode::OutboundOnly {
                    stops.push(depot);
                }

                stops
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{location::Location, routing_problem::RoutingProblemBuilder},
        test_utils::{create_problem, geodesic_matrix},
    };

    fn visits(indices: &[usize]) -> Vec<NodeIdx> {
        indices.iter().map(|&index| NodeIdx::new(index)).collect()
    }

    fn three_orders(
        configure: impl FnOnce(&mut RoutingProblemBuilder),
    ) -> RoutingProblem {
        create_problem(
            (10.0, 106.0),
            vec![
                vec![(10.01, 106.0), (10.02, 106.0)],
                vec![(10.01, 106.0), (10.03, 106.0)],
                vec![(10.01, 106.0), (10.04, 106.0)],
            ],
            configure,
        )
    }

    #[test]
    fn test_totals_match_per_arc_sums() {
        let problem = three_orders(|builder| {
            builder
                .set_transport_mode(TransportMode::RoundTrip)
                .set_max_cod(1_000.0);
        });
        let matrix = geodesic_matrix(&problem);
        let decoder = SolutionDecoder::new(&problem, &matrix, ResultMode::Orders);

        let route = VehicleRoute {
            vehicle: 0,
            visits: visits(&[1, 3, 2, 4, 5, 6]),
        };
        let decoded = decoder.decode_route(&route);

        let path = [0, 1, 3, 2, 4, 5, 6, 0];
        let resummed: f64 = path
            .windows(2)
            .map(|arc| matrix.travel_distance(NodeIdx::new(arc[0]), NodeIdx::new(arc[1])))
            .sum();

        assert!((decoded.distance - resummed).abs() < 1e-9);
        assert_eq!(decoded.parcels, 3.0);
        assert_eq!(decoded.peak_load, 2.0);
        assert_eq!(decoded.peak_cod, 200.0);
        assert!(decoded.is_compliant());
    }

    #[test]
    fn test_classification() {
        let problem = three_orders(|builder| {
            builder
                .set_max_distance(3_000.0)
                .set_vehicle_capacity(1.0)
                .set_max_cod(150.0)
                .set_min_parcels(4.0);
        });
        let matrix = geodesic_matrix(&problem);
        let decoder = SolutionDecoder::new(&problem, &matrix, ResultMode::Orders);

        let decoded = decoder.decode_route(&VehicleRoute {
            vehicle: 1,
            visits: visits(&[1, 3, 5, 2, 4, 6]),
        });

        assert_eq!(
            decoded.violations,
            vec![
                RouteViolation::MaximumDistance,
                RouteViolation::MinimumParcels,
                RouteViolation::Capacity,
                RouteViolation::Cod
            ]
        );
    }

    #[test]
    fn test_decode_splits_routes_and_keeps_violated_points() {
        let problem = three_orders(|builder| {
            builder.set_vehicle_num(2).set_vehicle_capacity(1.0);
        });
        let matrix = geodesic_matrix(&problem);
        let decoder = SolutionDecoder::new(&problem, &matrix, ResultMode::Orders);

        let assignment =
            Assignment::from_visits(vec![visits(&[1, 2, 3, 4]), visits(&[5, 3]), vec![]], 0.0);
        let violated = vec![ViolatedPoint {
            order: String::from("7-1"),
            coordinates: [11.0, 107.0],
        }];

        let solution = decoder.decode(&assignment, violated.clone());

        assert_eq!(solution.cluster.len(), 1);
        assert_eq!(solution.violated_cluster.len(), 1);
        assert_eq!(solution.violated_cluster[0].vehicle, 1);
        assert_eq!(solution.violated_points, violated);
        assert_eq!(
            solution.cluster[0].stops,
            vec![
                RouteStop::Order(String::from("0-0")),
                RouteStop::Order(String::from("0-1")),
                RouteStop::Order(String::from("1-0")),
                RouteStop::Order(String::from("1-1")),
            ]
        );
    }

    #[test]
    fn test_coordinates_projection_per_transport_mode() {
        let route = VehicleRoute {
            vehicle: 0,
            visits: visits(&[1, 2]),
        };
        let depot = RouteStop::Coordinates([10.0, 106.0]);

        for (mode, depot_first, depot_last) in [
            (TransportMode::OutboundOnly, true, false),
            (TransportMode::InboundOnly, false, true),
            (TransportMode::RoundTrip, true, true),
        ] {
            let problem = three_orders(|builder| {
                builder.set_transport_mode(mode);
            });
            let matrix = geodesic_matrix(&problem);
            let decoder = SolutionDecoder::new(&problem, &matrix, ResultMode::Coordinates);

            let stops = decoder.decode_route(&route).stops;

            assert_eq!(stops.len(), 2 + depot_first as usize + depot_last as usize);
            assert_eq!(stops.first() == Some(&depot), depot_first, "{mode}");
            assert_eq!(stops.last() == Some(&depot), depot_last, "{mode}");
            assert!(stops.contains(&RouteStop::Coordinates([10.02, 106.0])));
        }
    }

    #[test]
    fn test_point_routes_sum_flat_parcels() {
        let mut builder = RoutingProblemBuilder::default();
        builder
            .set_depot(Location::from_lat_lon(10.0, 106.0))
            .set_vehicle_num(1)
            .set_min_parcels(6.0)
            .set_points(
                [(10.01, 3.0), (10.02, 2.0)]
                    .into_iter()
                    .map(|(lat, parcels)| {
                        Location::from_lat_lon(lat, 106.0).with_parcels(parcels)
                    })
                    .collect(),
            );
        let problem = builder.build().unwrap();
        let matrix = geodesic_matrix(&problem);
        let decoder = SolutionDecoder::new(&problem, &matrix, ResultMode::Orders);

        let decoded = decoder.decode_route(&VehicleRoute {
            vehicle: 0,
            visits: visits(&[2, 1]),
        });

        assert_eq!(
            decoded.stops,
            vec![
                RouteStop::Order(String::from("1-0")),
                RouteStop::Order(String::from("0-0")),
            ]
        );
        assert_eq!(decoded.parcels, 5.0);
        assert_eq!(decoded.peak_load, 5.0);
        assert_eq!(decoded.violations, vec![RouteViolation::MinimumParcels]);
    }
}

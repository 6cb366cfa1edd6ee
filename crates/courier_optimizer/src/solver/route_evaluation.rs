use crate::{
    model::{dimension::EndLowerBound, routing_model::RoutingModel},
    problem::node::NodeIdx,
    solver::score::Score,
};

/// Scores the route of one vehicle. Returns `None` when a hard dimension leaves
/// its `[0, capacity]` band. Unused vehicles cost nothing.
pub fn evaluate_route(model: &RoutingModel, visits: &[NodeIdx]) -> Option<Score> {
    if visits.is_empty() {
        return Some(Score::ZERO);
    }

    let path = model.path(visits);

    let travel_cost: f64 = path
        .windows(2)
        .map(|arc| model.arc_cost(arc[0], arc[1]))
        .sum();

    let mut score = Score::soft(travel_cost + model.hints().fixed_vehicle_cost);

    for dimension in model.dimensions() {
        let trace = dimension.trace(&path);
        if !dimension.within_capacity(&trace) {
            return None;
        }

        if let Some(bound) = dimension.soft_upper_bound() {
            score += Score::soft(bound.excess_cost(trace.peak));
        }

        match dimension.end_lower_bound() {
            Some(EndLowerBound::Hard(value)) => {
                score += Score::hard((value - trace.end).max(0.0));
            }
            Some(EndLowerBound::Soft(bound)) => {
                score += Score::soft(bound.deficit_cost(trace.end));
            }
            None => {}
        }
    }

    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            constraint_model_builder::{ConstraintModelBuilder, ModelParams},
            routing_model::ConstraintMode,
        },
        problem::{min_parcels::BoundPolicy, transport_mode::TransportMode},
        test_utils::{create_problem, geodesic_matrix},
    };

    fn idx(indices: &[usize]) -> Vec<NodeIdx> {
        indices.iter().map(|&index| NodeIdx::new(index)).collect()
    }

    #[test]
    fn test_empty_route_is_free() {
        let problem = create_problem(
            (10.0, 106.0),
            vec![vec![(10.01, 106.0), (10.02, 106.0)]],
            |builder| {
                builder.set_min_vehicles(true).set_min_parcels(5.0);
            },
        );
        let params = ModelParams::default();
        let model = ConstraintModelBuilder::new(&problem, geodesic_matrix(&problem), &params)
            .build(ConstraintMode::Hard);

        assert_eq!(evaluate_route(&model, &[]), Some(Score::ZERO));
    }

    #[test]
    fn test_hard_capacity_rejects_route() {
        let problem = create_problem(
            (10.0, 106.0),
            vec![
                vec![(10.01, 106.0), (10.02, 106.0)],
                vec![(10.01, 106.0), (10.03, 106.0)],
            ],
            |builder| {
                builder.set_vehicle_capacity(1.0);
            },
        );
        let params = ModelParams::default();
        let builder = ConstraintModelBuilder::new(&problem, geodesic_matrix(&problem), &params);
        let hard = builder.build(ConstraintMode::Hard);

        assert!(evaluate_route(&hard, &idx(&[1, 2, 3, 4])).is_some());
        assert!(evaluate_route(&hard, &idx(&[1, 3, 2, 4])).is_none());

        let soft = builder.build(ConstraintMode::Soft);
        let sequential = evaluate_route(&soft, &idx(&[1, 2, 3, 4])).unwrap();
        let stacked = evaluate_route(&soft, &idx(&[1, 3, 2, 4])).unwrap();

        // stacking saves about 2.2 km but pays 10_000 for the extra parcel
        assert!(!stacked.is_failure());
        assert!(stacked.soft_score > 10_000.0);
        assert!(stacked.soft_score > sequential.soft_score);
    }

    #[test]
    fn test_hard_floor_is_a_hard_score() {
        let problem = create_problem(
            (10.0, 106.0),
            vec![vec![(10.01, 106.0), (10.02, 106.0)]],
            |builder| {
                builder
                    .set_min_parcels(3.0)
                    .set_min_parcels_policy(BoundPolicy::Hard);
            },
        );
        let params = ModelParams::default();
        let builder = ConstraintModelBuilder::new(&problem, geodesic_matrix(&problem), &params);

        let hard = evaluate_route(&builder.build(ConstraintMode::Hard), &idx(&[1, 2])).unwrap();
        assert_eq!(hard.hard_score, 2.0);

        let soft = evaluate_route(&builder.build(ConstraintMode::Soft), &idx(&[1, 2])).unwrap();
        assert_eq!(soft.hard_score, 0.0);
        assert!(soft.soft_score >= 2.0 * 10_000_000.0);
    }

    #[test]
    fn test_travel_cost_follows_masking() {
        let problem = create_problem(
            (10.0, 106.0),
            vec![vec![(10.01, 106.0), (10.02, 106.0)]],
            |builder| {
                builder.set_transport_mode(TransportMode::RoundTrip);
            },
        );
        let params = ModelParams::default();
        let round_trip = ConstraintModelBuilder::new(&problem, geodesic_matrix(&problem), &params)
            .build(ConstraintMode::Hard);

        let outbound = create_problem(
            (10.0, 106.0),
            vec![vec![(10.01, 106.0), (10.02, 106.0)]],
            |_| {},
        );
        let outbound_model =
            ConstraintModelBuilder::new(&outbound, geodesic_matrix(&outbound), &params)
                .build(ConstraintMode::Hard);

        let full = evaluate_route(&round_trip, &idx(&[1, 2])).unwrap();
        let open = evaluate_route(&outbound_model, &idx(&[1, 2])).unwrap();

        // the return leg is about 2.2 km
        assert!(full.soft_score - open.soft_score > 2_000.0);
    }
}

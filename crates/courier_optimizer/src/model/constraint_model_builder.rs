use std::sync::Arc;

use tracing::debug;

use crate::{
    distance::distance_matrix::DistanceMatrix,
    model::{
        dimension::{Dimension, DimensionKind, EndLowerBound, SoftBound, UNBOUNDED},
        evaluators::{
            arc_cost_evaluator, cod_evaluator, collected_evaluator, distance_evaluator,
            load_evaluator,
        },
        routing_model::{ConstraintMode, ObjectiveHints, RoutingModel},
    },
    problem::{
        load_model::LoadModel,
        min_parcels::{BoundPolicy, MinParcels},
        routing_problem::RoutingProblem,
    },
};

#[derive(Debug, Clone)]
pub struct ModelParams {
    pub distance_soft_penalty: f64,
    pub capacity_soft_penalty: f64,
    /// Floor penalty when the distance is unbounded, the floor dominates the objective.
    pub min_parcels_unbounded_penalty: f64,
    pub min_parcels_bounded_penalty: f64,
    /// Fixed vehicle cost when the fleet can exactly absorb the floor.
    pub dominant_vehicle_cost: f64,
    pub hard_vehicle_cost: f64,
    pub soft_vehicle_cost: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            distance_soft_penalty: 10_000.0,
            capacity_soft_penalty: 10_000.0,
            min_parcels_unbounded_penalty: 10_000_000.0,
            min_parcels_bounded_penalty: 10_000.0,
            dominant_vehicle_cost: 1_000_000.0,
            hard_vehicle_cost: 10_000.0,
            soft_vehicle_cost: 100.0,
        }
    }
}

/// Declares the dimensions and pairing of a frozen problem, hard or soft.
pub struct ConstraintModelBuilder<'a> {
    problem: &'a RoutingProblem,
    matrix: Arc<DistanceMatrix>,
    params: &'a ModelParams,
}

impl<'a> ConstraintModelBuilder<'a> {
    pub fn new(
        problem: &'a RoutingProblem,
        matrix: Arc<DistanceMatrix>,
        params: &'a ModelParams,
    ) -> Self {
        Self {
            problem,
            matrix,
            params,
        }
    }

    pub fn problem(&self) -> &RoutingProblem {
        self.problem
    }

    pub fn build(&self, mode: ConstraintMode) -> RoutingModel {
        let mut dimensions = Vec::with_capacity(4);

        if let Some(distance) = self.distance_dimension(mode) {
            dimensions.push(distance);
        }

        let mut parcels = self.parcels_dimension(mode);
        let floor = self.min_parcels_bound(mode);

        match (self.problem.load_model(), floor) {
            (LoadModel::Collected, Some(floor)) => {
                parcels = parcels.with_end_lower_bound(floor);
                dimensions.push(parcels);
            }
            (LoadModel::Paired, Some(floor)) => {
                dimensions.push(parcels);
                dimensions.push(
                    Dimension::new(
                        DimensionKind::Collected,
                        collected_evaluator(self.problem),
                        UNBOUNDED,
                    )
                    .with_end_lower_bound(floor),
                );
            }
            (_, None) => dimensions.push(parcels),
        }

        if let Some(max_cod) = self.problem.max_cod() {
            dimensions.push(Dimension::new(
                DimensionKind::Cod,
                cod_evaluator(self.problem),
                max_cod,
            ));
        }

        let jobs = self.problem.jobs().to_vec();
        let mut job_of_node = vec![None; self.problem.num_nodes()];
        for (index, job) in jobs.iter().enumerate() {
            for node in job.nodes() {
                job_of_node[node.get()] = Some(index);
            }
        }

        let hints = ObjectiveHints {
            fixed_vehicle_cost: self.fixed_vehicle_cost(mode),
        };

        debug!(
            ?mode,
            dimensions = ?dimensions.iter().map(|dimension| dimension.kind()).collect::<Vec<_>>(),
            fixed_vehicle_cost = hints.fixed_vehicle_cost,
            "Routing model built"
        );

        RoutingModel {
            mode,
            num_nodes: self.problem.num_nodes(),
            num_vehicles: self.problem.fleet_size(),
            depot: self.problem.depot(),
            arc_cost: arc_cost_evaluator(self.matrix.clone()),
            dimensions,
            jobs,
            job_of_node,
            hints,
        }
    }

    fn distance_dimension(&self, mode: ConstraintMode) -> Option<Dimension> {
        if !self.problem.has_max_distance() {
            return None;
        }

        let evaluator = distance_evaluator(self.matrix.clone());
        let max_distance = self.problem.max_distance();

        Some(match mode {
            ConstraintMode::Hard => Dimension::new(DimensionKind::Distance, evaluator, max_distance),
            ConstraintMode::Soft => Dimension::new(DimensionKind::Distance, evaluator, UNBOUNDED)
                .with_soft_upper_bound(SoftBound {
                    value: max_distance,
                    penalty: self.params.distance_soft_penalty,
                }),
        })
    }

    fn parcels_dimension(&self, mode: ConstraintMode) -> Dimension {
        let evaluator = load_evaluator(self.problem);
        let capacity = self.problem.vehicle_capacity();

        match mode {
            ConstraintMode::Hard => Dimension::new(DimensionKind::Parcels, evaluator, capacity),
            ConstraintMode::Soft => Dimension::new(DimensionKind::Parcels, evaluator, UNBOUNDED)
                .with_soft_upper_bound(SoftBound {
                    value: capacity,
                    penalty: self.params.capacity_soft_penalty,
                }),
        }
    }

    fn min_parcels_bound(&self, mode: ConstraintMode) -> Option<EndLowerBound> {
        let MinParcels { value, policy } = self.problem.min_parcels()?;

        let soft = SoftBound {
            value,
            penalty: if self.problem.has_max_distance() {
                self.params.min_parcels_bounded_penalty
            } else {
                self.params.min_parcels_unbounded_penalty
            },
        };

        Some(match (policy, mode) {
            (BoundPolicy::Hard, ConstraintMode::Hard) => EndLowerBound::Hard(value),
            _ => EndLowerBound::Soft(soft),
        })
    }

    fn fixed_vehicle_cost(&self, mode: ConstraintMode) -> f64 {
        if !self.problem.min_vehicles() {
            return 0.0;
        }

        let floor = self
            .problem
            .min_parcels()
            .map_or(0.0, |min_parcels| min_parcels.value);

        if self.problem.vehicle_num() as f64 * floor >= self.problem.num_nodes() as f64 {
            return self.params.dominant_vehicle_cost;
        }

        match mode {
            ConstraintMode::Hard => self.params.hard_vehicle_cost,
            ConstraintMode::Soft => self.params.soft_vehicle_cost,
        }
    }
}

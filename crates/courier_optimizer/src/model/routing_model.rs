use crate::{
    model::dimension::{Dimension, DimensionKind, Evaluator},
    problem::node::{Job, NodeIdx},
    solver::assignment::Assignment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintMode {
    Hard,
    /// Distance, capacity and the parcel floor become penalties.
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectiveHints {
    /// Cost added once for every vehicle that leaves the depot.
    pub fixed_vehicle_cost: f64,
}

/// Everything an engine needs to search: the graph size, the arc cost,
/// the dimensions to track and the jobs to serve.
#[derive(Clone)]
pub struct RoutingModel {
    pub(crate) mode: ConstraintMode,
    pub(crate) num_nodes: usize,
    pub(crate) num_vehicles: usize,
    pub(crate) depot: NodeIdx,
    pub(crate) arc_cost: Evaluator,
    pub(crate) dimensions: Vec<Dimension>,
    pub(crate) jobs: Vec<Job>,
    pub(crate) job_of_node: Vec<Option<usize>>,
    pub(crate) hints: ObjectiveHints,
}

impl RoutingModel {
    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    pub fn depot(&self) -> NodeIdx {
        self.depot
    }

    #[inline]
    pub fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        (self.arc_cost)(from, to)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, kind: DimensionKind) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.kind() == kind)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job_of(&self, node: NodeIdx) -> Option<&Job> {
        self.job_of_node
            .get(node.get())
            .copied()
            .flatten()
            .map(|index| &self.jobs[index])
    }

    pub fn hints(&self) -> &ObjectiveHints {
        &self.hints
    }

    /// Full route of a vehicle, from the depot back to the depot.
    pub fn path(&self, visits: &[NodeIdx]) -> Vec<NodeIdx> {
        let mut path = Vec::with_capacity(visits.len() + 2);
        path.push(self.depot);
        path.extend_from_slice(visits);
        path.push(self.depot);
        path
    }

    /// Every pair is served by one vehicle, pickup first.
    pub fn respects_pairing(&self, assignment: &Assignment) -> bool {
        let mut position: Vec<Option<(usize, usize)>> = vec![None; self.num_nodes];
        for route in &assignment.routes {
            for (index, node) in route.visits.iter().enumerate() {
                if let Some(slot) = position.get_mut(node.get()) {
                    *slot = Some((route.vehicle, index));
                }
            }
        }

        self.jobs.iter().filter_map(Job::pair).all(|pair| {
            match (position[pair.pickup.get()], position[pair.delivery.get()]) {
                (Some((pickup_vehicle, pickup_index)), Some((delivery_vehicle, delivery_index))) => {
                    pickup_vehicle == delivery_vehicle && pickup_index < delivery_index
                }
                _ => false,
            }
        })
    }

    /// Every non-depot node is visited exactly once and vehicles are in range.
    pub fn serves_all_nodes(&self, assignment: &Assignment) -> bool {
        let mut visited = vec![0usize; self.num_nodes];
        for route in &assignment.routes {
            if route.vehicle >= self.num_vehicles {
                return false;
            }

            for node in &route.visits {
                match visited.get_mut(node.get()) {
                    Some(count) if *node != self.depot => *count += 1,
                    _ => return false,
                }
            }
        }

        visited
            .iter()
            .enumerate()
            .all(|(index, &count)| index == self.depot.get() || count == 1)
    }
}

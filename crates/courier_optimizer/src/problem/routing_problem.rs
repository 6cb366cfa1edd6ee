use fxhash::FxHashMap;

use crate::{
    error::ValidationError,
    problem::{
        distance_calculation::DistanceCalculation,
        load_model::LoadModel,
        location::Location,
        min_parcels::{BoundPolicy, MinParcels},
        node::{DEPOT, Job, Node, NodeIdx, OrderRef, PickupDeliveryPair},
        order::Order,
        transport_mode::TransportMode,
    },
};

pub const DEFAULT_VEHICLE_CAPACITY: f64 = 20.0;
pub const DEFAULT_MATRIX_SERVICE_MAX_NODES: usize = 100;

/// Flat node graph of a request. Node 0 is the depot, followed by one
/// (pickup, delivery) pair per delivery leg or one stop per point.
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    vehicle_num: usize,
    nodes: Vec<Node>,
    jobs: Vec<Job>,
    distance_calculation: DistanceCalculation,
    transport_mode: TransportMode,
    load_model: LoadModel,
    vehicle_capacity: f64,
    max_distance: f64,
    max_cod: Option<f64>,
    min_parcels: Option<MinParcels>,
    min_vehicles: bool,
}

/// Outcome of [`RoutingProblem::remove_nodes`].
#[derive(Debug, Clone, Default)]
pub struct NodeRemoval {
    /// Removed nodes with their index before removal, in original order.
    pub removed: Vec<(NodeIdx, Node)>,
    /// For every node of the new graph, its index before removal.
    pub retained: Vec<NodeIdx>,
}

impl NodeRemoval {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

impl RoutingProblem {
    pub fn depot(&self) -> NodeIdx {
        DEPOT
    }

    pub fn vehicle_num(&self) -> usize {
        self.vehicle_num
    }

    /// Vehicles worth modelling. A used vehicle serves at least one job, so
    /// the requested fleet is capped at the number of jobs.
    pub fn fleet_size(&self) -> usize {
        self.vehicle_num.min(self.jobs.len().max(1))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIdx) -> &Node {
        &self.nodes[index]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    pub fn distance_calculation(&self) -> DistanceCalculation {
        self.distance_calculation
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn load_model(&self) -> LoadModel {
        self.load_model
    }

    pub fn vehicle_capacity(&self) -> f64 {
        self.vehicle_capacity
    }

    /// Zero means unbounded.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn has_max_distance(&self) -> bool {
        self.max_distance > 0.0
    }

    pub fn max_cod(&self) -> Option<f64> {
        self.max_cod
    }

    pub fn min_parcels(&self) -> Option<MinParcels> {
        self.min_parcels.filter(|min_parcels| min_parcels.is_active())
    }

    pub fn min_vehicles(&self) -> bool {
        self.min_vehicles
    }

    /// Removes the given nodes and the partner of every pair they belong to.
    /// The depot is never removed. Indices are remapped in a single stable pass.
    pub fn remove_nodes(&mut self, indices: &[NodeIdx]) -> NodeRemoval {
        let mut marked = vec![false; self.nodes.len()];
        for &index in indices {
            if index != DEPOT && index.get() < marked.len() {
                marked[index.get()] = true;
            }
        }

        for pair in self.jobs.iter().filter_map(Job::pair) {
            if marked[pair.pickup.get()] || marked[pair.delivery.get()] {
                marked[pair.pickup.get()] = true;
                marked[pair.delivery.get()] = true;
            }
        }

        if !marked.contains(&true) {
            return NodeRemoval {
                removed: vec![],
                retained: NodeIdx::range(self.nodes.len()).collect(),
            };
        }

        let mut remap: FxHashMap<NodeIdx, NodeIdx> = FxHashMap::default();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut removal = NodeRemoval::default();

        for (index, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            let index = NodeIdx::new(index);
            if marked[index.get()] {
                removal.removed.push((index, node));
            } else {
                remap.insert(index, NodeIdx::new(nodes.len()));
                removal.retained.push(index);
                nodes.push(node);
            }
        }

        self.nodes = nodes;
        self.jobs = self
            .jobs
            .iter()
            .filter_map(|job| match job {
                Job::Stop(node) => Some(Job::Stop(*remap.get(node)?)),
                Job::Pair(pair) => Some(Job::Pair(PickupDeliveryPair {
                    pickup: *remap.get(&pair.pickup)?,
                    delivery: *remap.get(&pair.delivery)?,
                })),
            })
            .collect();

        removal
    }
}

#[derive(Default)]
pub struct RoutingProblemBuilder {
    depot: Option<Location>,
    vehicle_num: Option<i64>,
    orders: Option<Vec<Order>>,
    points: Option<Vec<Location>>,
    max_distance: Option<f64>,
    vehicle_capacity: Option<f64>,
    max_cod: Option<f64>,
    min_parcels: Option<f64>,
    min_parcels_policy: BoundPolicy,
    load_model: LoadModel,
    min_vehicles: bool,
    distance_calculation: DistanceCalculation,
    transport_mode: TransportMode,
    matrix_service_max_nodes: Option<usize>,
}

impl RoutingProblemBuilder {
    pub fn set_depot(&mut self, depot: Location) -> &mut RoutingProblemBuilder {
        self.depot = Some(depot);
        self
    }

    pub fn set_vehicle_num(&mut self, vehicle_num: i64) -> &mut RoutingProblemBuilder {
        self.vehicle_num = Some(vehicle_num);
        self
    }

    pub fn set_orders(&mut self, orders: Vec<Order>) -> &mut RoutingProblemBuilder {
        self.orders = Some(orders);
        self
    }

    pub fn add_order(&mut self, order: Order) -> &mut RoutingProblemBuilder {
        self.orders.get_or_insert_with(Vec::new).push(order);
        self
    }

    /// Standalone stops with a flat parcel count, served without pairing.
    pub fn set_points(&mut self, points: Vec<Location>) -> &mut RoutingProblemBuilder {
        self.points = Some(points);
        self
    }

    pub fn set_matrix_service_max_nodes(&mut self, max_nodes: usize) -> &mut RoutingProblemBuilder {
        self.matrix_service_max_nodes = Some(max_nodes);
        self
    }

    pub fn set_max_distance(&mut self, max_distance: f64) -> &mut RoutingProblemBuilder {
        self.max_distance = Some(max_distance);
        self
    }

    pub fn set_vehicle_capacity(&mut self, capacity: f64) -> &mut RoutingProblemBuilder {
        self.vehicle_capacity = Some(capacity);
        self
    }

    pub fn set_max_cod(&mut self, max_cod: f64) -> &mut RoutingProblemBuilder {
        self.max_cod = Some(max_cod);
        self
    }

    pub fn set_min_parcels(&mut self, min_parcels: f64) -> &mut RoutingProblemBuilder {
        self.min_parcels = Some(min_parcels);
        self
    }

    pub fn set_min_parcels_policy(&mut self, policy: BoundPolicy) -> &mut RoutingProblemBuilder {
        self.min_parcels_policy = policy;
        self
    }

    pub fn set_load_model(&mut self, load_model: LoadModel) -> &mut RoutingProblemBuilder {
        self.load_model = load_model;
        self
    }

    pub fn set_min_vehicles(&mut self, min_vehicles: bool) -> &mut RoutingProblemBuilder {
        self.min_vehicles = min_vehicles;
        self
    }

    pub fn set_distance_calculation(
        &mut self,
        distance_calculation: DistanceCalculation,
    ) -> &mut RoutingProblemBuilder {
        self.distance_calculation = distance_calculation;
        self
    }

    pub fn set_transport_mode(
        &mut self,
        transport_mode: TransportMode,
    ) -> &mut RoutingProblemBuilder {
        self.transport_mode = transport_mode;
        self
    }

    pub fn build(self) -> Result<RoutingProblem, ValidationError> {
        let depot = self.depot.ok_or(ValidationError::MissingField("depot"))?;
        let vehicle_num = self
            .vehicle_num
            .ok_or(ValidationError::MissingField("vehicle_num"))?;
        let (orders, points) = match (self.orders, self.points) {
            (Some(_), Some(_)) => return Err(ValidationError::Conflicting("orders", "points")),
            (Some(orders), None) => (orders, vec![]),
            (None, Some(points)) => (vec![], points),
            (None, None) => return Err(ValidationError::MissingField("orders")),
        };

        if vehicle_num <= 0 {
            return Err(ValidationError::NonPositive("vehicle_num"));
        }

        let vehicle_capacity = self.vehicle_capacity.unwrap_or(DEFAULT_VEHICLE_CAPACITY);
        if !vehicle_capacity.is_finite() || vehicle_capacity <= 0.0 {
            return Err(ValidationError::NonPositive("vehicle_capacity"));
        }

        if let Some(max_cod) = self.max_cod
            && (!max_cod.is_finite() || max_cod <= 0.0)
        {
            return Err(ValidationError::NonPositive("max_cod"));
        }

        let max_distance = self.max_distance.unwrap_or(0.0);
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(ValidationError::Negative("max_distance"));
        }

        let min_parcels = self.min_parcels.unwrap_or(0.0);
        if !min_parcels.is_finite() || min_parcels < 0.0 {
            return Err(ValidationError::Negative("min_parcels"));
        }

        depot.validate()?;

        let num_legs: usize = orders.iter().map(Order::num_legs).sum();
        let num_nodes = 1 + 2 * num_legs + points.len();

        let max_nodes = self
            .matrix_service_max_nodes
            .unwrap_or(DEFAULT_MATRIX_SERVICE_MAX_NODES);
        if self.distance_calculation == DistanceCalculation::MatrixService && num_nodes > max_nodes
        {
            return Err(ValidationError::TooManyNodes {
                nodes: num_nodes,
                limit: max_nodes,
            });
        }

        let mut nodes = Vec::with_capacity(num_nodes);
        let mut jobs = Vec::with_capacity(num_legs + points.len());

        nodes.push(Node::depot(depot));

        for (order_index, order) in orders.iter().enumerate() {
            if order.num_legs() == 0 {
                return Err(ValidationError::InvalidOrder(order_index));
            }

            order.pickup().validate()?;

            for (pickup, delivery) in order.flatten(order_index) {
                delivery.location().validate()?;

                let pickup_index = NodeIdx::new(nodes.len());
                nodes.push(pickup);
                let delivery_index = NodeIdx::new(nodes.len());
                nodes.push(delivery);

                jobs.push(Job::Pair(PickupDeliveryPair {
                    pickup: pickup_index,
                    delivery: delivery_index,
                }));
            }
        }

        for (point_index, location) in points.into_iter().enumerate() {
            location.validate()?;

            jobs.push(Job::Stop(NodeIdx::new(nodes.len())));
            nodes.push(Node::stop(
                location,
                OrderRef {
                    order: point_index,
                    leg: 0,
                },
            ));
        }

        Ok(RoutingProblem {
            vehicle_num: usize::try_from(vehicle_num).unwrap_or(usize::MAX),
            nodes,
            jobs,
            distance_calculation: self.distance_calculation,
            transport_mode: self.transport_mode,
            load_model: self.load_model,
            vehicle_capacity,
            max_distance,
            max_cod: self.max_cod,
            min_parcels: Some(MinParcels::new(min_parcels, self.min_parcels_policy)),
            min_vehicles: self.min_vehicles,
        })
    }
}

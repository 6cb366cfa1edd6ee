use crate::problem::{
    location::Location,
    node::{Node, OrderRef},
};

/// A pickup location and one or more delivery locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pickup: Location,
    deliveries: Vec<Location>,
}

impl Order {
    pub fn new(pickup: Location, deliveries: Vec<Location>) -> Self {
        Order { pickup, deliveries }
    }

    /// First location is the pickup, the rest are deliveries.
    pub fn from_locations(mut locations: Vec<Location>) -> Option<Self> {
        if locations.len() < 2 {
            return None;
        }

        let deliveries = locations.split_off(1);
        Some(Order {
            pickup: locations[0],
            deliveries,
        })
    }

    pub fn pickup(&self) -> &Location {
        &self.pickup
    }

    pub fn deliveries(&self) -> &[Location] {
        &self.deliveries
    }

    pub fn num_legs(&self) -> usize {
        self.deliveries.len()
    }

    /// Emits one (pickup, delivery) node pair per delivery leg. Each synthetic
    /// pickup sits at the pickup coordinates and carries the leg's cash and parcels,
    /// so every pair can be routed on its own.
    pub fn flatten(&self, order: usize) -> impl Iterator<Item = (Node, Node)> + '_ {
        self.deliveries
            .iter()
            .enumerate()
            .map(move |(index, delivery)| {
                let pickup = Location::from_lat_lon(self.pickup.lat(), self.pickup.lon())
                    .with_cod(delivery.cod())
                    .with_parcels(delivery.parcels());

                (
                    Node::pickup(pickup, OrderRef { order, leg: 0 }),
                    Node::delivery(
                        *delivery,
                        OrderRef {
                            order,
                            leg: index + 1,
                        },
                    ),
                )
            })
    }
}

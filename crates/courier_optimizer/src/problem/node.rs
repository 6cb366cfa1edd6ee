use std::fmt::Display;

use crate::{define_index_newtype, problem::location::Location};

define_index_newtype!(NodeIdx, Node);

pub const DEPOT: NodeIdx = NodeIdx::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Depot,
    Pickup,
    Delivery,
    /// A point visited on its own, with no partner.
    Stop,
}

/// Back reference from a node to the order it was generated from.
/// Leg 0 is the pickup, legs 1.. are the deliveries. A standalone point is
/// referenced by its index in the request's point list and leg 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderRef {
    pub order: usize,
    pub leg: usize,
}

impl Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.order, self.leg)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    location: Location,
    role: NodeRole,
    order_ref: Option<OrderRef>,
}

impl Node {
    pub fn depot(location: Location) -> Self {
        Node {
            location,
            role: NodeRole::Depot,
            order_ref: None,
        }
    }

    pub fn pickup(location: Location, order_ref: OrderRef) -> Self {
        Node {
            location,
            role: NodeRole::Pickup,
            order_ref: Some(order_ref),
        }
    }

    pub fn delivery(location: Location, order_ref: OrderRef) -> Self {
        Node {
            location,
            role: NodeRole::Delivery,
            order_ref: Some(order_ref),
        }
    }

    pub fn stop(location: Location, order_ref: OrderRef) -> Self {
        Node {
            location,
            role: NodeRole::Stop,
            order_ref: Some(order_ref),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn order_ref(&self) -> Option<OrderRef> {
        self.order_ref
    }

    pub fn is_depot(&self) -> bool {
        self.role == NodeRole::Depot
    }

    pub fn cod(&self) -> f64 {
        self.location.cod()
    }

    pub fn parcels(&self) -> f64 {
        self.location.parcels()
    }
}

impl From<&Node> for geo::Point<f64> {
    fn from(node: &Node) -> Self {
        node.location.point()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickupDeliveryPair {
    pub pickup: NodeIdx,
    pub delivery: NodeIdx,
}

/// Unit of work a vehicle takes on: a standalone stop or a pickup and delivery pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    Stop(NodeIdx),
    Pair(PickupDeliveryPair),
}

impl Job {
    /// The stop, or the pickup of a pair.
    pub fn first(&self) -> NodeIdx {
        match self {
            Job::Stop(node) => *node,
            Job::Pair(pair) => pair.pickup,
        }
    }

    /// The stop, or the delivery of a pair.
    pub fn last(&self) -> NodeIdx {
        match self {
            Job::Stop(node) => *node,
            Job::Pair(pair) => pair.delivery,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIdx> {
        let last = match self {
            Job::Stop(_) => None,
            Job::Pair(pair) => Some(pair.delivery),
        };

        std::iter::once(self.first()).chain(last)
    }

    pub fn pair(&self) -> Option<&PickupDeliveryPair> {
        match self {
            Job::Stop(_) => None,
            Job::Pair(pair) => Some(pair),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ref_display() {
        let order_ref = OrderRef { order: 3, leg: 2 };
        assert_eq!(order_ref.to_string(), "3-2");
    }

    #[test]
    fn test_job_nodes() {
        let pair = Job::Pair(PickupDeliveryPair {
            pickup: NodeIdx::new(3),
            delivery: NodeIdx::new(4),
        });
        assert_eq!(
            pair.nodes().collect::<Vec<_>>(),
            vec![NodeIdx::new(3), NodeIdx::new(4)]
        );
        assert_eq!(pair.last(), NodeIdx::new(4));

        let stop = Job::Stop(NodeIdx::new(7));
        assert_eq!(stop.nodes().collect::<Vec<_>>(), vec![NodeIdx::new(7)]);
        assert_eq!(stop.first(), stop.last());
        assert!(stop.pair().is_none());
    }
}

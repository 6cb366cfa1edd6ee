pub mod distance_calculation;
pub mod load_model;
pub mod location;
pub mod min_parcels;
pub mod node;
pub mod order;
pub mod routing_problem;
pub mod transport_mode;

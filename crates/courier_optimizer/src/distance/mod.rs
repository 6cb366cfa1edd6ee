pub mod distance_matrix;
pub mod distance_provider;
pub mod violated_points;

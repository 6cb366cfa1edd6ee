pub mod cache;
pub mod geodesic;
pub mod osrm_table;
pub mod travel_matrices;
pub mod travel_matrix_client;
pub mod travel_matrix_provider;

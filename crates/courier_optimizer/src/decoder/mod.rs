pub mod decoded_route;
pub mod result_mode;
pub mod solution_decoder;

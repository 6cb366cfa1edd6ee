pub mod assignment;
pub mod engine;
pub mod escalation;
pub mod insertion_engine;
pub mod route_evaluation;
pub mod score;
pub mod solver_params;

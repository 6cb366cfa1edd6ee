pub mod constraint_model_builder;
pub mod dimension;
pub mod evaluators;
pub mod routing_model;

use crate::{
    distance::distance_provider::DistanceParams, model::constraint_model_builder::ModelParams,
    solver::escalation::EscalationParams,
};

/// Tunables of one request, from matrix building to escalation.
#[derive(Debug, Clone, Default)]
pub struct SolveParams {
    pub distance: DistanceParams,
    pub model: ModelParams,
    pub escalation: EscalationParams,
}

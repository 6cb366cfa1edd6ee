use jiff::SignedDuration;

use crate::{model::routing_model::RoutingModel, solver::assignment::Assignment};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    Assignment(Assignment),
    /// Nothing that honors the hard constraints was found within the budget.
    Infeasible,
}

impl EngineOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, EngineOutcome::Assignment(_))
    }
}

/// A search engine able to execute a [`RoutingModel`]. Every node must be served,
/// pairs by a single vehicle with the pickup first, and every hard dimension must
/// stay within its capacity band.
pub trait RouteSolverEngine {
    fn solve(&self, model: &RoutingModel, budget: SignedDuration) -> EngineOutcome;
}

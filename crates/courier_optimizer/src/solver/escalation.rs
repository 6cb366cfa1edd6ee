use jiff::SignedDuration;
use tracing::{info, warn};

use crate::{
    model::{
        constraint_model_builder::ConstraintModelBuilder,
        routing_model::{ConstraintMode, RoutingModel},
    },
    solver::{
        assignment::Assignment,
        engine::{EngineOutcome, RouteSolverEngine},
    },
};

/// `Initial -> HardSolve -> (Resolved | SoftSolve) -> (Resolved | Infeasible)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    Initial,
    HardSolve,
    SoftSolve,
    Resolved(ConstraintMode),
    Infeasible,
}

impl EscalationState {
    /// Next state given the outcome of the attempt made in the current state.
    pub fn advance(self, outcome: Option<&EngineOutcome>) -> EscalationState {
        let feasible = outcome.is_some_and(EngineOutcome::is_feasible);

        match self {
            EscalationState::Initial => EscalationState::HardSolve,
            EscalationState::HardSolve if feasible => {
                EscalationState::Resolved(ConstraintMode::Hard)
            }
            EscalationState::HardSolve => EscalationState::SoftSolve,
            EscalationState::SoftSolve if feasible => {
                EscalationState::Resolved(ConstraintMode::Soft)
            }
            EscalationState::SoftSolve => EscalationState::Infeasible,
            terminal => terminal,
        }
    }

    /// Constraint mode of the attempt to run in this state, if any.
    pub fn constraint_mode(&self) -> Option<ConstraintMode> {
        match self {
            EscalationState::HardSolve => Some(ConstraintMode::Hard),
            EscalationState::SoftSolve => Some(ConstraintMode::Soft),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EscalationState::Resolved(_) | EscalationState::Infeasible
        )
    }
}

#[derive(Debug, Clone)]
pub struct EscalationParams {
    pub hard_time_budget: SignedDuration,
}

impl Default for EscalationParams {
    fn default() -> Self {
        EscalationParams {
            hard_time_budget: SignedDuration::from_secs(25),
        }
    }
}

impl EscalationParams {
    /// The soft attempt gets twice the hard budget.
    pub fn budget(&self, mode: ConstraintMode) -> SignedDuration {
        match mode {
            ConstraintMode::Hard => self.hard_time_budget,
            ConstraintMode::Soft => self.hard_time_budget.saturating_mul(2),
        }
    }
}

pub enum EscalationOutcome {
    Resolved {
        mode: ConstraintMode,
        model: RoutingModel,
        assignment: Assignment,
    },
    Infeasible,
}

pub struct EscalationController<'a, E> {
    engine: &'a E,
    builder: &'a ConstraintModelBuilder<'a>,
    params: &'a EscalationParams,
}

impl<'a, E> EscalationController<'a, E>
where
    E: RouteSolverEngine,
{
    pub fn new(
        engine: &'a E,
        builder: &'a ConstraintModelBuilder<'a>,
        params: &'a EscalationParams,
    ) -> Self {
        Self {
            engine,
            builder,
            params,
        }
    }

    pub fn run(&self) -> EscalationOutcome {
        let mut state = EscalationState::Initial.advance(None);

        while let Some(mode) = state.constraint_mode() {
            let model = self.builder.build(mode);
            let budget = self.params.budget(mode);

            info!(?mode, %budget, "Solving");
            let outcome = self.checked(&model, self.engine.solve(&model, budget));
            state = state.advance(Some(&outcome));

            if let (EscalationState::Resolved(mode), EngineOutcome::Assignment(assignment)) =
                (state, outcome)
            {
                return EscalationOutcome::Resolved {
                    mode,
                    model,
                    assignment,
                };
            }
        }

        info!("No solution found after escalation");
        EscalationOutcome::Infeasible
    }

    /// An assignment that skips nodes or breaks pairing counts as no assignment.
    fn checked(&self, model: &RoutingModel, outcome: EngineOutcome) -> EngineOutcome {
        match outcome {
            EngineOutcome::Assignment(assignment)
                if !model.serves_all_nodes(&assignment) || !model.respects_pairing(&assignment) =>
            {
                warn!("Engine returned an assignment that does not serve every pair in order");
                EngineOutcome::Infeasible
            }
            outcome => outcome,
        }
    }
}

use std::sync::Arc;

use super::{Solver, SolverCore, StrategyKind};
use crate::llm::ChatModel;
use crate::prompts::PLAN_AND_SOLVE_PRIMING;
use crate::session::SessionStore;

/// Plan-and-solve prompting: extract the variables, devise a plan, then
/// carry it out.
pub struct PlanAndSolveSolver {
    core: SolverCore,
}

impl PlanAndSolveSolver {
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            core: SolverCore::new(store, model),
        }
    }
}

impl Solver for PlanAndSolveSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PlanAndSolve
    }

    fn priming(&self) -> &'static str {
        PLAN_AND_SOLVE_PRIMING
    }

    fn core(&self) -> &SolverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore {
        &mut self.core
    }
}

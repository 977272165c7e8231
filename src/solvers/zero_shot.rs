use std::sync::Arc;

use super::{Solver, SolverCore, StrategyKind};
use crate::llm::ChatModel;
use crate::prompts::ZERO_SHOT_PRIMING;
use crate::session::SessionStore;

/// Zero-shot chain-of-thought: prime the model with "Let's think step by step."
pub struct ZeroShotSolver {
    core: SolverCore,
}

impl ZeroShotSolver {
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            core: SolverCore::new(store, model),
        }
    }
}

impl Solver for ZeroShotSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ZeroShot
    }

    fn priming(&self) -> &'static str {
        ZERO_SHOT_PRIMING
    }

    fn core(&self) -> &SolverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore {
        &mut self.core
    }
}

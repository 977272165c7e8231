use std::sync::Arc;

use super::{Solver, SolverCore, StrategyKind};
use crate::llm::ChatModel;
use crate::prompts::{GIVE_A_LIST_PRIMING, GIVE_A_LIST_SYSTEM_PROMPT};
use crate::session::{Conversation, SessionStore};

/// Ask for a numbered list of steps ending in the answer.
///
/// The list instruction is a system message set once at construction; it
/// precedes every history the model sees, across resets.
pub struct GiveAListSolver {
    core: SolverCore,
}

impl GiveAListSolver {
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Self {
        let conversation =
            Conversation::new(store, model).with_system_prompt(GIVE_A_LIST_SYSTEM_PROMPT);
        Self {
            core: SolverCore::with_conversation(conversation),
        }
    }
}

impl Solver for GiveAListSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GiveAList
    }

    fn priming(&self) -> &'static str {
        GIVE_A_LIST_PRIMING
    }

    fn core(&self) -> &SolverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore {
        &mut self.core
    }
}

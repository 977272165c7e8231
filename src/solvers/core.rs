//! State shared by every solving strategy.

use std::sync::Arc;

use crate::error::{AppResult, SolverError};
use crate::llm::ChatModel;
use crate::session::{Conversation, SessionStore};

/// The conversation a solver drives plus the problem it is working on.
///
/// Composed into each strategy so they only differ in their prompts.
pub struct SolverCore {
    conversation: Conversation,
    problem: Option<String>,
}

impl SolverCore {
    /// Create a core on a fresh session of `store`.
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Self {
        Self::with_conversation(Conversation::new(store, model))
    }

    /// Create a core around an already configured conversation.
    pub fn with_conversation(conversation: Conversation) -> Self {
        Self {
            conversation,
            problem: None,
        }
    }

    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[inline]
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn set_problem(&mut self, problem: impl Into<String>) {
        self.problem = Some(problem.into());
    }

    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    /// Start a new session holding only the problem, then send `priming` as
    /// the assistant's opening words and return the model's continuation.
    pub fn prime(&mut self, priming: &str) -> AppResult<String> {
        let problem = self.problem.clone().ok_or(SolverError::ProblemNotSet)?;

        self.conversation.reset();
        self.conversation.append_human(problem);
        Ok(self.conversation.send_assistant(priming)?)
    }

    /// Ask `question` in the current session, after the reasoning turn.
    pub fn follow_up(&self, question: impl Into<String>) -> AppResult<String> {
        Ok(self.conversation.send_human(question)?)
    }
}

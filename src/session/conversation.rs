use std::sync::{Arc, PoisonError};

use tracing::debug;

use super::{SessionId, SessionStore, Turn};
use crate::error::LlmResult;
use crate::llm::{ChatModel, Message};

/// One solver's handle into a [`SessionStore`].
///
/// Turns are appended to the current session; `send_*` additionally invokes
/// the model over the whole history and records the reply. An optional
/// system prompt is prepended to every invocation and survives [`reset`].
///
/// [`reset`]: Conversation::reset
pub struct Conversation {
    store: Arc<SessionStore>,
    model: Arc<dyn ChatModel>,
    session_id: SessionId,
    system_prompt: Option<String>,
}

impl Conversation {
    /// Open a conversation on a freshly allocated session.
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Self {
        let session_id = store.allocate();
        Self {
            store,
            model,
            session_id,
            system_prompt: None,
        }
    }

    /// Set the system instruction sent ahead of every history.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Identifier of the session currently in use.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// System instruction, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Switch to a brand new session. The previous history is left in the
    /// store untouched under its old identifier.
    pub fn reset(&mut self) {
        let previous = self.session_id;
        self.session_id = self.store.allocate();
        debug!(previous, current = self.session_id, "Conversation reset");
    }

    /// Record a human turn without calling the model.
    pub fn append_human(&self, text: impl Into<String>) {
        self.push(Turn::human(text));
    }

    /// Record an assistant turn without calling the model.
    pub fn append_assistant(&self, text: impl Into<String>) {
        self.push(Turn::assistant(text));
    }

    /// Append a human turn, invoke the model and return its reply.
    pub fn send_human(&self, text: impl Into<String>) -> LlmResult<String> {
        self.append_human(text);
        self.invoke()
    }

    /// Append an assistant turn the model should continue from, invoke the
    /// model and return its reply.
    pub fn send_assistant(&self, text: impl Into<String>) -> LlmResult<String> {
        self.append_assistant(text);
        self.invoke()
    }

    /// Snapshot of the current session's turns.
    pub fn history(&self) -> Vec<Turn> {
        self.store.history(self.session_id).unwrap_or_default()
    }

    fn push(&self, turn: Turn) {
        let history = self.store.get_or_create(self.session_id);
        history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(turn);
    }

    fn invoke(&self) -> LlmResult<String> {
        let messages = self.messages();
        debug!(
            session_id = self.session_id,
            messages = messages.len(),
            "Invoking model"
        );

        // The session lock is not held here: a slow model call must not
        // block anything else touching the store.
        let reply = self.model.complete(&messages)?;
        self.append_assistant(reply.clone());
        Ok(reply)
    }

    fn messages(&self) -> Vec<Message> {
        let history = self.store.get_or_create(self.session_id);
        let turns = history.lock().unwrap_or_else(PoisonError::into_inner);

        self.system_prompt
            .iter()
            .map(|prompt| Message::system(prompt.clone()))
            .chain(turns.iter().map(Message::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{MessageRole, MockChatModel};
    use crate::session::Role;
    use std::sync::Mutex;

    /// Model double that records every message list it receives.
    struct RecordingModel {
        calls: Mutex<Vec<Vec<Message>>>,
        reply: String,
    }

    impl RecordingModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }

        fn calls(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChatModel for RecordingModel {
        fn complete(&self, messages: &[Message]) -> LlmResult<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_appended_turns_reach_model_in_call_order() {
        let store = Arc::new(SessionStore::new());
        let model = RecordingModel::new("ok");
        let conversation = Conversation::new(store, model.clone());

        conversation.append_human("h1");
        conversation.append_assistant("a1");
        conversation.append_human("h2");
        conversation.send_assistant("a2").unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                Message::user("h1"),
                Message::assistant("a1"),
                Message::user("h2"),
                Message::assistant("a2"),
            ]
        );
    }

    #[test]
    fn test_reply_is_recorded_as_assistant_turn() {
        let store = Arc::new(SessionStore::new());
        let model = RecordingModel::new("The answer is 4.");
        let conversation = Conversation::new(store, model.clone());

        let reply = conversation.send_human("What is 2+2?").unwrap();
        assert_eq!(reply, "The answer is 4.");

        let history = conversation.history();
        assert_eq!(
            history,
            vec![Turn::human("What is 2+2?"), Turn::assistant("The answer is 4.")]
        );

        conversation.send_human("Only the number.").unwrap();
        let calls = model.calls();
        assert_eq!(calls[1].len(), 3);
        assert_eq!(calls[1][1], Message::assistant("The answer is 4."));
    }

    #[test]
    fn test_reset_is_non_destructive() {
        let store = Arc::new(SessionStore::new());
        let model = RecordingModel::new("ok");
        let mut conversation = Conversation::new(Arc::clone(&store), model);

        conversation.append_human("first problem");
        let old_id = conversation.session_id();

        conversation.reset();

        assert_ne!(conversation.session_id(), old_id);
        assert!(conversation.history().is_empty());
        assert_eq!(
            store.history(old_id).unwrap(),
            vec![Turn::human("first problem")]
        );
    }

    #[test]
    fn test_system_prompt_precedes_history_and_survives_reset() {
        let store = Arc::new(SessionStore::new());
        let model = RecordingModel::new("1. Add.");
        let mut conversation =
            Conversation::new(store, model.clone()).with_system_prompt("List the steps.");

        conversation.append_human("p1");
        conversation.send_assistant("1. ").unwrap();
        conversation.reset();
        conversation.append_human("p2");
        conversation.send_assistant("1. ").unwrap();

        let calls = model.calls();
        for call in &calls {
            assert_eq!(call[0], Message::system("List the steps."));
        }
        assert_eq!(calls[1][1], Message::user("p2"));
        assert!(conversation
            .history()
            .iter()
            .all(|turn| turn.role != Role::System));
    }

    #[test]
    fn test_model_failure_propagates() {
        let store = Arc::new(SessionStore::new());
        let mut mock = MockChatModel::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(LlmError::Timeout { timeout_ms: 10 }));

        let conversation = Conversation::new(store, Arc::new(mock));
        let result = conversation.send_human("hello");

        assert!(matches!(result, Err(LlmError::Timeout { timeout_ms: 10 })));
        assert_eq!(conversation.history(), vec![Turn::human("hello")]);
    }

    #[test]
    fn test_conversations_do_not_share_sessions() {
        let store = Arc::new(SessionStore::new());
        let mut mock = MockChatModel::new();
        mock.expect_complete()
            .withf(|messages: &[Message]| {
                messages.len() == 1 && messages[0].role == MessageRole::User
            })
            .times(2)
            .returning(|messages| Ok(format!("echo {}", messages[0].content)));
        let model: Arc<dyn ChatModel> = Arc::new(mock);

        let a = Conversation::new(Arc::clone(&store), Arc::clone(&model));
        let b = Conversation::new(Arc::clone(&store), model);
        assert_ne!(a.session_id(), b.session_id());

        assert_eq!(a.send_human("a").unwrap(), "echo a");
        assert_eq!(b.send_human("b").unwrap(), "echo b");
        assert_eq!(a.history().len(), 2);
        assert_eq!(b.history().len(), 2);
    }
}

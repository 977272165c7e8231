//! Conversation sessions.
//!
//! A [`SessionStore`] maps opaque numeric identifiers to append-only turn
//! histories. Each solver talks to the model through its own
//! [`Conversation`], which owns exactly one live session at a time and
//! abandons it (rather than clearing it) on reset.

mod conversation;
mod store;

pub use conversation::Conversation;
pub use store::{SessionHistory, SessionStore};

use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Opaque session identifier, unique and monotonically assigned per store.
pub type SessionId = u64;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
}

/// One entry of a session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// Create a human turn
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    /// Create a system turn
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            Role::System => Message::system(turn.text.clone()),
            Role::Human => Message::user(turn.text.clone()),
            Role::Assistant => Message::assistant(turn.text.clone()),
        }
    }
}

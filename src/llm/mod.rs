//! Model capability and its OpenAI-compatible HTTP implementation.
//!
//! The rest of the crate only sees [`ChatModel`]: given the ordered messages
//! of a conversation, return the next completion text.

mod client;
mod types;


pub use client::{BlockingLlmClient, LlmClient};
pub use types::*;

use crate::error::LlmResult;

/// Synchronous request/response access to a language model.
///
/// Implementations block the calling thread until the reply arrives and
/// surface every failure to the caller without retrying.
#[cfg_attr(test, mockall::automock)]
pub trait ChatModel: Send + Sync {
    /// Return the model's reply to the ordered `messages`.
    fn complete(&self, messages: &[Message]) -> LlmResult<String>;
}

//! # cot-eval
//!
//! Evaluates chain-of-thought prompting strategies against math and
//! reasoning benchmarks using an OpenAI-compatible chat model.
//!
//! ## Features
//!
//! - **Strategies**: zero-shot CoT, plan-and-solve, and give-a-list prompting
//! - **Datasets**: AddSub, GSM8K, AQuA, HowMany, and StrategyQA
//! - **Two-turn solving**: a reasoning turn followed by an answer extraction
//!   turn in the same conversation
//! - **Concurrent jobs**: one worker thread per (strategy, dataset) pair,
//!   each writing to its own log file
//!
//! ## Architecture
//!
//! ```text
//! CLI → EvalHarness → worker threads → Solver → Conversation → ChatModel (HTTP)
//!                          ↓
//!                 LogRouter (per-thread log files)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cot_eval::{Config, EvalHarness, EvalJob, HarnessOptions};
//! use cot_eval::dataset::DatasetKind;
//! use cot_eval::llm::LlmClient;
//! use cot_eval::solvers::StrategyKind;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let runtime = tokio::runtime::Runtime::new()?;
//!     let client = LlmClient::new(&config.llm, config.request.clone())?
//!         .blocking(runtime.handle().clone());
//!
//!     let harness = EvalHarness::new(HarnessOptions::from_config(&config.eval, false), Arc::new(client));
//!     let jobs = EvalJob::product(&[StrategyKind::ZeroShot], &[DatasetKind::AddSub], None);
//!     println!("{}", harness.run(&jobs)?.render());
//!     Ok(())
//! }
//! ```

/// Command-line interface definition.
pub mod cli;
/// Configuration management.
pub mod config;
/// Benchmark datasets, problems, and index ranges.
pub mod dataset;
/// Error types and result aliases for the application.
pub mod error;
/// Answer scoring and the evaluation harness.
pub mod eval;
/// Chat model abstraction and OpenAI-compatible client.
pub mod llm;
/// Per-thread log routing.
pub mod logging;
/// Prompt text used by the solvers.
pub mod prompts;
/// Conversation sessions shared across solvers.
pub mod session;
/// Prompting strategy implementations.
pub mod solvers;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use eval::{EvalHarness, EvalJob, EvalSummary, HarnessOptions};

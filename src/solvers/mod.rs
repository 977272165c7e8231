//! Solving strategy implementations.
//!
//! This module provides the prompting strategies under evaluation:
//! - [`ZeroShotSolver`]: zero-shot chain-of-thought
//! - [`PlanAndSolveSolver`]: plan-and-solve prompting
//! - [`GiveAListSolver`]: numbered step list under a system instruction
//!
//! All strategies share their conversation handling via [`SolverCore`]
//! composition and differ only in the priming text. Answer extraction is a
//! second turn in the same session, so the follow-up question sees the
//! reasoning transcript.

mod core;
mod give_a_list;
mod plan_and_solve;
mod zero_shot;

pub use self::core::*;
pub use give_a_list::*;
pub use plan_and_solve::*;
pub use zero_shot::*;

use std::fmt;
use std::sync::Arc;

use crate::dataset::{ChoiceOptions, ProblemKind};
use crate::error::AppResult;
use crate::llm::ChatModel;
use crate::prompts::{boolean_follow_up, multichoice_follow_up, NUMERICAL_FOLLOW_UP};
use crate::session::SessionStore;

/// A prompting strategy bound to its own conversation.
pub trait Solver: Send {
    fn kind(&self) -> StrategyKind;

    /// Assistant-authored opening the model continues from.
    fn priming(&self) -> &'static str;

    fn core(&self) -> &SolverCore;

    fn core_mut(&mut self) -> &mut SolverCore;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Store the problem statement (without any answer options).
    fn set_problem(&mut self, problem: &str) {
        self.core_mut().set_problem(problem);
    }

    /// Run the reasoning turn on a fresh session and return its transcript.
    fn solve(&mut self) -> AppResult<String> {
        let priming = self.priming();
        self.core_mut().prime(priming)
    }

    /// Reason, then ask for a single real number.
    fn solve_numerical(&mut self) -> AppResult<String> {
        self.solve()?;
        self.core().follow_up(NUMERICAL_FOLLOW_UP)
    }

    /// Reason, then ask for one option letter.
    fn solve_multichoice(&mut self, options: &ChoiceOptions) -> AppResult<String> {
        self.solve()?;
        self.core().follow_up(multichoice_follow_up(options.iter()))
    }

    /// Reason, then ask for exactly `true_text` or `false_text`.
    fn solve_boolean(&mut self, true_text: &str, false_text: &str) -> AppResult<String> {
        self.solve()?;
        self.core().follow_up(boolean_follow_up(true_text, false_text))
    }

    /// Run the extraction matching the problem's answer shape.
    fn solve_for(&mut self, kind: &ProblemKind) -> AppResult<String> {
        match kind {
            ProblemKind::Numeric => self.solve_numerical(),
            ProblemKind::MultipleChoice(options) => self.solve_multichoice(options),
            ProblemKind::Boolean {
                true_text,
                false_text,
            } => self.solve_boolean(true_text, false_text),
        }
    }
}

/// A supported strategy, selected by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StrategyKind {
    #[value(name = "zero_shot")]
    ZeroShot,
    #[value(name = "plan_and_solve")]
    PlanAndSolve,
    #[value(name = "give_a_list")]
    GiveAList,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::ZeroShot,
        StrategyKind::PlanAndSolve,
        StrategyKind::GiveAList,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::ZeroShot => "zero_shot",
            StrategyKind::PlanAndSolve => "plan_and_solve",
            StrategyKind::GiveAList => "give_a_list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Construct the strategy on a fresh session of `store`.
    pub fn build(&self, store: Arc<SessionStore>, model: Arc<dyn ChatModel>) -> Box<dyn Solver> {
        match self {
            StrategyKind::ZeroShot => Box::new(ZeroShotSolver::new(store, model)),
            StrategyKind::PlanAndSolve => Box::new(PlanAndSolveSolver::new(store, model)),
            StrategyKind::GiveAList => Box::new(GiveAListSolver::new(store, model)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

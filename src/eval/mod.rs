//! Scoring and the concurrent evaluation harness.

mod answer;
mod harness;

pub use answer::{answer_equal, boolean_equal, num_equal, option_equal, NUMERIC_EPSILON};
pub use harness::{
    EvalHarness, EvalJob, EvalSummary, HarnessOptions, JobOutcome, JobReport, JobState,
};

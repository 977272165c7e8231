use clap::Parser;

use crate::dataset::{DatasetKind, IndexRange};
use crate::eval::EvalJob;
use crate::solvers::StrategyKind;

/// Evaluate chain-of-thought prompting strategies on benchmark datasets.
#[derive(Debug, Parser)]
#[command(name = "cot-eval", version, about)]
pub struct Cli {
    /// Strategies to evaluate
    #[arg(long = "solver", required = true, num_args = 1.., value_enum)]
    pub solvers: Vec<StrategyKind>,

    /// Datasets to evaluate on
    #[arg(long = "dataset", required = true, num_args = 1.., value_enum)]
    pub datasets: Vec<DatasetKind>,

    /// Problems to evaluate: `n` for problem n only, `a,b` for [a, b)
    #[arg(long, value_parser = parse_range)]
    pub range: Option<IndexRange>,

    /// Record model outputs in job logs
    #[arg(long)]
    pub debug: bool,

    /// Model name, overriding MODEL_NAME
    #[arg(long)]
    pub model: Option<String>,
}

impl Cli {
    /// Every (solver, dataset) pair requested, solvers outermost.
    pub fn jobs(&self) -> Vec<EvalJob> {
        EvalJob::product(&self.solvers, &self.datasets, self.range)
    }
}

fn parse_range(input: &str) -> Result<IndexRange, String> {
    IndexRange::parse(input).map_err(|e| e.to_string())
}

//! Integration tests for the evaluation harness
//!
//! Datasets are written to temp directories and the model is replaced by
//! an in-process stub, so every job runs end to end without network access.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use cot_eval::dataset::{DatasetKind, IndexRange};
use cot_eval::error::{AppError, DatasetError, LlmError, LlmResult};
use cot_eval::eval::{EvalHarness, EvalJob, HarnessOptions, JobState};
use cot_eval::llm::{ChatModel, Message, MessageRole};
use cot_eval::solvers::StrategyKind;

/// Answers every turn with the ground truth of the conversation's problem.
struct OracleModel {
    answers: HashMap<String, String>,
    calls: AtomicUsize,
}

impl OracleModel {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn problem_of(messages: &[Message]) -> &str {
    messages
        .iter()
        .find(|m| matches!(m.role, MessageRole::User))
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

impl ChatModel for OracleModel {
    fn complete(&self, messages: &[Message]) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let problem = problem_of(messages);
        if problem.contains("boom") {
            return Err(LlmError::InvalidResponse {
                message: "Response contained no completion text".to_string(),
            });
        }
        Ok(self
            .answers
            .get(problem)
            .cloned()
            .unwrap_or_else(|| "I don't know".to_string()))
    }
}

const ADDSUB: &[(&str, &str)] = &[
    ("Tom has 2 apples and buys 2 more. How many apples?", "4"),
    ("Sara had 15 pens and gave away 5. How many pens are left?", "10"),
    ("A jar holds 3 red and 4 blue marbles. How many marbles?", "7"),
];

const STRATEGY_QA: &[(&str, &str)] = &[
    ("Could a llama birth twice during the War in Vietnam?", "No"),
    ("Is a platypus a mammal?", "Yes"),
];

fn write_addsub(dir: &Path, problems: &[(&str, &str)]) {
    let records: Vec<_> = problems
        .iter()
        .enumerate()
        .map(|(i, (q, a))| {
            json!({
                "iIndex": i,
                "lEquations": [],
                "lSolutions": [a.parse::<i64>().unwrap()],
                "sQuestion": q
            })
        })
        .collect();
    fs::write(dir.join("AddSub.json"), json!(records).to_string()).unwrap();
}

fn write_strategy_qa(dir: &Path, problems: &[(&str, &str)]) {
    let records: Vec<_> = problems
        .iter()
        .map(|(q, a)| json!({ "question": q, "answer": *a == "Yes" }))
        .collect();
    fs::write(dir.join("StrategyQA.json"), json!(records).to_string()).unwrap();
}

fn options(root: &TempDir, debug: bool) -> HarnessOptions {
    HarnessOptions {
        dataset_dir: root.path().join("dataset"),
        log_dir: root.path().join("logs"),
        debug,
    }
}

fn setup() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let dataset_dir = root.path().join("dataset");
    fs::create_dir_all(&dataset_dir).unwrap();
    write_addsub(&dataset_dir, ADDSUB);
    write_strategy_qa(&dataset_dir, STRATEGY_QA);
    root
}

fn read_log(root: &TempDir, name: &str) -> String {
    fs::read_to_string(root.path().join("logs").join(name)).unwrap()
}

#[test]
fn test_perfect_model_scores_full_accuracy() {
    let root = setup();
    let model = Arc::new(OracleModel::new(ADDSUB));
    let harness = EvalHarness::new(options(&root, false), model.clone());

    let jobs = EvalJob::product(&[StrategyKind::ZeroShot], &[DatasetKind::AddSub], None);
    let summary = harness.run(&jobs).unwrap();

    assert!(summary.all_completed());
    assert_eq!(
        summary.accuracy(StrategyKind::ZeroShot, DatasetKind::AddSub),
        Some(1.0)
    );
    // Reasoning turn plus extraction turn per problem
    assert_eq!(model.calls(), 6);

    let log = read_log(&root, "zero_shot_AddSub.log");
    assert!(log.contains("Evaluating zero_shot solver on AddSub (3 problems)"));
    assert_eq!(log.matches("Running case").count(), 3);
    assert!(log.contains("Running case 3... Total 3"));
    assert!(log.contains("In case 3, correct 3."));
    assert!(!log.contains("Solving failed"));
    assert!(log.contains("zero_shot solver accuracy: 1"));
}

#[test]
fn test_wrong_answers_are_logged() {
    let root = setup();
    // Only the first problem is known to the model
    let model = Arc::new(OracleModel::new(&ADDSUB[..1]));
    let harness = EvalHarness::new(options(&root, false), model);

    let jobs = EvalJob::product(&[StrategyKind::PlanAndSolve], &[DatasetKind::AddSub], None);
    let summary = harness.run(&jobs).unwrap();

    let (_, outcome) = summary.completed().next().unwrap();
    assert_eq!(outcome.correct(), 1);
    assert_eq!(outcome.total(), 3);

    let log = read_log(&root, "plan_and_solve_AddSub.log");
    assert!(log.contains("Solving failed 2!!! Expected 10, Got I don't know."));
    assert!(log.contains("Solving failed 3!!! Expected 7, Got I don't know."));
    assert!(log.contains("In case 3, correct 1."));
}

#[test]
fn test_concurrent_jobs_write_isolated_logs() {
    let root = setup();
    let all: Vec<(&str, &str)> = ADDSUB.iter().chain(STRATEGY_QA).copied().collect();
    let harness = EvalHarness::new(options(&root, true), Arc::new(OracleModel::new(&all)));

    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot, StrategyKind::GiveAList],
        &[DatasetKind::AddSub, DatasetKind::StrategyQa],
        None,
    );
    let summary = harness.run(&jobs).unwrap();

    assert!(summary.all_completed());
    assert_eq!(summary.completed().count(), 4);

    for job in &jobs {
        let log = read_log(&root, &format!("{}.log", job.label()));
        let other_dataset = match job.dataset {
            DatasetKind::AddSub => "StrategyQA",
            _ => "AddSub",
        };
        let other_strategy = match job.strategy {
            StrategyKind::ZeroShot => "give_a_list",
            _ => "zero_shot",
        };

        assert!(log.contains(&format!(
            "Evaluating {} solver on {}",
            job.strategy, job.dataset
        )));
        assert!(!log.contains(other_dataset), "{} leaked into {}", other_dataset, job.label());
        assert!(!log.contains(other_strategy), "{} leaked into {}", other_strategy, job.label());
        // Debug mode records model outputs
        assert!(log.contains("| DEBUG | Case 1 output:"));

        let expected = match job.dataset {
            DatasetKind::AddSub => ADDSUB.len(),
            _ => STRATEGY_QA.len(),
        };
        assert_eq!(log.matches("Running case").count(), expected);
    }
}

#[test]
fn test_failing_job_does_not_stop_siblings() {
    let root = setup();
    let dataset_dir = root.path().join("dataset");
    write_strategy_qa(&dataset_dir, &[("Does boom go the dynamite?", "Yes")]);

    let harness = EvalHarness::new(options(&root, false), Arc::new(OracleModel::new(ADDSUB)));
    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot],
        &[DatasetKind::AddSub, DatasetKind::StrategyQa],
        None,
    );
    let summary = harness.run(&jobs).unwrap();

    assert!(!summary.all_completed());
    assert_eq!(
        summary.accuracy(StrategyKind::ZeroShot, DatasetKind::AddSub),
        Some(1.0)
    );
    assert_eq!(summary.accuracy(StrategyKind::ZeroShot, DatasetKind::StrategyQa), None);

    let failed: Vec<_> = summary.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0.dataset, DatasetKind::StrategyQa);
    assert!(failed[0].1.contains("Invalid response"));
    assert!(matches!(summary.reports[1].state, JobState::Failed { .. }));

    let log = read_log(&root, "zero_shot_StrategyQA.log");
    assert!(log.contains("Running case 1... Total 1"));
    assert!(log.contains("| ERROR | Job zero_shot_StrategyQA aborted"));
    assert!(!log.contains("accuracy"));
}

#[test]
fn test_range_selects_problems() {
    let root = setup();
    let harness = EvalHarness::new(options(&root, false), Arc::new(OracleModel::new(ADDSUB)));

    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot],
        &[DatasetKind::AddSub],
        Some(IndexRange::parse("1,3").unwrap()),
    );
    let summary = harness.run(&jobs).unwrap();

    let (_, outcome) = summary.completed().next().unwrap();
    assert_eq!(outcome.total(), 2);

    let log = read_log(&root, "zero_shot_AddSub.log");
    assert!(log.contains("Running case 2... Total 2"));
}

#[test]
fn test_missing_dataset_fails_only_its_own_job() {
    let root = setup();
    let model = Arc::new(OracleModel::new(ADDSUB));
    let harness = EvalHarness::new(options(&root, false), model.clone());

    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot],
        &[DatasetKind::AddSub, DatasetKind::Gsm8k],
        None,
    );
    let summary = harness.run(&jobs).unwrap();

    assert!(!summary.all_completed());
    assert_eq!(
        summary.accuracy(StrategyKind::ZeroShot, DatasetKind::AddSub),
        Some(1.0)
    );
    assert_eq!(model.calls(), 6);

    let failed: Vec<_> = summary.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0.dataset, DatasetKind::Gsm8k);
    assert!(failed[0].1.contains("Failed to read"));

    let addsub_log = read_log(&root, "zero_shot_AddSub.log");
    assert!(addsub_log.contains("zero_shot solver accuracy: 1"));
    assert!(!addsub_log.contains("GSM8K"));

    let gsm8k_log = read_log(&root, "zero_shot_GSM8K.log");
    assert!(gsm8k_log.contains("| ERROR | Job zero_shot_GSM8K could not load GSM8K: Dataset error: Failed to read"));
    assert!(!gsm8k_log.contains("Running case"));
}

#[test]
fn test_out_of_bounds_range_fails_only_that_job() {
    let root = setup();
    let model = Arc::new(OracleModel::new(ADDSUB));
    let harness = EvalHarness::new(options(&root, false), model.clone());

    // StrategyQA holds 2 records, AddSub holds 3
    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot],
        &[DatasetKind::StrategyQa, DatasetKind::AddSub],
        Some(IndexRange::parse("0,3").unwrap()),
    );
    let summary = harness.run(&jobs).unwrap();

    assert!(matches!(summary.reports[0].state, JobState::Failed { .. }));
    assert_eq!(
        summary.accuracy(StrategyKind::ZeroShot, DatasetKind::AddSub),
        Some(1.0)
    );
    let log = read_log(&root, "zero_shot_StrategyQA.log");
    assert!(log.contains("out of bounds for dataset of length 2"));
}

#[test]
fn test_every_job_failing_to_load_is_an_error() {
    let root = setup();
    let model = Arc::new(OracleModel::new(ADDSUB));
    let harness = EvalHarness::new(options(&root, false), model.clone());

    let jobs = EvalJob::product(
        &[StrategyKind::ZeroShot],
        &[DatasetKind::StrategyQa, DatasetKind::AddSub],
        Some(IndexRange::parse("0,10").unwrap()),
    );
    let err = harness.run(&jobs).unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(
        err,
        AppError::Dataset(DatasetError::OutOfBounds { end: 10, len: 2, .. })
    ));
    assert_eq!(model.calls(), 0);

    let log = read_log(&root, "zero_shot_AddSub.log");
    assert!(log.contains("Job zero_shot_AddSub could not load AddSub"));
    assert!(!log.contains("Running case"));
}

#[test]
fn test_single_missing_dataset_is_configuration_error() {
    let root = setup();
    let harness = EvalHarness::new(options(&root, false), Arc::new(OracleModel::new(ADDSUB)));

    let jobs = EvalJob::product(&[StrategyKind::ZeroShot], &[DatasetKind::Gsm8k], None);
    let err = harness.run(&jobs).unwrap_err();

    assert!(matches!(err, AppError::Dataset(DatasetError::Io { .. })));
}

#[test]
fn test_empty_job_list_is_rejected() {
    let root = setup();
    let harness = EvalHarness::new(options(&root, false), Arc::new(OracleModel::new(ADDSUB)));

    assert!(matches!(harness.run(&[]), Err(AppError::Config { .. })));
}

#[test]
fn test_skipped_records_are_logged() {
    let root = setup();
    let dataset_dir = root.path().join("dataset");
    fs::write(
        dataset_dir.join("AddSub.json"),
        json!([
            { "iIndex": 0, "lEquations": [], "lSolutions": [4], "sQuestion": ADDSUB[0].0 },
            { "iIndex": 1, "lEquations": [], "lSolutions": [], "sQuestion": "No answer here" }
        ])
        .to_string(),
    )
    .unwrap();

    let harness = EvalHarness::new(options(&root, false), Arc::new(OracleModel::new(ADDSUB)));
    let jobs = EvalJob::product(&[StrategyKind::ZeroShot], &[DatasetKind::AddSub], None);
    let summary = harness.run(&jobs).unwrap();

    let (_, outcome) = summary.completed().next().unwrap();
    assert_eq!(outcome.total(), 1);

    let log = read_log(&root, "zero_shot_AddSub.log");
    assert!(log.contains("| WARN  | Skipped record 1 of AddSub: lSolutions is empty"));
}

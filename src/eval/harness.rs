//! Concurrent evaluation harness.
//!
//! The [`EvalHarness`] runs one OS thread per (strategy, dataset) job. Each
//! worker routes its diagnostics to its own log file, drives its own solver
//! and session, and reports an accuracy once every problem is scored.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

use super::answer::answer_equal;
use crate::config::EvalConfig;
use crate::dataset::{DatasetKind, IndexRange, LoadedSlice};
use crate::error::{AppError, AppResult};
use crate::llm::ChatModel;
use crate::logging::LogRouter;
use crate::session::SessionStore;
use crate::solvers::StrategyKind;

/// One unit of evaluation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalJob {
    pub strategy: StrategyKind,
    pub dataset: DatasetKind,
    pub range: Option<IndexRange>,
}

impl EvalJob {
    pub fn new(strategy: StrategyKind, dataset: DatasetKind) -> Self {
        Self {
            strategy,
            dataset,
            range: None,
        }
    }

    pub fn with_range(mut self, range: Option<IndexRange>) -> Self {
        self.range = range;
        self
    }

    /// One job per (strategy, dataset) pair, strategies outermost.
    /// Repeated names are ignored so no two jobs share a log file.
    pub fn product(
        strategies: &[StrategyKind],
        datasets: &[DatasetKind],
        range: Option<IndexRange>,
    ) -> Vec<EvalJob> {
        let mut jobs: Vec<EvalJob> = Vec::with_capacity(strategies.len() * datasets.len());
        for &strategy in strategies {
            for &dataset in datasets {
                let job = EvalJob::new(strategy, dataset).with_range(range);
                if !jobs.contains(&job) {
                    jobs.push(job);
                }
            }
        }
        jobs
    }

    /// `<strategy>_<dataset>`, used for the thread name and log file.
    pub fn label(&self) -> String {
        format!("{}_{}", self.strategy, self.dataset)
    }

    pub fn log_path(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("{}.log", self.label()))
    }
}

/// Score of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    correct: usize,
    total: usize,
}

impl JobOutcome {
    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn accuracy(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }
}

/// Lifecycle of a job: `Pending -> Running -> Completed | Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Pending,
    Running,
    Completed(JobOutcome),
    Failed { error: String },
}

/// Final state of one job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: EvalJob,
    pub state: JobState,
}

impl JobReport {
    pub fn outcome(&self) -> Option<&JobOutcome> {
        match &self.state {
            JobState::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Per-job results of one harness run, in job order.
#[derive(Debug, Clone, Default)]
pub struct EvalSummary {
    pub reports: Vec<JobReport>,
}

impl EvalSummary {
    /// Jobs that ran to completion, with their scores.
    pub fn completed(&self) -> impl Iterator<Item = (&EvalJob, &JobOutcome)> {
        self.reports
            .iter()
            .filter_map(|report| report.outcome().map(|outcome| (&report.job, outcome)))
    }

    /// Jobs that failed, with their error text.
    pub fn failed(&self) -> impl Iterator<Item = (&EvalJob, &str)> {
        self.reports.iter().filter_map(|report| match &report.state {
            JobState::Failed { error } => Some((&report.job, error.as_str())),
            _ => None,
        })
    }

    pub fn all_completed(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Accuracy of the job for `strategy` on `dataset`, if it completed.
    pub fn accuracy(&self, strategy: StrategyKind, dataset: DatasetKind) -> Option<f64> {
        self.completed()
            .find(|(job, _)| job.strategy == strategy && job.dataset == dataset)
            .map(|(_, outcome)| outcome.accuracy())
    }

    /// Plain-text table of completed jobs followed by failures.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<16} {:<12} {:>8} {:>8} {:>9}",
            "solver", "dataset", "correct", "total", "accuracy"
        );
        for (job, outcome) in self.completed() {
            let _ = writeln!(
                out,
                "{:<16} {:<12} {:>8} {:>8} {:>8.2}%",
                job.strategy.name(),
                job.dataset.name(),
                outcome.correct(),
                outcome.total(),
                outcome.accuracy() * 100.0
            );
        }
        for (job, error) in self.failed() {
            let _ = writeln!(out, "{} failed: {}", job.label(), error);
        }
        out
    }
}

/// Where the harness reads datasets and writes job logs.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub dataset_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Record debug lines (model outputs) in job logs
    pub debug: bool,
}

impl HarnessOptions {
    pub fn from_config(config: &EvalConfig, debug: bool) -> Self {
        Self {
            dataset_dir: config.dataset_dir.clone(),
            log_dir: config.log_dir.clone(),
            debug,
        }
    }

    fn log_filter(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}

/// Runs evaluation jobs in parallel worker threads.
pub struct EvalHarness {
    options: HarnessOptions,
    model: Arc<dyn ChatModel>,
    store: Arc<SessionStore>,
    router: Arc<LogRouter>,
}

impl EvalHarness {
    pub fn new(options: HarnessOptions, model: Arc<dyn ChatModel>) -> Self {
        Self {
            options,
            model,
            store: Arc::new(SessionStore::new()),
            router: Arc::new(LogRouter::new()),
        }
    }

    /// Share a router, e.g. one also fed by a `tracing` layer.
    pub fn with_router(mut self, router: Arc<LogRouter>) -> Self {
        self.router = router;
        self
    }

    pub fn with_store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn router(&self) -> &Arc<LogRouter> {
        &self.router
    }

    /// Load every job's problems, then run the loaded jobs concurrently and
    /// wait for them.
    ///
    /// A job whose dataset cannot be loaded (missing or malformed file, bad
    /// range, nothing valid in the slice) is marked failed and its error is
    /// written to its log; the other jobs still run. Only an empty job list,
    /// or a run where no job could load, is returned as an error. A failure
    /// inside a worker likewise only marks that job as failed, and nothing is
    /// retried.
    pub fn run(&self, jobs: &[EvalJob]) -> AppResult<EvalSummary> {
        if jobs.is_empty() {
            return Err(AppError::Config {
                message: "at least one solver and one dataset are required".to_string(),
            });
        }

        let mut reports: Vec<JobReport> = jobs
            .iter()
            .map(|job| JobReport {
                job: *job,
                state: JobState::Pending,
            })
            .collect();

        let mut planned: Vec<Option<LoadedSlice>> = Vec::with_capacity(jobs.len());
        let mut first_load_error: Option<AppError> = None;
        for (job, report) in jobs.iter().zip(reports.iter_mut()) {
            match job.dataset.load(&self.options.dataset_dir, job.range) {
                Ok(slice) => {
                    debug!(
                        job = %job.label(),
                        problems = slice.len(),
                        skipped = slice.skipped.len(),
                        "Job planned"
                    );
                    planned.push(Some(slice));
                }
                Err(e) => {
                    let e = AppError::from(e);
                    error!(job = %job.label(), error = %e, "Job could not load its problems");
                    self.log_load_failure(job, &e);
                    report.state = JobState::Failed {
                        error: e.to_string(),
                    };
                    first_load_error.get_or_insert(e);
                    planned.push(None);
                }
            }
        }

        if let Some(e) = first_load_error.filter(|_| planned.iter().all(Option::is_none)) {
            return Err(e);
        }

        thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .zip(&planned)
                .zip(reports.iter_mut())
                .map(|((job, slice), report)| {
                    let slice = slice.as_ref()?;
                    let spawned = thread::Builder::new()
                        .name(job.label())
                        .spawn_scoped(scope, move || self.run_job(job, slice));
                    match spawned {
                        Ok(handle) => {
                            report.state = JobState::Running;
                            info!(job = %job.label(), problems = slice.len(), "Job started");
                            Some(handle)
                        }
                        Err(e) => {
                            let e = AppError::Internal {
                                message: format!("failed to spawn worker: {}", e),
                            };
                            error!(job = %job.label(), error = %e, "Job not started");
                            report.state = JobState::Failed {
                                error: e.to_string(),
                            };
                            None
                        }
                    }
                })
                .collect();

            for (handle, report) in handles.into_iter().zip(reports.iter_mut()) {
                let Some(handle) = handle else { continue };
                report.state = match handle.join() {
                    Ok(Ok(outcome)) => {
                        info!(
                            job = %report.job.label(),
                            correct = outcome.correct(),
                            total = outcome.total(),
                            "Job completed"
                        );
                        JobState::Completed(outcome)
                    }
                    Ok(Err(e)) => {
                        error!(job = %report.job.label(), error = %e, "Job failed");
                        JobState::Failed {
                            error: e.to_string(),
                        }
                    }
                    Err(_) => {
                        error!(job = %report.job.label(), "Job worker panicked");
                        JobState::Failed {
                            error: "worker panicked".to_string(),
                        }
                    }
                };
            }
        });

        Ok(EvalSummary { reports })
    }

    /// Record a load failure in the job's own log, briefly routing the
    /// calling thread to it.
    fn log_load_failure(&self, job: &EvalJob, e: &AppError) {
        let log_path = job.log_path(&self.options.log_dir);
        match self.router.enter(&log_path, self.options.log_filter()) {
            Ok(_route) => self.router.error(format_args!(
                "Job {} could not load {}: {}",
                job.label(),
                job.dataset,
                e
            )),
            Err(io) => {
                warn!(job = %job.label(), path = %log_path.display(), error = %io, "Job log unavailable")
            }
        }
    }

    /// Worker body: route this thread's logs to the job file, then evaluate.
    fn run_job(&self, job: &EvalJob, slice: &LoadedSlice) -> AppResult<JobOutcome> {
        let log_path = job.log_path(&self.options.log_dir);
        let _route = self.router.enter(&log_path, self.options.log_filter())?;

        let result = self.evaluate(job, slice);
        if let Err(e) = &result {
            self.router
                .error(format_args!("Job {} aborted: {}", job.label(), e));
        }
        result
    }

    fn evaluate(&self, job: &EvalJob, slice: &LoadedSlice) -> AppResult<JobOutcome> {
        let log = &self.router;
        let total = slice.len();

        log.info(format_args!(
            "Evaluating {} solver on {} ({} problems)",
            job.strategy, job.dataset, total
        ));
        for skipped in &slice.skipped {
            log.warn(format_args!(
                "Skipped record {} of {}: {}",
                skipped.index, job.dataset, skipped.reason
            ));
        }

        let mut solver = job
            .strategy
            .build(Arc::clone(&self.store), Arc::clone(&self.model));
        let mut correct = 0;

        for (index, problem) in slice.problems.iter().enumerate() {
            let case = index + 1;
            log.info(format_args!("Running case {}... Total {}", case, total));

            solver.set_problem(&problem.statement);
            let output = solver.solve_for(&problem.kind)?;
            log.debug(format_args!("Case {} output: {}", case, output));

            if answer_equal(&problem.answer, &output, problem.shape()) {
                correct += 1;
            } else {
                log.warn(format_args!(
                    "Solving failed {}!!! Expected {}, Got {}.",
                    case,
                    problem.answer,
                    output.trim()
                ));
            }
            log.info(format_args!("In case {}, correct {}.", case, correct));
        }

        let outcome = JobOutcome { correct, total };
        log.info(format_args!(
            "{} solver accuracy: {}",
            job.strategy,
            outcome.accuracy()
        ));
        Ok(outcome)
    }
}

//! The closed set of supported datasets and their record schemas.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::loader::{self, DatasetRecord, FileFormat, LoadedSlice};
use super::{AnswerShape, ChoiceOptions, IndexRange, Problem};
use crate::error::{DatasetError, DatasetResult};

/// Labels the model must answer with on boolean datasets.
const YES: &str = "Yes";
const NO: &str = "No";

/// A supported dataset, selected by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DatasetKind {
    #[value(name = "AddSub")]
    AddSub,
    #[value(name = "GSM8K")]
    Gsm8k,
    #[value(name = "AQuA")]
    Aqua,
    #[value(name = "HowMany")]
    HowMany,
    #[value(name = "StrategyQA")]
    StrategyQa,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::AddSub,
        DatasetKind::Gsm8k,
        DatasetKind::Aqua,
        DatasetKind::HowMany,
        DatasetKind::StrategyQa,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::AddSub => "AddSub",
            DatasetKind::Gsm8k => "GSM8K",
            DatasetKind::Aqua => "AQuA",
            DatasetKind::HowMany => "HowMany",
            DatasetKind::StrategyQa => "StrategyQA",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn file_format(&self) -> FileFormat {
        match self {
            DatasetKind::Aqua => FileFormat::JsonLines,
            _ => FileFormat::Json,
        }
    }

    pub fn shape(&self) -> AnswerShape {
        match self {
            DatasetKind::AddSub | DatasetKind::Gsm8k | DatasetKind::HowMany => {
                AnswerShape::Numeric
            }
            DatasetKind::Aqua => AnswerShape::MultipleChoice,
            DatasetKind::StrategyQa => AnswerShape::Boolean,
        }
    }

    /// Upper bound on records evaluated when no range is requested.
    pub fn default_limit(&self) -> Option<usize> {
        match self {
            DatasetKind::Gsm8k => Some(400),
            _ => None,
        }
    }

    /// `<dir>/<name>.<json|jsonl>`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.name(), self.file_format().extension()))
    }

    /// Load the problems of this dataset from `dir`.
    ///
    /// An explicit `range` must lie inside the data. Without one, the whole
    /// file is used, capped at [`default_limit`](Self::default_limit).
    /// Fails with [`DatasetError::Empty`] when nothing valid remains.
    pub fn load(&self, dir: &Path, range: Option<IndexRange>) -> DatasetResult<LoadedSlice> {
        let path = self.path_in(dir);
        let format = self.file_format();
        let limit = self.default_limit();

        let slice = match self {
            DatasetKind::AddSub => loader::load::<AddSubRecord>(&path, format, range, limit),
            DatasetKind::Gsm8k => loader::load::<Gsm8kRecord>(&path, format, range, limit),
            DatasetKind::Aqua => loader::load::<AquaRecord>(&path, format, range, limit),
            DatasetKind::HowMany => loader::load::<HowManyRecord>(&path, format, range, limit),
            DatasetKind::StrategyQa => {
                loader::load::<StrategyQaRecord>(&path, format, range, limit)
            }
        }?;

        if slice.is_empty() {
            return Err(DatasetError::Empty {
                dataset: self.name().to_string(),
            });
        }
        Ok(slice)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Answer field that some dumps store as a number and others as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AnswerText {
    Number(serde_json::Number),
    Text(String),
}

impl AnswerText {
    fn into_string(self) -> String {
        match self {
            AnswerText::Number(n) => n.to_string(),
            AnswerText::Text(s) => s.trim().to_string(),
        }
    }
}

fn require_text(field: &str, value: String) -> Result<String, String> {
    if value.trim().is_empty() {
        Err(format!("{} is empty", field))
    } else {
        Ok(value)
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct AddSubRecord {
    #[serde(rename = "iIndex")]
    index: i64,
    #[serde(rename = "lEquations")]
    equations: Vec<String>,
    #[serde(rename = "lSolutions")]
    solutions: Vec<AnswerText>,
    #[serde(rename = "sQuestion")]
    question: String,
}

impl DatasetRecord for AddSubRecord {
    fn into_problem(self) -> Result<Problem, String> {
        let answer = self
            .solutions
            .into_iter()
            .next()
            .ok_or_else(|| "lSolutions is empty".to_string())?;
        Ok(Problem::numeric(
            require_text("sQuestion", self.question)?,
            answer.into_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct Gsm8kRecord {
    question: String,
    answer: AnswerText,
}

impl DatasetRecord for Gsm8kRecord {
    fn into_problem(self) -> Result<Problem, String> {
        Ok(Problem::numeric(
            require_text("question", self.question)?,
            self.answer.into_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct AquaRecord {
    question: String,
    options: Vec<String>,
    #[serde(default)]
    rationale: String,
    correct: String,
}

impl DatasetRecord for AquaRecord {
    fn into_problem(self) -> Result<Problem, String> {
        let options = ChoiceOptions::from_raw(&self.options)
            .ok_or_else(|| format!("too many options ({})", self.options.len()))?;
        if options.is_empty() {
            return Err("options is empty".to_string());
        }

        let correct = self.correct.trim().to_uppercase();
        if options.get(&correct).is_none() {
            return Err(format!("correct answer '{}' is not an option letter", correct));
        }

        Ok(Problem::multiple_choice(
            require_text("question", self.question)?,
            correct,
            options,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HowManyRecord {
    index: i64,
    problem: String,
    answer: AnswerText,
}

impl DatasetRecord for HowManyRecord {
    fn into_problem(self) -> Result<Problem, String> {
        Ok(Problem::numeric(
            require_text("problem", self.problem)?,
            self.answer.into_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct StrategyQaRecord {
    question: String,
    answer: bool,
}

impl DatasetRecord for StrategyQaRecord {
    fn into_problem(self) -> Result<Problem, String> {
        Ok(Problem::boolean(
            require_text("question", self.question)?,
            self.answer,
            YES,
            NO,
        ))
    }
}

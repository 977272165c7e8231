//! Reading dataset files and slicing them by index range.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{IndexRange, Problem};
use crate::error::{DatasetError, DatasetResult};

/// On-disk layout of a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// One JSON array holding every record
    Json,
    /// One JSON object per line
    JsonLines,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::JsonLines => "jsonl",
        }
    }
}

/// A dataset-specific record that can be turned into a [`Problem`].
pub trait DatasetRecord: DeserializeOwned {
    /// Validate the record and build the problem, or explain why not.
    fn into_problem(self) -> Result<Problem, String>;
}

/// A record dropped because it did not match its dataset's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the file
    pub index: usize,
    pub reason: String,
}

/// Problems selected for one job, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoadedSlice {
    pub problems: Vec<Problem>,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadedSlice {
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Read every raw record of `path` in file order.
pub fn read_records(path: &Path, format: FileFormat) -> DatasetResult<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |message: String| DatasetError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match format {
        FileFormat::Json => match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(parse_err("expected a top-level JSON array".to_string())),
            Err(e) => Err(parse_err(e.to_string())),
        },
        FileFormat::JsonLines => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line)
                    .map_err(|e| parse_err(format!("line {}: {}", number + 1, e)))
            })
            .collect(),
    }
}

/// Pick the records inside `range`, keeping their file positions.
///
/// Without a range, the first `limit` records are taken (all of them when
/// `limit` is `None`). An explicit range reaching past the end of the data
/// is an error, never a silent truncation.
pub fn select(
    records: Vec<Value>,
    range: Option<IndexRange>,
    limit: Option<usize>,
) -> DatasetResult<Vec<(usize, Value)>> {
    let len = records.len();
    let range = match range {
        Some(range) if range.end() > len => {
            return Err(DatasetError::OutOfBounds {
                start: range.start(),
                end: range.end(),
                len,
            })
        }
        Some(range) => range.as_range(),
        None => 0..limit.map_or(len, |limit| limit.min(len)),
    };

    Ok(records
        .into_iter()
        .enumerate()
        .skip(range.start)
        .take(range.len())
        .collect())
}

/// Load the problems of `path` within `range` (or the first `limit`
/// records), skipping invalid records.
pub fn load<R: DatasetRecord>(
    path: &Path,
    format: FileFormat,
    range: Option<IndexRange>,
    limit: Option<usize>,
) -> DatasetResult<LoadedSlice> {
    let records = read_records(path, format)?;
    debug!(path = %path.display(), records = records.len(), "Dataset file read");

    let mut slice = LoadedSlice::default();
    for (index, value) in select(records, range, limit)? {
        let problem = serde_json::from_value::<R>(value)
            .map_err(|e| e.to_string())
            .and_then(R::into_problem);

        match problem {
            Ok(problem) => slice.problems.push(problem),
            Err(reason) => {
                warn!(path = %path.display(), index, reason = %reason, "Skipping invalid record");
                slice.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    Ok(slice)
}

//! Labeled problem datasets.
//!
//! - [`Problem`]: one question with its ground truth and answer shape
//! - [`IndexRange`]: half-open record interval selected for a job
//! - [`loader`]: JSON / JSON-lines reading, range slicing, record validation
//! - [`DatasetKind`]: the supported datasets and their file conventions

pub mod loader;
mod problem;
mod range;
mod registry;

pub use loader::{FileFormat, LoadedSlice, SkippedRecord};
pub use problem::{AnswerShape, ChoiceOptions, Problem, ProblemKind};
pub use range::IndexRange;
pub use registry::DatasetKind;

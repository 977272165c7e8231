//! Scoring a model's extracted answer against the ground truth.

use crate::dataset::AnswerShape;

/// Largest absolute difference at which two numbers count as equal.
pub const NUMERIC_EPSILON: f64 = 1e-4;

/// Both sides parse as numbers within [`NUMERIC_EPSILON`] of each other.
///
/// Text that does not parse is simply unequal.
pub fn num_equal(lhs: &str, rhs: &str) -> bool {
    match (lhs.trim().parse::<f64>(), rhs.trim().parse::<f64>()) {
        (Ok(lhs), Ok(rhs)) => (lhs - rhs).abs() < NUMERIC_EPSILON,
        _ => false,
    }
}

/// Case-insensitive option letter comparison.
pub fn option_equal(lhs: &str, rhs: &str) -> bool {
    lhs.trim().eq_ignore_ascii_case(rhs.trim())
}

/// Case-insensitive label comparison, e.g. `Yes` vs `yes`.
pub fn boolean_equal(lhs: &str, rhs: &str) -> bool {
    lhs.trim().to_lowercase() == rhs.trim().to_lowercase()
}

/// Compare `output` to `expected` with the rule for `shape`.
pub fn answer_equal(expected: &str, output: &str, shape: AnswerShape) -> bool {
    match shape {
        AnswerShape::Numeric => num_equal(expected, output),
        AnswerShape::MultipleChoice => option_equal(expected, output),
        AnswerShape::Boolean => boolean_equal(expected, output),
    }
}

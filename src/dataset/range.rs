use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::RangeError;

/// Half-open interval of record indices in a dataset's natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    start: usize,
    end: usize,
}

impl IndexRange {
    /// `[start, end)`; a start past the end is rejected.
    pub fn new(start: usize, end: usize) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[n, n + 1)`
    pub fn single(n: usize) -> Self {
        Self {
            start: n,
            end: n.saturating_add(1),
        }
    }

    /// `[0, len)`
    pub fn prefix(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Parse `"n"` as `[n, n + 1)` or `"start,end"` as `[start, end)`.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let format_err = || RangeError::Format {
            input: input.to_string(),
        };
        let number = |part: &str| part.trim().parse::<usize>().map_err(|_| format_err());

        let parts: Vec<&str> = input.split(',').collect();
        match parts.as_slice() {
            [n] => Ok(Self::single(number(n)?)),
            [start, end] => Self::new(number(start)?, number(end)?),
            _ => Err(format_err()),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl FromStr for IndexRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

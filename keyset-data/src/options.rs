use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::DataError;

/// Pagination arguments as received from a client.
///
/// Counts are signed so that negative input coming off the wire is reported as
/// an `Invalid` request instead of a deserialization failure.
///
/// ```ignore
/// let opts = PaginationOptions::first(20).after(previous.end_cursor().unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationOptions {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Which end of the ordering rows are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDirection {
    Forward,
    Backward,
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub direction: FetchDirection,
    /// `None` means every remaining row.
    pub count: Option<u32>,
}

impl PaginationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward page of `count` rows.
    pub fn first(count: i64) -> Self {
        Self {
            first: Some(count),
            ..Self::default()
        }
    }

    /// Backward page of `count` rows.
    pub fn last(count: i64) -> Self {
        Self {
            last: Some(count),
            ..Self::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn has_cursor(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Check counts against each other and against `config.max_page_size`.
    pub fn validate(&self, config: &PaginationConfig) -> Result<PageWindow, DataError> {
        let (direction, raw) = match (self.first, self.last) {
            (Some(_), Some(_)) => {
                return Err(DataError::invalid(
                    "only one of first or last can be set, not both",
                ))
            }
            (Some(n), None) => (FetchDirection::Forward, Some(("first", n))),
            (None, Some(n)) => (FetchDirection::Backward, Some(("last", n))),
            (None, None) => (FetchDirection::Forward, None),
        };

        let count = match raw {
            None => None,
            Some((name, n)) if n < 0 => {
                return Err(DataError::invalid(format!("{name} must not be negative, got {n}")))
            }
            Some((name, n)) if n > i64::from(config.max_page_size) => {
                return Err(DataError::invalid(format!(
                    "{name} must not exceed {}, got {n}",
                    config.max_page_size
                )))
            }
            Some((_, n)) => Some(n as u32),
        };

        Ok(PageWindow { direction, count })
    }
}

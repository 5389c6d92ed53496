//! Validation errors for incoming report filters.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("expected exactly two dates [start, end], got {0}")]
    DateCount(usize),

    #[error("invalid date: '{0}'")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    #[error("vehicle id must not be empty")]
    EmptyVehicle,
}

impl FilterError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DateCount(_) => "date_count",
            Self::InvalidDate(_) => "invalid_date",
            Self::ReversedRange { .. } => "reversed_range",
            Self::EmptyVehicle => "empty_vehicle",
        }
    }
}

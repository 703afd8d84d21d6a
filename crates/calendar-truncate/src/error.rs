//! Error types for calendar-truncate operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TruncateError {
    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid calendar unit: {0}")]
    InvalidUnit(String),
}

pub type Result<T> = std::result::Result<T, TruncateError>;

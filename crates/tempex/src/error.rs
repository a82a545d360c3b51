//! Error types for tempex operations.
//!
//! These are internal to the conversion pipeline: the public `parse` family
//! maps every error uniformly to "no result" at the API boundary, so callers
//! never see a distinguished error code for unparseable input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TempexError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

pub type Result<T> = std::result::Result<T, TempexError>;

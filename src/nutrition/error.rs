//! Engine error types

use thiserror::Error;

/// Errors raised at the engine boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid value {value} for `{field}`")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("`{field}` is not a number: `{value}`")]
    NotANumber { field: &'static str, value: String },

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

pub type NutritionResult<T> = Result<T, NutritionError>;

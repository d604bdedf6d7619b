//! Nutrilog Tools module
//!
//! MCP tool implementations for meal logging, goals and analytics.

pub mod analytics;
pub mod goals;
pub mod meals;
pub mod status;

use chrono::NaiveDate;

use crate::nutrition::parse_date;

/// Parse an optional ISO date argument
pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(s).map_err(|e| e.to_string()))
        .transpose()
}

//! Request/response data transfer objects
//!
//! Enumerated fields arrive as strings and are parsed into the domain enums
//! here, so an unknown value is rejected with the offending field named.

pub mod user;
pub mod violation;
pub mod seizure;
pub mod infraction;
pub mod evidence;
pub mod statistics;
pub mod activity;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use core_kernel::{Amount, CoreError, DateWindow};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiError;

/// Parses an enumerated field
pub(crate) fn parse_enum<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = CoreError>,
{
    value.parse().map_err(ApiError::from)
}

/// Parses an optional enumerated field
pub(crate) fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = CoreError>,
{
    value.map(parse_enum).transpose()
}

pub(crate) fn amount(value: Option<Decimal>) -> Option<Amount> {
    value.map(Amount::new)
}

/// Optional inclusive bounds on a listing or report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl WindowQuery {
    pub fn window(&self) -> Result<DateWindow, ApiError> {
        DateWindow::new(self.start, self.end).map_err(|e| ApiError::validation("window", e.to_string()))
    }
}

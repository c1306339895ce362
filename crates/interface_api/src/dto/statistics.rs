//! Statistics query parameters

use chrono::{DateTime, Utc};
use core_kernel::{DateWindow, UserId};
use serde::Deserialize;

use super::WindowQuery;
use crate::error::ApiError;

/// Default number of violators returned
pub const DEFAULT_TOP_VIOLATORS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct OfficerPerformanceQuery {
    pub officer_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl OfficerPerformanceQuery {
    pub fn officer(&self) -> Option<UserId> {
        self.officer_id.map(UserId::new)
    }

    pub fn window(&self) -> Result<DateWindow, ApiError> {
        WindowQuery {
            start: self.start,
            end: self.end,
        }
        .window()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopViolatorsQuery {
    pub limit: Option<usize>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TopViolatorsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_TOP_VIOLATORS).max(1)
    }

    pub fn window(&self) -> Result<DateWindow, ApiError> {
        WindowQuery {
            start: self.start,
            end: self.end,
        }
        .window()
    }
}

//! Seizure DTOs

use chrono::{DateTime, Utc};
use core_kernel::{UserId, ViolationId};
use domain_case::{NewSeizure, SeizureFilter, SeizureUpdate};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::{amount, parse_enum, parse_opt, WindowQuery};
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeizureRequest {
    #[validate(length(min = 1))]
    pub seizure_number: String,
    pub violation_id: i64,
    #[validate(length(min = 1))]
    pub item_description: String,
    #[validate(range(min = 1))]
    pub item_quantity: i64,
    pub item_category: String,
    /// Seizing officer; defaults to the caller
    pub officer_id: Option<i64>,
    pub seizure_date: DateTime<Utc>,
    pub estimated_value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub storage_location: Option<String>,
    pub condition_notes: Option<String>,
    #[serde(default)]
    pub photo_evidence_urls: Vec<String>,
}

impl CreateSeizureRequest {
    pub fn into_domain(self, caller: UserId) -> Result<NewSeizure, ApiError> {
        self.validate()?;
        Ok(NewSeizure {
            item_category: parse_enum(&self.item_category)?,
            violation_id: ViolationId::new(self.violation_id),
            officer_id: self.officer_id.map(UserId::new).unwrap_or(caller),
            estimated_value: amount(self.estimated_value),
            seizure_number: self.seizure_number,
            item_description: self.item_description,
            item_quantity: self.item_quantity,
            seizure_date: self.seizure_date,
            serial_number: self.serial_number,
            storage_location: self.storage_location,
            condition_notes: self.condition_notes,
            photo_evidence_urls: self.photo_evidence_urls,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSeizureRequest {
    pub item_description: Option<String>,
    #[validate(range(min = 1))]
    pub item_quantity: Option<i64>,
    pub item_category: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub storage_location: Option<String>,
    pub status: Option<String>,
    pub condition_notes: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub release_reason: Option<String>,
    pub release_authorized_by: Option<i64>,
    pub photo_evidence_urls: Option<Vec<String>>,
}

impl UpdateSeizureRequest {
    pub fn into_domain(self) -> Result<SeizureUpdate, ApiError> {
        self.validate()?;
        Ok(SeizureUpdate {
            item_category: parse_opt(self.item_category.as_deref())?,
            status: parse_opt(self.status.as_deref())?,
            estimated_value: amount(self.estimated_value),
            release_authorized_by: self.release_authorized_by.map(UserId::new),
            item_description: self.item_description,
            item_quantity: self.item_quantity,
            serial_number: self.serial_number,
            storage_location: self.storage_location,
            condition_notes: self.condition_notes,
            release_date: self.release_date,
            release_reason: self.release_reason,
            photo_evidence_urls: self.photo_evidence_urls,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeizureListQuery {
    pub violation_id: Option<i64>,
    pub status: Option<String>,
    pub item_category: Option<String>,
    pub officer_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SeizureListQuery {
    pub fn filter(&self) -> Result<SeizureFilter, ApiError> {
        Ok(SeizureFilter {
            violation_id: self.violation_id.map(ViolationId::new),
            status: parse_opt(self.status.as_deref())?,
            item_category: parse_opt(self.item_category.as_deref())?,
            officer_id: self.officer_id.map(UserId::new),
            window: WindowQuery {
                start: self.start,
                end: self.end,
            }
            .window()?,
        })
    }
}

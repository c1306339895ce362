//! Violation DTOs

use chrono::{DateTime, Utc};
use core_kernel::UserId;
use domain_case::{NewViolation, ViolationFilter, ViolationUpdate};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::{amount, parse_enum, parse_opt, WindowQuery};
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateViolationRequest {
    #[validate(length(min = 1))]
    pub violation_number: String,
    #[validate(length(min = 1))]
    pub violator_name: String,
    pub violation_date: DateTime<Utc>,
    pub violation_type: String,
    pub severity_level: String,
    #[validate(length(min = 1))]
    pub location: String,
    /// Recording officer; defaults to the caller
    pub officer_id: Option<i64>,
    pub violator_license_number: Option<String>,
    pub violator_phone: Option<String>,
    pub violator_address: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub fine_amount: Option<Decimal>,
    pub notes: Option<String>,
}

impl CreateViolationRequest {
    pub fn into_domain(self, caller: UserId) -> Result<NewViolation, ApiError> {
        self.validate()?;
        Ok(NewViolation {
            violation_type: parse_enum(&self.violation_type)?,
            severity_level: parse_enum(&self.severity_level)?,
            officer_id: self.officer_id.map(UserId::new).unwrap_or(caller),
            fine_amount: amount(self.fine_amount),
            violation_number: self.violation_number,
            violator_name: self.violator_name,
            violation_date: self.violation_date,
            location: self.location,
            violator_license_number: self.violator_license_number,
            violator_phone: self.violator_phone,
            violator_address: self.violator_address,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            notes: self.notes,
        })
    }
}

/// The violation number is fixed at creation and not accepted here
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateViolationRequest {
    pub violator_name: Option<String>,
    pub violator_license_number: Option<String>,
    pub violator_phone: Option<String>,
    pub violator_address: Option<String>,
    pub violation_type: Option<String>,
    pub severity_level: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub status: Option<String>,
    pub fine_amount: Option<Decimal>,
    pub paid_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl UpdateViolationRequest {
    pub fn into_domain(self) -> Result<ViolationUpdate, ApiError> {
        self.validate()?;
        Ok(ViolationUpdate {
            violation_type: parse_opt(self.violation_type.as_deref())?,
            severity_level: parse_opt(self.severity_level.as_deref())?,
            status: parse_opt(self.status.as_deref())?,
            fine_amount: amount(self.fine_amount),
            violator_name: self.violator_name,
            violator_license_number: self.violator_license_number,
            violator_phone: self.violator_phone,
            violator_address: self.violator_address,
            description: self.description,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            paid_date: self.paid_date,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ViolationListQuery {
    pub officer_id: Option<i64>,
    pub status: Option<String>,
    pub violation_type: Option<String>,
    pub severity_level: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ViolationListQuery {
    pub fn filter(&self) -> Result<ViolationFilter, ApiError> {
        Ok(ViolationFilter {
            officer_id: self.officer_id.map(UserId::new),
            status: parse_opt(self.status.as_deref())?,
            violation_type: parse_opt(self.violation_type.as_deref())?,
            severity_level: parse_opt(self.severity_level.as_deref())?,
            window: WindowQuery {
                start: self.start,
                end: self.end,
            }
            .window()?,
        })
    }
}

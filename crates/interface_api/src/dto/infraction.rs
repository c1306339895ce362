//! Infraction DTOs

use chrono::{DateTime, Utc};
use core_kernel::{UserId, ViolationId};
use domain_case::{InfractionFilter, InfractionUpdate, NewInfraction};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::{amount, parse_opt, WindowQuery};
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInfractionRequest {
    #[validate(length(min = 1))]
    pub infraction_number: String,
    pub violation_id: i64,
    #[validate(length(min = 1))]
    pub infraction_type: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub points: i64,
    pub description: Option<String>,
    pub statute_reference: Option<String>,
    pub minimum_fine: Option<Decimal>,
    pub maximum_fine: Option<Decimal>,
}

impl CreateInfractionRequest {
    pub fn into_domain(self) -> Result<NewInfraction, ApiError> {
        self.validate()?;
        Ok(NewInfraction {
            violation_id: ViolationId::new(self.violation_id),
            minimum_fine: amount(self.minimum_fine),
            maximum_fine: amount(self.maximum_fine),
            infraction_number: self.infraction_number,
            infraction_type: self.infraction_type,
            points: self.points,
            description: self.description,
            statute_reference: self.statute_reference,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInfractionRequest {
    pub infraction_type: Option<String>,
    pub description: Option<String>,
    pub statute_reference: Option<String>,
    #[validate(range(min = 0))]
    pub points: Option<i64>,
    pub minimum_fine: Option<Decimal>,
    pub maximum_fine: Option<Decimal>,
    pub status: Option<String>,
    pub court_appearance_date: Option<DateTime<Utc>>,
    pub court_location: Option<String>,
    pub case_number: Option<String>,
    pub prosecutor_id: Option<i64>,
    pub judge_id: Option<i64>,
    pub outcome: Option<String>,
    pub sentence_details: Option<String>,
    #[validate(range(min = 0))]
    pub probation_period_months: Option<i64>,
}

impl UpdateInfractionRequest {
    pub fn into_domain(self) -> Result<InfractionUpdate, ApiError> {
        self.validate()?;
        Ok(InfractionUpdate {
            status: parse_opt(self.status.as_deref())?,
            minimum_fine: amount(self.minimum_fine),
            maximum_fine: amount(self.maximum_fine),
            prosecutor_id: self.prosecutor_id.map(UserId::new),
            judge_id: self.judge_id.map(UserId::new),
            infraction_type: self.infraction_type,
            description: self.description,
            statute_reference: self.statute_reference,
            points: self.points,
            court_appearance_date: self.court_appearance_date,
            court_location: self.court_location,
            case_number: self.case_number,
            outcome: self.outcome,
            sentence_details: self.sentence_details,
            probation_period_months: self.probation_period_months,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InfractionListQuery {
    pub violation_id: Option<i64>,
    pub status: Option<String>,
    pub infraction_type: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl InfractionListQuery {
    pub fn filter(&self) -> Result<InfractionFilter, ApiError> {
        Ok(InfractionFilter {
            violation_id: self.violation_id.map(ViolationId::new),
            status: parse_opt(self.status.as_deref())?,
            infraction_type: self.infraction_type.clone(),
            window: WindowQuery {
                start: self.start,
                end: self.end,
            }
            .window()?,
        })
    }
}

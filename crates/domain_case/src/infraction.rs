//! Legal infractions: charges and their judicial disposition
//!
//! Court fields (appearance date, case number, prosecutor, judge, outcome,
//! sentence) start empty and are filled in by updates as the case proceeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Amount, CoreError, DateWindow, InfractionId, UserId, ViolationId};
use crate::changes::{ChangeSet, EntityUpdate, Patched};
use crate::validation;

domain_enum! {
    /// Judicial status of a charge
    InfractionStatus, "status" {
        Pending => "pending",
        Contested => "contested",
        Resolved => "resolved",
        Dismissed => "dismissed",
        Appealed => "appealed",
    }
}

impl Default for InfractionStatus {
    fn default() -> Self {
        InfractionStatus::Pending
    }
}

/// A persisted infraction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infraction {
    pub id: InfractionId,
    pub infraction_number: String,
    pub violation_id: ViolationId,
    pub infraction_type: String,
    pub points: i64,
    pub description: Option<String>,
    pub statute_reference: Option<String>,
    pub minimum_fine: Option<Amount>,
    pub maximum_fine: Option<Amount>,
    pub status: InfractionStatus,
    pub court_appearance_date: Option<DateTime<Utc>>,
    pub court_location: Option<String>,
    pub case_number: Option<String>,
    pub prosecutor_id: Option<UserId>,
    pub judge_id: Option<UserId>,
    pub outcome: Option<String>,
    pub sentence_details: Option<String>,
    pub probation_period_months: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for charging an infraction under an existing violation
#[derive(Debug, Clone, PartialEq)]
pub struct NewInfraction {
    pub infraction_number: String,
    pub violation_id: ViolationId,
    pub infraction_type: String,
    pub points: i64,
    pub description: Option<String>,
    pub statute_reference: Option<String>,
    pub minimum_fine: Option<Amount>,
    pub maximum_fine: Option<Amount>,
}

impl NewInfraction {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("infraction_number", &self.infraction_number)?;
        validation::require_text("infraction_type", &self.infraction_type)?;
        validation::non_negative_int("points", Some(self.points))?;
        validate_fine_bounds(self.minimum_fine, self.maximum_fine)
    }
}

fn validate_fine_bounds(minimum: Option<Amount>, maximum: Option<Amount>) -> Result<(), CoreError> {
    validation::non_negative_amount("minimum_fine", minimum)?;
    validation::non_negative_amount("maximum_fine", maximum)?;
    if let (Some(min), Some(max)) = (minimum, maximum) {
        if min > max {
            return Err(CoreError::validation(
                "minimum_fine",
                format!("minimum fine {} exceeds maximum fine {}", min, max),
            ));
        }
    }
    Ok(())
}

/// Allow-listed mutable infraction fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfractionUpdate {
    pub infraction_type: Option<String>,
    pub description: Option<String>,
    pub statute_reference: Option<String>,
    pub points: Option<i64>,
    pub minimum_fine: Option<Amount>,
    pub maximum_fine: Option<Amount>,
    pub status: Option<InfractionStatus>,
    pub court_appearance_date: Option<DateTime<Utc>>,
    pub court_location: Option<String>,
    pub case_number: Option<String>,
    pub prosecutor_id: Option<UserId>,
    pub judge_id: Option<UserId>,
    pub outcome: Option<String>,
    pub sentence_details: Option<String>,
    pub probation_period_months: Option<i64>,
}

impl EntityUpdate<Infraction> for InfractionUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, current: &Infraction, _now: DateTime<Utc>) -> Result<Patched<Infraction>, CoreError> {
        let mut record = current.clone();
        let mut changes = ChangeSet::new();

        if let Some(kind) = &self.infraction_type {
            validation::require_text("infraction_type", kind)?;
            changes.set("infraction_type", &mut record.infraction_type, kind.clone());
        }
        changes.set_some("description", &mut record.description, self.description.clone());
        changes.set_some("statute_reference", &mut record.statute_reference, self.statute_reference.clone());
        if let Some(points) = self.points {
            validation::non_negative_int("points", Some(points))?;
            changes.set("points", &mut record.points, points);
        }
        changes.set_some("minimum_fine", &mut record.minimum_fine, self.minimum_fine);
        changes.set_some("maximum_fine", &mut record.maximum_fine, self.maximum_fine);
        validate_fine_bounds(record.minimum_fine, record.maximum_fine)?;
        if let Some(status) = self.status {
            changes.set("status", &mut record.status, status);
        }
        changes.set_some("court_appearance_date", &mut record.court_appearance_date, self.court_appearance_date);
        changes.set_some("court_location", &mut record.court_location, self.court_location.clone());
        changes.set_some("case_number", &mut record.case_number, self.case_number.clone());
        changes.set_some("prosecutor_id", &mut record.prosecutor_id, self.prosecutor_id);
        changes.set_some("judge_id", &mut record.judge_id, self.judge_id);
        changes.set_some("outcome", &mut record.outcome, self.outcome.clone());
        changes.set_some("sentence_details", &mut record.sentence_details, self.sentence_details.clone());
        validation::non_negative_int("probation_period_months", self.probation_period_months)?;
        changes.set_some(
            "probation_period_months",
            &mut record.probation_period_months,
            self.probation_period_months,
        );

        Ok(Patched { record, changes })
    }
}

/// Optional, conjunctive filters for listing infractions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfractionFilter {
    pub violation_id: Option<ViolationId>,
    pub status: Option<InfractionStatus>,
    pub infraction_type: Option<String>,
    /// Applied to `created_at`
    #[serde(default)]
    pub window: DateWindow,
}

impl InfractionFilter {
    pub fn within(window: DateWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn speeding() -> Infraction {
        let now = Utc::now();
        Infraction {
            id: InfractionId::new(1),
            infraction_number: "I-0001".into(),
            violation_id: ViolationId::new(1),
            infraction_type: "speeding".into(),
            points: 2,
            description: None,
            statute_reference: Some("TC 41(2)".into()),
            minimum_fine: Some(Amount::new(dec!(100))),
            maximum_fine: Some(Amount::new(dec!(500))),
            status: InfractionStatus::Pending,
            court_appearance_date: None,
            court_location: None,
            case_number: None,
            prosecutor_id: None,
            judge_id: None,
            outcome: None,
            sentence_details: None,
            probation_period_months: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inverted_fine_bounds_rejected_on_create() {
        let new = NewInfraction {
            infraction_number: "I-2".into(),
            violation_id: ViolationId::new(1),
            infraction_type: "speeding".into(),
            points: 0,
            description: None,
            statute_reference: None,
            minimum_fine: Some(Amount::new(dec!(900))),
            maximum_fine: Some(Amount::new(dec!(100))),
        };
        assert_eq!(new.validate().unwrap_err().field(), Some("minimum_fine"));
    }

    #[test]
    fn test_bounds_checked_against_merged_record() {
        let update = InfractionUpdate {
            minimum_fine: Some(Amount::new(dec!(600))),
            ..InfractionUpdate::default()
        };
        assert!(update.apply(&speeding(), Utc::now()).is_err());
    }

    #[test]
    fn test_court_fields_populate_as_case_proceeds() {
        let update = InfractionUpdate {
            status: Some(InfractionStatus::Contested),
            case_number: Some("C-77/2024".into()),
            judge_id: Some(UserId::new(9)),
            ..InfractionUpdate::default()
        };
        let patched = update.apply(&speeding(), Utc::now()).unwrap();
        assert_eq!(patched.changes.len(), 3);
        assert_eq!(patched.record.judge_id, Some(UserId::new(9)));
    }

    #[test]
    fn test_negative_points_rejected() {
        let update = InfractionUpdate {
            points: Some(-1),
            ..InfractionUpdate::default()
        };
        assert!(update.apply(&speeding(), Utc::now()).is_err());
    }
}

//! Property seizures taken into custody under a violation
//!
//! Release metadata (date, authorizing user, reason) is only ever written on
//! the transition from `stored` into one of the disposal statuses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Amount, CoreError, DateWindow, SeizureId, UserId, ViolationId};
use crate::changes::{ChangeSet, EntityUpdate, Patched};
use crate::validation;

domain_enum! {
    /// Kind of item seized
    SeizureCategory, "item_category" {
        Vehicle => "vehicle",
        Documents => "documents",
        Contraband => "contraband",
        Weapon => "weapon",
        Currency => "currency",
        Other => "other",
    }
}

domain_enum! {
    /// Custody status of a seized item
    SeizureStatus, "status" {
        Stored => "stored",
        Released => "released",
        Destroyed => "destroyed",
        Auctioned => "auctioned",
        Pending => "pending",
    }
}

impl SeizureStatus {
    /// Statuses that end custody and carry release metadata
    pub fn is_disposal(&self) -> bool {
        matches!(
            self,
            SeizureStatus::Released | SeizureStatus::Destroyed | SeizureStatus::Auctioned
        )
    }
}

impl Default for SeizureStatus {
    fn default() -> Self {
        SeizureStatus::Stored
    }
}

/// A persisted seizure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seizure {
    pub id: SeizureId,
    pub seizure_number: String,
    pub violation_id: ViolationId,
    pub item_description: String,
    pub item_quantity: i64,
    pub item_category: SeizureCategory,
    pub estimated_value: Option<Amount>,
    pub serial_number: Option<String>,
    pub storage_location: Option<String>,
    pub officer_id: UserId,
    pub seizure_date: DateTime<Utc>,
    pub release_date: Option<DateTime<Utc>>,
    pub release_authorized_by: Option<UserId>,
    pub release_reason: Option<String>,
    pub status: SeizureStatus,
    pub condition_notes: Option<String>,
    pub photo_evidence_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seizure {
    pub fn value_or_zero(&self) -> Amount {
        self.estimated_value.unwrap_or_else(Amount::zero)
    }
}

/// Data for recording a seizure against an existing violation
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeizure {
    pub seizure_number: String,
    pub violation_id: ViolationId,
    pub item_description: String,
    pub item_quantity: i64,
    pub item_category: SeizureCategory,
    pub officer_id: UserId,
    pub seizure_date: DateTime<Utc>,
    pub estimated_value: Option<Amount>,
    pub serial_number: Option<String>,
    pub storage_location: Option<String>,
    pub condition_notes: Option<String>,
    pub photo_evidence_urls: Vec<String>,
}

impl NewSeizure {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("seizure_number", &self.seizure_number)?;
        validation::require_text("item_description", &self.item_description)?;
        if self.item_quantity < 1 {
            return Err(CoreError::validation("item_quantity", "must be at least 1"));
        }
        validation::non_negative_amount("estimated_value", self.estimated_value)?;
        Ok(())
    }
}

/// Allow-listed mutable seizure fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeizureUpdate {
    pub item_description: Option<String>,
    pub item_quantity: Option<i64>,
    pub item_category: Option<SeizureCategory>,
    pub estimated_value: Option<Amount>,
    pub serial_number: Option<String>,
    pub storage_location: Option<String>,
    pub status: Option<SeizureStatus>,
    pub condition_notes: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub release_reason: Option<String>,
    pub release_authorized_by: Option<UserId>,
    pub photo_evidence_urls: Option<Vec<String>>,
}

impl SeizureUpdate {
    fn first_release_field(&self) -> Option<&'static str> {
        if self.release_date.is_some() {
            Some("release_date")
        } else if self.release_authorized_by.is_some() {
            Some("release_authorized_by")
        } else if self.release_reason.is_some() {
            Some("release_reason")
        } else {
            None
        }
    }
}

impl EntityUpdate<Seizure> for SeizureUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, current: &Seizure, now: DateTime<Utc>) -> Result<Patched<Seizure>, CoreError> {
        let mut record = current.clone();
        let mut changes = ChangeSet::new();

        let entering_disposal = match self.status {
            Some(target) if target.is_disposal() && target != current.status => {
                if current.status != SeizureStatus::Stored {
                    return Err(CoreError::validation(
                        "status",
                        format!("cannot move a {} item to {}; only stored items can be disposed of", current.status, target),
                    ));
                }
                true
            }
            _ => false,
        };

        if let Some(field) = self.first_release_field() {
            if !entering_disposal {
                return Err(CoreError::validation(
                    field,
                    "release details are only recorded on a stored to released/destroyed/auctioned transition",
                ));
            }
        }

        if let Some(description) = &self.item_description {
            validation::require_text("item_description", description)?;
            changes.set("item_description", &mut record.item_description, description.clone());
        }
        if let Some(quantity) = self.item_quantity {
            if quantity < 1 {
                return Err(CoreError::validation("item_quantity", "must be at least 1"));
            }
            changes.set("item_quantity", &mut record.item_quantity, quantity);
        }
        if let Some(category) = self.item_category {
            changes.set("item_category", &mut record.item_category, category);
        }
        validation::non_negative_amount("estimated_value", self.estimated_value)?;
        changes.set_some("estimated_value", &mut record.estimated_value, self.estimated_value);
        changes.set_some("serial_number", &mut record.serial_number, self.serial_number.clone());
        changes.set_some("storage_location", &mut record.storage_location, self.storage_location.clone());
        changes.set_some("condition_notes", &mut record.condition_notes, self.condition_notes.clone());
        if let Some(urls) = &self.photo_evidence_urls {
            changes.set("photo_evidence_urls", &mut record.photo_evidence_urls, urls.clone());
        }
        if let Some(status) = self.status {
            changes.set("status", &mut record.status, status);
        }
        if entering_disposal {
            let released_at = self.release_date.unwrap_or(now);
            changes.set("release_date", &mut record.release_date, Some(released_at));
            changes.set_some("release_authorized_by", &mut record.release_authorized_by, self.release_authorized_by);
            changes.set_some("release_reason", &mut record.release_reason, self.release_reason.clone());
        }

        Ok(Patched { record, changes })
    }
}

/// Optional, conjunctive filters for listing seizures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeizureFilter {
    pub violation_id: Option<ViolationId>,
    pub status: Option<SeizureStatus>,
    pub item_category: Option<SeizureCategory>,
    pub officer_id: Option<UserId>,
    /// Applied to `seizure_date`
    #[serde(default)]
    pub window: DateWindow,
}

impl SeizureFilter {
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

    fn stored_vehicle() -> Seizure {
        let now = Utc::now();
        Seizure {
            id: SeizureId::new(1),
            seizure_number: "S-0001".into(),
            violation_id: ViolationId::new(1),
            item_description: "Grey sedan".into(),
            item_quantity: 1,
            item_category: SeizureCategory::Vehicle,
            estimated_value: Some(Amount::new(dec!(5000))),
            serial_number: None,
            storage_location: Some("Impound lot A".into()),
            officer_id: UserId::new(1),
            seizure_date: now,
            release_date: None,
            release_authorized_by: None,
            release_reason: None,
            status: SeizureStatus::Stored,
            condition_notes: None,
            photo_evidence_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_release_stamps_date_when_absent() {
        let now = Utc::now();
        let update = SeizureUpdate {
            status: Some(SeizureStatus::Released),
            release_authorized_by: Some(UserId::new(2)),
            release_reason: Some("Fine paid".into()),
            ..SeizureUpdate::default()
        };
        let patched = update.apply(&stored_vehicle(), now).unwrap();
        assert_eq!(patched.record.release_date, Some(now));
        assert_eq!(patched.record.release_authorized_by, Some(UserId::new(2)));
        assert!(patched.changes.contains("release_date"));
    }

    #[test]
    fn test_release_fields_without_transition_rejected() {
        let update = SeizureUpdate {
            release_reason: Some("Owner request".into()),
            ..SeizureUpdate::default()
        };
        let err = update.apply(&stored_vehicle(), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("release_reason"));
    }

    #[test]
    fn test_pending_item_cannot_be_auctioned() {
        let mut seizure = stored_vehicle();
        seizure.status = SeizureStatus::Pending;
        let update = SeizureUpdate {
            status: Some(SeizureStatus::Auctioned),
            ..SeizureUpdate::default()
        };
        assert_eq!(update.apply(&seizure, Utc::now()).unwrap_err().field(), Some("status"));
    }

    #[test]
    fn test_pending_to_stored_allowed() {
        let mut seizure = stored_vehicle();
        seizure.status = SeizureStatus::Pending;
        let update = SeizureUpdate {
            status: Some(SeizureStatus::Stored),
            ..SeizureUpdate::default()
        };
        let patched = update.apply(&seizure, Utc::now()).unwrap();
        assert_eq!(patched.record.status, SeizureStatus::Stored);
        assert!(patched.record.release_date.is_none());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let update = SeizureUpdate {
            item_quantity: Some(0),
            ..SeizureUpdate::default()
        };
        assert!(update.apply(&stored_vehicle(), Utc::now()).is_err());
    }
}

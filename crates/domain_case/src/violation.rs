//! Violation aggregate root
//!
//! A violation owns zero or more seizures, infractions and evidence items.
//! Its `violation_number` is the external-facing business key and cannot be
//! changed once assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Amount, CoreError, DateWindow, UserId, ViolationId};
use crate::changes::{ChangeSet, EntityUpdate, Patched};
use crate::evidence::Evidence;
use crate::infraction::Infraction;
use crate::seizure::Seizure;
use crate::user::User;
use crate::validation;

domain_enum! {
    /// Category of the recorded violation
    ViolationType, "violation_type" {
        Traffic => "traffic",
        Parking => "parking",
        Criminal => "criminal",
        Administrative => "administrative",
        Other => "other",
    }
}

domain_enum! {
    /// Severity assessed by the recording officer
    Severity, "severity_level" {
        Minor => "minor",
        Moderate => "moderate",
        Serious => "serious",
        Critical => "critical",
    }
}

domain_enum! {
    /// Case status
    ViolationStatus, "status" {
        Open => "open",
        Closed => "closed",
        Appealed => "appealed",
        Dismissed => "dismissed",
        Resolved => "resolved",
    }
}

impl Default for ViolationStatus {
    fn default() -> Self {
        ViolationStatus::Open
    }
}

/// A persisted violation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: ViolationId,
    pub violation_number: String,
    pub violator_name: String,
    pub violator_license_number: Option<String>,
    pub violator_phone: Option<String>,
    pub violator_address: Option<String>,
    pub violation_date: DateTime<Utc>,
    pub violation_type: ViolationType,
    pub severity_level: Severity,
    pub description: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub officer_id: UserId,
    pub status: ViolationStatus,
    pub fine_amount: Option<Amount>,
    pub paid_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Cached count of active evidence items; maintained by the evidence repository
    pub evidence_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Violation {
    /// Fine amount with unset fines counted as zero
    pub fn fine_or_zero(&self) -> Amount {
        self.fine_amount.unwrap_or_else(Amount::zero)
    }
}

/// Data submitted by an officer to open a violation
#[derive(Debug, Clone, PartialEq)]
pub struct NewViolation {
    pub violation_number: String,
    pub violator_name: String,
    pub violation_date: DateTime<Utc>,
    pub violation_type: ViolationType,
    pub severity_level: Severity,
    pub location: String,
    pub officer_id: UserId,
    pub violator_license_number: Option<String>,
    pub violator_phone: Option<String>,
    pub violator_address: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fine_amount: Option<Amount>,
    pub notes: Option<String>,
}

impl NewViolation {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("violation_number", &self.violation_number)?;
        validation::require_text("violator_name", &self.violator_name)?;
        validation::require_text("location", &self.location)?;
        validation::in_range("latitude", self.latitude, -90.0, 90.0)?;
        validation::in_range("longitude", self.longitude, -180.0, 180.0)?;
        validation::non_negative_amount("fine_amount", self.fine_amount)?;
        Ok(())
    }
}

/// Allow-listed mutable violation fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationUpdate {
    pub violator_name: Option<String>,
    pub violator_license_number: Option<String>,
    pub violator_phone: Option<String>,
    pub violator_address: Option<String>,
    pub violation_type: Option<ViolationType>,
    pub severity_level: Option<Severity>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<ViolationStatus>,
    pub fine_amount: Option<Amount>,
    pub paid_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl EntityUpdate<Violation> for ViolationUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, current: &Violation, _now: DateTime<Utc>) -> Result<Patched<Violation>, CoreError> {
        let mut record = current.clone();
        let mut changes = ChangeSet::new();

        if let Some(name) = &self.violator_name {
            validation::require_text("violator_name", name)?;
            changes.set("violator_name", &mut record.violator_name, name.clone());
        }
        changes.set_some(
            "violator_license_number",
            &mut record.violator_license_number,
            self.violator_license_number.clone(),
        );
        changes.set_some("violator_phone", &mut record.violator_phone, self.violator_phone.clone());
        changes.set_some("violator_address", &mut record.violator_address, self.violator_address.clone());
        if let Some(kind) = self.violation_type {
            changes.set("violation_type", &mut record.violation_type, kind);
        }
        if let Some(severity) = self.severity_level {
            changes.set("severity_level", &mut record.severity_level, severity);
        }
        changes.set_some("description", &mut record.description, self.description.clone());
        if let Some(location) = &self.location {
            validation::require_text("location", location)?;
            changes.set("location", &mut record.location, location.clone());
        }
        validation::in_range("latitude", self.latitude, -90.0, 90.0)?;
        validation::in_range("longitude", self.longitude, -180.0, 180.0)?;
        changes.set_some("latitude", &mut record.latitude, self.latitude);
        changes.set_some("longitude", &mut record.longitude, self.longitude);
        if let Some(status) = self.status {
            changes.set("status", &mut record.status, status);
        }
        validation::non_negative_amount("fine_amount", self.fine_amount)?;
        changes.set_some("fine_amount", &mut record.fine_amount, self.fine_amount);
        changes.set_some("paid_date", &mut record.paid_date, self.paid_date);
        changes.set_some("notes", &mut record.notes, self.notes.clone());

        Ok(Patched { record, changes })
    }
}

/// Optional, conjunctive filters for listing violations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationFilter {
    pub officer_id: Option<UserId>,
    pub status: Option<ViolationStatus>,
    pub violation_type: Option<ViolationType>,
    pub severity_level: Option<Severity>,
    /// Applied to `violation_date`
    #[serde(default)]
    pub window: DateWindow,
}

impl ViolationFilter {
    pub fn within(window: DateWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    /// True when the violation satisfies every supplied filter
    pub fn matches(&self, violation: &Violation) -> bool {
        self.officer_id.map_or(true, |o| violation.officer_id == o)
            && self.status.map_or(true, |s| violation.status == s)
            && self.violation_type.map_or(true, |t| violation.violation_type == t)
            && self.severity_level.map_or(true, |s| violation.severity_level == s)
            && self.window.contains(violation.violation_date)
    }
}

/// A violation with everything attached to it
#[derive(Debug, Clone, Serialize)]
pub struct ViolationDetails {
    pub violation: Violation,
    pub officer: Option<User>,
    pub seizures: Vec<Seizure>,
    pub infractions: Vec<Infraction>,
    pub evidence: Vec<Evidence>,
}

//! Evidence items with chain-of-custody tracking
//!
//! Evidence is never deleted. An item leaves the violation's live count when
//! its status moves to `destroyed`, `released` or `lost`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, EvidenceId, UserId, ViolationId};
use crate::changes::{ChangeSet, EntityUpdate, Patched};
use crate::validation;

domain_enum! {
    /// Kind of collected artifact
    EvidenceType, "evidence_type" {
        Photo => "photo",
        Video => "video",
        Audio => "audio",
        Document => "document",
        Physical => "physical",
        Digital => "digital",
        WitnessStatement => "witness_statement",
    }
}

domain_enum! {
    /// Custody status of an evidence item
    EvidenceStatus, "status" {
        Stored => "stored",
        Destroyed => "destroyed",
        Released => "released",
        Lost => "lost",
        Pending => "pending",
    }
}

impl EvidenceStatus {
    /// Statuses counted in `Violation::evidence_count`
    pub const ACTIVE: &'static [EvidenceStatus] = &[EvidenceStatus::Stored, EvidenceStatus::Pending];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

impl Default for EvidenceStatus {
    fn default() -> Self {
        EvidenceStatus::Stored
    }
}

/// A persisted evidence record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub evidence_number: String,
    pub violation_id: ViolationId,
    pub evidence_type: EvidenceType,
    pub description: String,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub collected_by: UserId,
    pub collection_date: DateTime<Utc>,
    pub collection_location: Option<String>,
    pub chain_of_custody: Option<String>,
    pub storage_location: Option<String>,
    pub status: EvidenceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for logging a newly collected evidence item
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvidence {
    pub evidence_number: String,
    pub violation_id: ViolationId,
    pub evidence_type: EvidenceType,
    pub description: String,
    pub collected_by: UserId,
    pub collection_date: DateTime<Utc>,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub collection_location: Option<String>,
    pub chain_of_custody: Option<String>,
    pub storage_location: Option<String>,
    pub notes: Option<String>,
}

impl NewEvidence {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("evidence_number", &self.evidence_number)?;
        validation::require_text("description", &self.description)?;
        validation::non_negative_int("file_size", self.file_size)?;
        Ok(())
    }
}

/// Allow-listed mutable evidence fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceUpdate {
    pub description: Option<String>,
    pub storage_location: Option<String>,
    pub status: Option<EvidenceStatus>,
    pub chain_of_custody: Option<String>,
    pub notes: Option<String>,
}

impl EntityUpdate<Evidence> for EvidenceUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, current: &Evidence, _now: DateTime<Utc>) -> Result<Patched<Evidence>, CoreError> {
        let mut record = current.clone();
        let mut changes = ChangeSet::new();

        if let Some(description) = &self.description {
            validation::require_text("description", description)?;
            changes.set("description", &mut record.description, description.clone());
        }
        changes.set_some("storage_location", &mut record.storage_location, self.storage_location.clone());
        if let Some(status) = self.status {
            changes.set("status", &mut record.status, status);
        }
        changes.set_some("chain_of_custody", &mut record.chain_of_custody, self.chain_of_custody.clone());
        changes.set_some("notes", &mut record.notes, self.notes.clone());

        Ok(Patched { record, changes })
    }
}

/// Optional, conjunctive filters for listing evidence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFilter {
    pub violation_id: Option<ViolationId>,
    pub status: Option<EvidenceStatus>,
    pub evidence_type: Option<EvidenceType>,
}

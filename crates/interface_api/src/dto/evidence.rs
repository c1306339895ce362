//! Evidence DTOs

use chrono::{DateTime, Utc};
use core_kernel::{UserId, ViolationId};
use domain_case::{EvidenceFilter, EvidenceUpdate, NewEvidence};
use serde::Deserialize;
use validator::Validate;

use super::{parse_enum, parse_opt};
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEvidenceRequest {
    #[validate(length(min = 1))]
    pub evidence_number: String,
    pub violation_id: i64,
    pub evidence_type: String,
    #[validate(length(min = 1))]
    pub description: String,
    /// Collecting user; defaults to the caller
    pub collected_by: Option<i64>,
    pub collection_date: DateTime<Utc>,
    pub file_path: Option<String>,
    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub collection_location: Option<String>,
    pub chain_of_custody: Option<String>,
    pub storage_location: Option<String>,
    pub notes: Option<String>,
}

impl CreateEvidenceRequest {
    pub fn into_domain(self, caller: UserId) -> Result<NewEvidence, ApiError> {
        self.validate()?;
        Ok(NewEvidence {
            evidence_type: parse_enum(&self.evidence_type)?,
            violation_id: ViolationId::new(self.violation_id),
            collected_by: self.collected_by.map(UserId::new).unwrap_or(caller),
            evidence_number: self.evidence_number,
            description: self.description,
            collection_date: self.collection_date,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: self.mime_type,
            collection_location: self.collection_location,
            chain_of_custody: self.chain_of_custody,
            storage_location: self.storage_location,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEvidenceRequest {
    pub description: Option<String>,
    pub storage_location: Option<String>,
    pub status: Option<String>,
    pub chain_of_custody: Option<String>,
    pub notes: Option<String>,
}

impl UpdateEvidenceRequest {
    pub fn into_domain(self) -> Result<EvidenceUpdate, ApiError> {
        self.validate()?;
        Ok(EvidenceUpdate {
            status: parse_opt(self.status.as_deref())?,
            description: self.description,
            storage_location: self.storage_location,
            chain_of_custody: self.chain_of_custody,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EvidenceListQuery {
    pub violation_id: Option<i64>,
    pub status: Option<String>,
    pub evidence_type: Option<String>,
}

impl EvidenceListQuery {
    pub fn filter(&self) -> Result<EvidenceFilter, ApiError> {
        Ok(EvidenceFilter {
            violation_id: self.violation_id.map(ViolationId::new),
            status: parse_opt(self.status.as_deref())?,
            evidence_type: parse_opt(self.evidence_type.as_deref())?,
        })
    }
}

//! Evidence repository
//!
//! Owns `violations.evidence_count`. The count is recomputed from the
//! evidence rows inside the same transaction as every evidence write, never
//! adjusted incrementally. Only active items (`stored`, `pending`) count, so
//! marking an item destroyed, released or lost removes it from the total.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use core_kernel::{EvidenceId, UserId, ViolationId};
use domain_case::{
    EntityUpdate, Evidence, EvidenceFilter, EvidenceStatus, EvidenceUpdate, NewEvidence,
};

use super::{require_user, require_violation, UpdateOutcome};
use crate::codec::parse_enum;
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;
use crate::schema::in_list;

const ENTITY: &str = "Evidence";

const COLUMNS: &str = "id, evidence_number, violation_id, evidence_type, description, file_path, file_size, \
                       mime_type, collected_by, collection_date, collection_location, chain_of_custody, \
                       storage_location, status, notes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct EvidenceRow {
    id: i64,
    evidence_number: String,
    violation_id: i64,
    evidence_type: String,
    description: String,
    file_path: Option<String>,
    file_size: Option<i64>,
    mime_type: Option<String>,
    collected_by: i64,
    collection_date: DateTime<Utc>,
    collection_location: Option<String>,
    chain_of_custody: Option<String>,
    storage_location: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EvidenceRow> for Evidence {
    type Error = DatabaseError;

    fn try_from(row: EvidenceRow) -> Result<Self, Self::Error> {
        Ok(Evidence {
            id: EvidenceId::new(row.id),
            evidence_type: parse_enum("evidence_type", &row.evidence_type)?,
            status: parse_enum("status", &row.status)?,
            evidence_number: row.evidence_number,
            violation_id: ViolationId::new(row.violation_id),
            description: row.description,
            file_path: row.file_path,
            file_size: row.file_size,
            mime_type: row.mime_type,
            collected_by: UserId::new(row.collected_by),
            collection_date: row.collection_date,
            collection_location: row.collection_location,
            chain_of_custody: row.chain_of_custody,
            storage_location: row.storage_location,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn fetch(conn: &mut SqliteConnection, id: EvidenceId) -> Result<Option<Evidence>, DatabaseError> {
    sqlx::query_as::<_, EvidenceRow>(&format!("SELECT {} FROM evidence WHERE id = ?", COLUMNS))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .map(Evidence::try_from)
        .transpose()
}

/// Recomputes and stores the active evidence count of one violation
async fn recount_in(conn: &mut SqliteConnection, violation_id: ViolationId) -> Result<Option<i64>, DatabaseError> {
    let active: Vec<&str> = EvidenceStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
    let sql = format!(
        r#"
        UPDATE violations
        SET evidence_count = (
            SELECT COUNT(*) FROM evidence WHERE violation_id = ?1 AND {}
        )
        WHERE id = ?1
        RETURNING evidence_count
        "#,
        in_list("status", &active)
    );
    let count: Option<i64> = sqlx::query_scalar(&sql)
        .bind(violation_id.get())
        .fetch_optional(&mut *conn)
        .await?;
    debug!(violation_id = violation_id.get(), evidence_count = ?count, "Evidence recounted");
    Ok(count)
}

/// Repository for collected evidence
#[derive(Debug, Clone)]
pub struct EvidenceRepository {
    pool: DatabasePool,
}

impl EvidenceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Records an evidence item and refreshes the parent's evidence count
    #[instrument(skip(self, evidence), fields(evidence_number = %evidence.evidence_number, violation_id = %evidence.violation_id))]
    pub async fn create(&self, evidence: NewEvidence) -> Result<Evidence, DatabaseError> {
        evidence.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        require_violation(&mut tx, ENTITY, evidence.violation_id).await?;
        require_user(&mut tx, ENTITY, "collected_by", evidence.collected_by).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO evidence (
                evidence_number, violation_id, evidence_type, description, file_path, file_size,
                mime_type, collected_by, collection_date, collection_location, chain_of_custody,
                storage_location, status, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'stored', ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&evidence.evidence_number)
        .bind(evidence.violation_id.get())
        .bind(evidence.evidence_type.as_str())
        .bind(&evidence.description)
        .bind(&evidence.file_path)
        .bind(evidence.file_size)
        .bind(&evidence.mime_type)
        .bind(evidence.collected_by.get())
        .bind(evidence.collection_date)
        .bind(&evidence.collection_location)
        .bind(&evidence.chain_of_custody)
        .bind(&evidence.storage_location)
        .bind(&evidence.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        recount_in(&mut tx, evidence.violation_id).await?;
        let created = fetch(&mut tx, EvidenceId::new(id))
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        tx.commit().await?;

        info!(evidence_id = id, evidence_type = %created.evidence_type, "Evidence recorded");
        Ok(created)
    }

    pub async fn get(&self, id: EvidenceId) -> Result<Evidence, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
    }

    /// Applies the allow-listed fields of `update`
    ///
    /// A status change refreshes the parent's evidence count in the same
    /// transaction.
    #[instrument(skip(self, update), fields(evidence_id = %id))]
    pub async fn update(&self, id: EvidenceId, update: EvidenceUpdate) -> Result<UpdateOutcome<Evidence>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let current = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;

        if update.is_empty() {
            debug!("Empty update");
            return Ok(UpdateOutcome::Unchanged);
        }

        let now = Utc::now();
        let patched = update
            .apply(&current, now)
            .map_err(|e| DatabaseError::invalid(ENTITY, e))?;
        if patched.changes.is_empty() {
            debug!("Update matched stored values");
            return Ok(UpdateOutcome::Unchanged);
        }

        let mut after = patched.record;
        after.updated_at = now;

        sqlx::query(
            r#"
            UPDATE evidence
            SET description = ?, storage_location = ?, status = ?, chain_of_custody = ?,
                notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.description)
        .bind(&after.storage_location)
        .bind(after.status.as_str())
        .bind(&after.chain_of_custody)
        .bind(&after.notes)
        .bind(after.updated_at)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        if patched.changes.contains("status") {
            recount_in(&mut tx, after.violation_id).await?;
        }
        tx.commit().await?;

        info!(changed = patched.changes.len(), status = %after.status, "Evidence updated");
        Ok(UpdateOutcome::Updated {
            before: current,
            after,
            changes: patched.changes,
        })
    }

    /// Lists evidence matching every supplied filter, newest record first
    pub async fn list(&self, filter: &EvidenceFilter) -> Result<Vec<Evidence>, DatabaseError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM evidence WHERE 1=1", COLUMNS));
        if let Some(violation) = filter.violation_id {
            query.push(" AND violation_id = ").push_bind(violation.get());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = filter.evidence_type {
            query.push(" AND evidence_type = ").push_bind(kind.as_str());
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build_query_as::<EvidenceRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed evidence");
        rows.into_iter().map(Evidence::try_from).collect()
    }

    /// Evidence attached to one violation, most recently collected first
    pub async fn list_by_violation(&self, violation_id: ViolationId) -> Result<Vec<Evidence>, DatabaseError> {
        let rows = sqlx::query_as::<_, EvidenceRow>(&format!(
            "SELECT {} FROM evidence WHERE violation_id = ? ORDER BY collection_date DESC, id DESC",
            COLUMNS
        ))
        .bind(violation_id.get())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Evidence::try_from).collect()
    }

    /// Recomputes `evidence_count` for a violation and returns it
    ///
    /// Repairs counts left stale by writes made outside this repository.
    #[instrument(skip(self), fields(violation_id = %violation_id))]
    pub async fn recount(&self, violation_id: ViolationId) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let count = recount_in(&mut tx, violation_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Violation", violation_id))?;
        tx.commit().await?;
        Ok(count)
    }
}

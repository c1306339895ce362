//! Violation repository
//!
//! The violation is the aggregate root: seizures, infractions and evidence
//! all hang off it. `violation_number` is fixed at creation and is not part
//! of the update surface. `evidence_count` is owned by the evidence
//! repository and is never written here.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use core_kernel::{UserId, ViolationId};
use domain_case::{
    EntityUpdate, EvidenceFilter, InfractionFilter, NewViolation, SeizureFilter, Violation,
    ViolationDetails, ViolationFilter, ViolationUpdate,
};

use super::{require_user, EvidenceRepository, InfractionRepository, SeizureRepository, UpdateOutcome};
use crate::codec::{amount_text, parse_amount, parse_enum};
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;

const ENTITY: &str = "Violation";

const COLUMNS: &str = "id, violation_number, violator_name, violator_license_number, violator_phone, \
                       violator_address, violation_date, violation_type, severity_level, description, \
                       location, latitude, longitude, officer_id, status, fine_amount, paid_date, notes, \
                       evidence_count, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ViolationRow {
    id: i64,
    violation_number: String,
    violator_name: String,
    violator_license_number: Option<String>,
    violator_phone: Option<String>,
    violator_address: Option<String>,
    violation_date: DateTime<Utc>,
    violation_type: String,
    severity_level: String,
    description: Option<String>,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    officer_id: i64,
    status: String,
    fine_amount: Option<String>,
    paid_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    evidence_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ViolationRow> for Violation {
    type Error = DatabaseError;

    fn try_from(row: ViolationRow) -> Result<Self, Self::Error> {
        Ok(Violation {
            id: ViolationId::new(row.id),
            violation_type: parse_enum("violation_type", &row.violation_type)?,
            severity_level: parse_enum("severity_level", &row.severity_level)?,
            status: parse_enum("status", &row.status)?,
            fine_amount: parse_amount("fine_amount", row.fine_amount.as_deref())?,
            violation_number: row.violation_number,
            violator_name: row.violator_name,
            violator_license_number: row.violator_license_number,
            violator_phone: row.violator_phone,
            violator_address: row.violator_address,
            violation_date: row.violation_date,
            description: row.description,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            officer_id: UserId::new(row.officer_id),
            paid_date: row.paid_date,
            notes: row.notes,
            evidence_count: row.evidence_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: ViolationId,
) -> Result<Option<Violation>, DatabaseError> {
    sqlx::query_as::<_, ViolationRow>(&format!("SELECT {} FROM violations WHERE id = ?", COLUMNS))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .map(Violation::try_from)
        .transpose()
}

/// Repository for violation cases
#[derive(Debug, Clone)]
pub struct ViolationRepository {
    pool: DatabasePool,
}

impl ViolationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Records a new violation
    ///
    /// The recording officer must exist. New cases start `open` with no
    /// evidence.
    ///
    /// # Errors
    ///
    /// * `Validation` - a required field is blank, a value is out of range,
    ///   or `officer_id` does not resolve
    /// * `DuplicateEntry` - `violation_number` is already used
    #[instrument(skip(self, violation), fields(violation_number = %violation.violation_number))]
    pub async fn create(&self, violation: NewViolation) -> Result<Violation, DatabaseError> {
        violation.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        require_user(&mut tx, ENTITY, "officer_id", violation.officer_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO violations (
                violation_number, violator_name, violator_license_number, violator_phone,
                violator_address, violation_date, violation_type, severity_level, description,
                location, latitude, longitude, officer_id, status, fine_amount, paid_date, notes,
                evidence_count, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'open', ?, NULL, ?, 0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&violation.violation_number)
        .bind(&violation.violator_name)
        .bind(&violation.violator_license_number)
        .bind(&violation.violator_phone)
        .bind(&violation.violator_address)
        .bind(violation.violation_date)
        .bind(violation.violation_type.as_str())
        .bind(violation.severity_level.as_str())
        .bind(&violation.description)
        .bind(&violation.location)
        .bind(violation.latitude)
        .bind(violation.longitude)
        .bind(violation.officer_id.get())
        .bind(amount_text(violation.fine_amount))
        .bind(&violation.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let created = fetch(&mut tx, ViolationId::new(id))
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        tx.commit().await?;

        info!(violation_id = id, officer_id = %created.officer_id, "Violation created");
        Ok(created)
    }

    #[instrument(skip(self), fields(violation_id = %id))]
    pub async fn get(&self, id: ViolationId) -> Result<Violation, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
    }

    /// Retrieves a violation by its external-facing number
    pub async fn get_by_number(&self, number: &str) -> Result<Violation, DatabaseError> {
        let row = sqlx::query_as::<_, ViolationRow>(&format!(
            "SELECT {} FROM violations WHERE violation_number = ?",
            COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Violation '{}' not found", number)))?;
        Violation::try_from(row)
    }

    /// Applies the allow-listed fields of `update`
    #[instrument(skip(self, update), fields(violation_id = %id))]
    pub async fn update(
        &self,
        id: ViolationId,
        update: ViolationUpdate,
    ) -> Result<UpdateOutcome<Violation>, DatabaseError> {
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
            UPDATE violations
            SET violator_name = ?, violator_license_number = ?, violator_phone = ?,
                violator_address = ?, violation_type = ?, severity_level = ?, description = ?,
                location = ?, latitude = ?, longitude = ?, status = ?, fine_amount = ?,
                paid_date = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.violator_name)
        .bind(&after.violator_license_number)
        .bind(&after.violator_phone)
        .bind(&after.violator_address)
        .bind(after.violation_type.as_str())
        .bind(after.severity_level.as_str())
        .bind(&after.description)
        .bind(&after.location)
        .bind(after.latitude)
        .bind(after.longitude)
        .bind(after.status.as_str())
        .bind(amount_text(after.fine_amount))
        .bind(after.paid_date)
        .bind(&after.notes)
        .bind(after.updated_at)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;

        info!(changed = patched.changes.len(), status = %after.status, "Violation updated");
        Ok(UpdateOutcome::Updated {
            before: current,
            after,
            changes: patched.changes,
        })
    }

    /// Lists violations matching every supplied filter, latest violation date first
    pub async fn list(&self, filter: &ViolationFilter) -> Result<Vec<Violation>, DatabaseError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM violations WHERE 1=1", COLUMNS));
        if let Some(officer) = filter.officer_id {
            query.push(" AND officer_id = ").push_bind(officer.get());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = filter.violation_type {
            query.push(" AND violation_type = ").push_bind(kind.as_str());
        }
        if let Some(severity) = filter.severity_level {
            query.push(" AND severity_level = ").push_bind(severity.as_str());
        }
        if let Some(start) = filter.window.start {
            query.push(" AND violation_date >= ").push_bind(start);
        }
        if let Some(end) = filter.window.end {
            query.push(" AND violation_date <= ").push_bind(end);
        }
        query.push(" ORDER BY violation_date DESC, id DESC");

        let rows = query.build_query_as::<ViolationRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed violations");
        rows.into_iter().map(Violation::try_from).collect()
    }

    /// A violation with its officer and every attached record
    #[instrument(skip(self), fields(violation_id = %id))]
    pub async fn details(&self, id: ViolationId) -> Result<ViolationDetails, DatabaseError> {
        let (violation, officer) = {
            let mut conn = self.pool.acquire().await?;
            let violation = fetch(&mut conn, id)
                .await?
                .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
            let officer = super::user::fetch(&mut conn, violation.officer_id).await?;
            (violation, officer)
        };

        let seizures = SeizureRepository::new(self.pool.clone())
            .list(&SeizureFilter {
                violation_id: Some(id),
                ..SeizureFilter::default()
            })
            .await?;
        let infractions = InfractionRepository::new(self.pool.clone())
            .list(&InfractionFilter {
                violation_id: Some(id),
                ..InfractionFilter::default()
            })
            .await?;
        let evidence = EvidenceRepository::new(self.pool.clone())
            .list(&EvidenceFilter {
                violation_id: Some(id),
                ..EvidenceFilter::default()
            })
            .await?;

        Ok(ViolationDetails {
            violation,
            officer,
            seizures,
            infractions,
            evidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_pool, new_violation, seed_officer};
    use domain_case::ViolationStatus;

    #[tokio::test]
    async fn test_unknown_officer_rejected() {
        let repo = ViolationRepository::new(memory_pool().await);
        let err = repo.create(new_violation("V-1", UserId::new(404))).await.unwrap_err();
        assert_eq!(err.field(), Some("officer_id"));
        assert!(repo.list(&ViolationFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_update_keeps_timestamp() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let repo = ViolationRepository::new(pool);
        let created = repo.create(new_violation("V-2", officer)).await.unwrap();

        let outcome = repo.update(created.id, ViolationUpdate::default()).await.unwrap();
        assert!(!outcome.is_changed());
        assert_eq!(repo.get(created.id).await.unwrap().updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let repo = ViolationRepository::new(pool);
        let a = repo.create(new_violation("V-3", officer)).await.unwrap();
        repo.create(new_violation("V-4", officer)).await.unwrap();
        repo.update(
            a.id,
            ViolationUpdate {
                status: Some(ViolationStatus::Closed),
                ..ViolationUpdate::default()
            },
        )
        .await
        .unwrap();

        let closed = repo
            .list(&ViolationFilter {
                status: Some(ViolationStatus::Closed),
                ..ViolationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].violation_number, "V-3");
        assert_eq!(repo.get_by_number("V-4").await.unwrap().status, ViolationStatus::Open);
    }
}

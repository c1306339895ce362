//! Seizure repository
//!
//! A seizure is recorded against an existing violation. Release metadata is
//! written only when an update moves the item out of storage; the rule
//! itself lives on `SeizureUpdate`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use core_kernel::{SeizureId, UserId, ViolationId};
use domain_case::{EntityUpdate, NewSeizure, Seizure, SeizureFilter, SeizureUpdate};

use super::{require_user, require_user_if_set, require_violation, UpdateOutcome};
use crate::codec::{amount_text, from_json, parse_amount, parse_enum, to_json};
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;

const ENTITY: &str = "Seizure";

const COLUMNS: &str = "id, seizure_number, violation_id, item_description, item_quantity, item_category, \
                       estimated_value, serial_number, storage_location, officer_id, seizure_date, \
                       release_date, release_authorized_by, release_reason, status, condition_notes, \
                       photo_evidence_urls, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SeizureRow {
    id: i64,
    seizure_number: String,
    violation_id: i64,
    item_description: String,
    item_quantity: i64,
    item_category: String,
    estimated_value: Option<String>,
    serial_number: Option<String>,
    storage_location: Option<String>,
    officer_id: i64,
    seizure_date: DateTime<Utc>,
    release_date: Option<DateTime<Utc>>,
    release_authorized_by: Option<i64>,
    release_reason: Option<String>,
    status: String,
    condition_notes: Option<String>,
    photo_evidence_urls: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SeizureRow> for Seizure {
    type Error = DatabaseError;

    fn try_from(row: SeizureRow) -> Result<Self, Self::Error> {
        Ok(Seizure {
            id: SeizureId::new(row.id),
            item_category: parse_enum("item_category", &row.item_category)?,
            status: parse_enum("status", &row.status)?,
            estimated_value: parse_amount("estimated_value", row.estimated_value.as_deref())?,
            photo_evidence_urls: from_json("photo_evidence_urls", &row.photo_evidence_urls)?,
            seizure_number: row.seizure_number,
            violation_id: ViolationId::new(row.violation_id),
            item_description: row.item_description,
            item_quantity: row.item_quantity,
            serial_number: row.serial_number,
            storage_location: row.storage_location,
            officer_id: UserId::new(row.officer_id),
            seizure_date: row.seizure_date,
            release_date: row.release_date,
            release_authorized_by: row.release_authorized_by.map(UserId::new),
            release_reason: row.release_reason,
            condition_notes: row.condition_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn fetch(conn: &mut SqliteConnection, id: SeizureId) -> Result<Option<Seizure>, DatabaseError> {
    sqlx::query_as::<_, SeizureRow>(&format!("SELECT {} FROM seizures WHERE id = ?", COLUMNS))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .map(Seizure::try_from)
        .transpose()
}

/// Repository for seized property
#[derive(Debug, Clone)]
pub struct SeizureRepository {
    pool: DatabasePool,
}

impl SeizureRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Records a seizure under an existing violation
    ///
    /// The parent violation and the seizing officer are resolved before the
    /// insert; either missing is a validation error and nothing is written.
    #[instrument(skip(self, seizure), fields(seizure_number = %seizure.seizure_number, violation_id = %seizure.violation_id))]
    pub async fn create(&self, seizure: NewSeizure) -> Result<Seizure, DatabaseError> {
        seizure.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;
        let urls = to_json("photo_evidence_urls", &seizure.photo_evidence_urls)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        require_violation(&mut tx, ENTITY, seizure.violation_id).await?;
        require_user(&mut tx, ENTITY, "officer_id", seizure.officer_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO seizures (
                seizure_number, violation_id, item_description, item_quantity, item_category,
                estimated_value, serial_number, storage_location, officer_id, seizure_date,
                status, condition_notes, photo_evidence_urls, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'stored', ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&seizure.seizure_number)
        .bind(seizure.violation_id.get())
        .bind(&seizure.item_description)
        .bind(seizure.item_quantity)
        .bind(seizure.item_category.as_str())
        .bind(amount_text(seizure.estimated_value))
        .bind(&seizure.serial_number)
        .bind(&seizure.storage_location)
        .bind(seizure.officer_id.get())
        .bind(seizure.seizure_date)
        .bind(&seizure.condition_notes)
        .bind(urls)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let created = fetch(&mut tx, SeizureId::new(id))
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        tx.commit().await?;

        info!(seizure_id = id, category = %created.item_category, "Seizure recorded");
        Ok(created)
    }

    pub async fn get(&self, id: SeizureId) -> Result<Seizure, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
    }

    /// Applies the allow-listed fields of `update`
    ///
    /// A transition from `stored` into `released`, `destroyed` or
    /// `auctioned` stamps `release_date` with the current time unless one is
    /// supplied.
    #[instrument(skip(self, update), fields(seizure_id = %id))]
    pub async fn update(&self, id: SeizureId, update: SeizureUpdate) -> Result<UpdateOutcome<Seizure>, DatabaseError> {
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
        require_user_if_set(&mut tx, ENTITY, "release_authorized_by", update.release_authorized_by).await?;

        let mut after = patched.record;
        after.updated_at = now;
        let urls = to_json("photo_evidence_urls", &after.photo_evidence_urls)?;

        sqlx::query(
            r#"
            UPDATE seizures
            SET item_description = ?, item_quantity = ?, item_category = ?, estimated_value = ?,
                serial_number = ?, storage_location = ?, status = ?, condition_notes = ?,
                release_date = ?, release_reason = ?, release_authorized_by = ?,
                photo_evidence_urls = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.item_description)
        .bind(after.item_quantity)
        .bind(after.item_category.as_str())
        .bind(amount_text(after.estimated_value))
        .bind(&after.serial_number)
        .bind(&after.storage_location)
        .bind(after.status.as_str())
        .bind(&after.condition_notes)
        .bind(after.release_date)
        .bind(&after.release_reason)
        .bind(after.release_authorized_by.map(|u| u.get()))
        .bind(urls)
        .bind(after.updated_at)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;

        info!(changed = patched.changes.len(), status = %after.status, "Seizure updated");
        Ok(UpdateOutcome::Updated {
            before: current,
            after,
            changes: patched.changes,
        })
    }

    /// Lists seizures matching every supplied filter, latest seizure date first
    pub async fn list(&self, filter: &SeizureFilter) -> Result<Vec<Seizure>, DatabaseError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM seizures WHERE 1=1", COLUMNS));
        if let Some(violation) = filter.violation_id {
            query.push(" AND violation_id = ").push_bind(violation.get());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = filter.item_category {
            query.push(" AND item_category = ").push_bind(category.as_str());
        }
        if let Some(officer) = filter.officer_id {
            query.push(" AND officer_id = ").push_bind(officer.get());
        }
        if let Some(start) = filter.window.start {
            query.push(" AND seizure_date >= ").push_bind(start);
        }
        if let Some(end) = filter.window.end {
            query.push(" AND seizure_date <= ").push_bind(end);
        }
        query.push(" ORDER BY seizure_date DESC, id DESC");

        let rows = query.build_query_as::<SeizureRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed seizures");
        rows.into_iter().map(Seizure::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_pool, seed_officer, seed_violation};
    use domain_case::{SeizureCategory, SeizureStatus};

    fn new_seizure(number: &str, violation_id: ViolationId, officer: UserId) -> NewSeizure {
        NewSeizure {
            seizure_number: number.into(),
            violation_id,
            item_description: "Unregistered motorcycle".into(),
            item_quantity: 1,
            item_category: SeizureCategory::Vehicle,
            officer_id: officer,
            seizure_date: Utc::now(),
            estimated_value: None,
            serial_number: Some("CH-99812".into()),
            storage_location: None,
            condition_notes: None,
            photo_evidence_urls: vec!["file:///photos/1.jpg".into()],
        }
    }

    #[tokio::test]
    async fn test_missing_violation_rejected() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let repo = SeizureRepository::new(pool);
        let err = repo
            .create(new_seizure("S-1", ViolationId::new(9999), officer))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("violation_id"));
        assert!(repo.list(&SeizureFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_release_records_authorizer() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violation = seed_violation(&pool, "V-1", officer).await;
        let repo = SeizureRepository::new(pool);
        let seizure = repo.create(new_seizure("S-2", violation, officer)).await.unwrap();
        assert_eq!(seizure.photo_evidence_urls.len(), 1);

        let outcome = repo
            .update(
                seizure.id,
                SeizureUpdate {
                    status: Some(SeizureStatus::Released),
                    release_authorized_by: Some(officer),
                    release_reason: Some("Registration produced".into()),
                    ..SeizureUpdate::default()
                },
            )
            .await
            .unwrap();
        let after = outcome.into_after().unwrap();
        assert!(after.release_date.is_some());
        assert_eq!(repo.get(seizure.id).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_unknown_authorizer_rejected() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violation = seed_violation(&pool, "V-1", officer).await;
        let repo = SeizureRepository::new(pool);
        let seizure = repo.create(new_seizure("S-3", violation, officer)).await.unwrap();

        let err = repo
            .update(
                seizure.id,
                SeizureUpdate {
                    status: Some(SeizureStatus::Destroyed),
                    release_authorized_by: Some(UserId::new(555)),
                    ..SeizureUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("release_authorized_by"));
        assert_eq!(repo.get(seizure.id).await.unwrap().status, SeizureStatus::Stored);
    }
}

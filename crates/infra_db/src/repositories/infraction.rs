//! Infraction repository
//!
//! Infractions carry the judicial side of a violation. Court fields fill in
//! through updates as the case proceeds; prosecutor and judge must be known
//! users.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use core_kernel::{InfractionId, UserId, ViolationId};
use domain_case::{EntityUpdate, Infraction, InfractionFilter, InfractionUpdate, NewInfraction};

use super::{require_user_if_set, require_violation, UpdateOutcome};
use crate::codec::{amount_text, parse_amount, parse_enum};
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;

const ENTITY: &str = "Infraction";

const COLUMNS: &str = "id, infraction_number, violation_id, infraction_type, points, description, \
                       statute_reference, minimum_fine, maximum_fine, status, court_appearance_date, \
                       court_location, case_number, prosecutor_id, judge_id, outcome, sentence_details, \
                       probation_period_months, created_at, updated_at";

#[derive(Debug, FromRow)]
struct InfractionRow {
    id: i64,
    infraction_number: String,
    violation_id: i64,
    infraction_type: String,
    points: i64,
    description: Option<String>,
    statute_reference: Option<String>,
    minimum_fine: Option<String>,
    maximum_fine: Option<String>,
    status: String,
    court_appearance_date: Option<DateTime<Utc>>,
    court_location: Option<String>,
    case_number: Option<String>,
    prosecutor_id: Option<i64>,
    judge_id: Option<i64>,
    outcome: Option<String>,
    sentence_details: Option<String>,
    probation_period_months: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InfractionRow> for Infraction {
    type Error = DatabaseError;

    fn try_from(row: InfractionRow) -> Result<Self, Self::Error> {
        Ok(Infraction {
            id: InfractionId::new(row.id),
            status: parse_enum("status", &row.status)?,
            minimum_fine: parse_amount("minimum_fine", row.minimum_fine.as_deref())?,
            maximum_fine: parse_amount("maximum_fine", row.maximum_fine.as_deref())?,
            infraction_number: row.infraction_number,
            violation_id: ViolationId::new(row.violation_id),
            infraction_type: row.infraction_type,
            points: row.points,
            description: row.description,
            statute_reference: row.statute_reference,
            court_appearance_date: row.court_appearance_date,
            court_location: row.court_location,
            case_number: row.case_number,
            prosecutor_id: row.prosecutor_id.map(UserId::new),
            judge_id: row.judge_id.map(UserId::new),
            outcome: row.outcome,
            sentence_details: row.sentence_details,
            probation_period_months: row.probation_period_months,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn fetch(conn: &mut SqliteConnection, id: InfractionId) -> Result<Option<Infraction>, DatabaseError> {
    sqlx::query_as::<_, InfractionRow>(&format!("SELECT {} FROM infractions WHERE id = ?", COLUMNS))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .map(Infraction::try_from)
        .transpose()
}

/// Repository for legal infractions
#[derive(Debug, Clone)]
pub struct InfractionRepository {
    pool: DatabasePool,
}

impl InfractionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Records an infraction under an existing violation; new infractions are `pending`
    #[instrument(skip(self, infraction), fields(infraction_number = %infraction.infraction_number, violation_id = %infraction.violation_id))]
    pub async fn create(&self, infraction: NewInfraction) -> Result<Infraction, DatabaseError> {
        infraction.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        require_violation(&mut tx, ENTITY, infraction.violation_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO infractions (
                infraction_number, violation_id, infraction_type, points, description,
                statute_reference, minimum_fine, maximum_fine, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            RETURNING id
            "#,
        )
        .bind(&infraction.infraction_number)
        .bind(infraction.violation_id.get())
        .bind(&infraction.infraction_type)
        .bind(infraction.points)
        .bind(&infraction.description)
        .bind(&infraction.statute_reference)
        .bind(amount_text(infraction.minimum_fine))
        .bind(amount_text(infraction.maximum_fine))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let created = fetch(&mut tx, InfractionId::new(id))
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        tx.commit().await?;

        info!(infraction_id = id, points = created.points, "Infraction recorded");
        Ok(created)
    }

    pub async fn get(&self, id: InfractionId) -> Result<Infraction, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
    }

    /// Applies the allow-listed fields of `update`
    ///
    /// Fine bounds are checked on the merged record, so lowering only the
    /// maximum below a stored minimum is rejected.
    #[instrument(skip(self, update), fields(infraction_id = %id))]
    pub async fn update(
        &self,
        id: InfractionId,
        update: InfractionUpdate,
    ) -> Result<UpdateOutcome<Infraction>, DatabaseError> {
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
        require_user_if_set(&mut tx, ENTITY, "prosecutor_id", update.prosecutor_id).await?;
        require_user_if_set(&mut tx, ENTITY, "judge_id", update.judge_id).await?;

        let mut after = patched.record;
        after.updated_at = now;

        sqlx::query(
            r#"
            UPDATE infractions
            SET infraction_type = ?, points = ?, description = ?, statute_reference = ?,
                minimum_fine = ?, maximum_fine = ?, status = ?, court_appearance_date = ?,
                court_location = ?, case_number = ?, prosecutor_id = ?, judge_id = ?,
                outcome = ?, sentence_details = ?, probation_period_months = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.infraction_type)
        .bind(after.points)
        .bind(&after.description)
        .bind(&after.statute_reference)
        .bind(amount_text(after.minimum_fine))
        .bind(amount_text(after.maximum_fine))
        .bind(after.status.as_str())
        .bind(after.court_appearance_date)
        .bind(&after.court_location)
        .bind(&after.case_number)
        .bind(after.prosecutor_id.map(|u| u.get()))
        .bind(after.judge_id.map(|u| u.get()))
        .bind(&after.outcome)
        .bind(&after.sentence_details)
        .bind(after.probation_period_months)
        .bind(after.updated_at)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;

        info!(changed = patched.changes.len(), status = %after.status, "Infraction updated");
        Ok(UpdateOutcome::Updated {
            before: current,
            after,
            changes: patched.changes,
        })
    }

    /// Lists infractions matching every supplied filter, newest first
    ///
    /// The window applies to the creation time.
    pub async fn list(&self, filter: &InfractionFilter) -> Result<Vec<Infraction>, DatabaseError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM infractions WHERE 1=1", COLUMNS));
        if let Some(violation) = filter.violation_id {
            query.push(" AND violation_id = ").push_bind(violation.get());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = &filter.infraction_type {
            query.push(" AND infraction_type = ").push_bind(kind.clone());
        }
        if let Some(start) = filter.window.start {
            query.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = filter.window.end {
            query.push(" AND created_at <= ").push_bind(end);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build_query_as::<InfractionRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed infractions");
        rows.into_iter().map(Infraction::try_from).collect()
    }
}

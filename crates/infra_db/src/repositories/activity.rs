//! Activity log repository
//!
//! Append-only. The store rejects any UPDATE or DELETE on `activity_log`
//! through triggers, so this repository only ever inserts and reads.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::{debug, instrument};

use core_kernel::{ActivityLogId, UserId};
use domain_case::activity::MAX_ACTIVITY_LIMIT;
use domain_case::{ActivityLogEntry, ActivityQuery, EntityRef, NewActivity};

use super::require_user;
use crate::codec::{from_json, parse_enum, to_json};
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;

const ENTITY: &str = "ActivityLogEntry";

const COLUMNS: &str =
    "id, user_id, action_type, entity_type, entity_id, description, changes, ip_address, timestamp";

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: i64,
    user_id: i64,
    action_type: String,
    entity_type: Option<String>,
    entity_id: Option<i64>,
    description: String,
    changes: Option<String>,
    ip_address: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityLogEntry {
    type Error = DatabaseError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let entity = match (row.entity_type, row.entity_id) {
            (Some(kind), Some(id)) => Some(EntityRef::new(parse_enum("entity_type", &kind)?, id)),
            _ => None,
        };
        Ok(ActivityLogEntry {
            id: ActivityLogId::new(row.id),
            actor: UserId::new(row.user_id),
            action_type: parse_enum("action_type", &row.action_type)?,
            entity,
            description: row.description,
            changes: row.changes.as_deref().map(|c| from_json("changes", c)).transpose()?,
            ip_address: row.ip_address,
            timestamp: row.timestamp,
        })
    }
}

/// Repository for the audit trail
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: DatabasePool,
}

impl ActivityLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Appends one entry stamped with the current time
    ///
    /// # Errors
    ///
    /// * `Validation` - the actor is unknown or the description is blank
    #[instrument(skip(self, activity), fields(actor = %activity.actor, action = %activity.action_type))]
    pub async fn record(&self, activity: NewActivity) -> Result<ActivityLogEntry, DatabaseError> {
        activity.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;
        let changes = activity
            .changes
            .as_ref()
            .map(|c| to_json("changes", c))
            .transpose()?;

        let timestamp = Utc::now();
        let mut tx = self.pool.begin().await?;
        require_user(&mut tx, ENTITY, "user_id", activity.actor).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO activity_log (user_id, action_type, entity_type, entity_id, description,
                                      changes, ip_address, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(activity.actor.get())
        .bind(activity.action_type.as_str())
        .bind(activity.entity.map(|e| e.entity_type.as_str()))
        .bind(activity.entity.map(|e| e.entity_id))
        .bind(&activity.description)
        .bind(changes)
        .bind(&activity.ip_address)
        .bind(timestamp)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;

        debug!(activity_id = id, "Activity recorded");
        Ok(ActivityLogEntry {
            id: ActivityLogId::new(id),
            actor: activity.actor,
            action_type: activity.action_type,
            entity: activity.entity,
            description: activity.description,
            changes: activity.changes,
            ip_address: activity.ip_address,
            timestamp,
        })
    }

    /// Most recent entries, optionally for one actor, newest first
    pub async fn query(&self, query: &ActivityQuery) -> Result<Vec<ActivityLogEntry>, DatabaseError> {
        let mut sql = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM activity_log WHERE 1=1", COLUMNS));
        if let Some(actor) = query.actor {
            sql.push(" AND user_id = ").push_bind(actor.get());
        }
        sql.push(" ORDER BY timestamp DESC, id DESC LIMIT ")
            .push_bind(query.effective_limit());

        let rows = sql.build_query_as::<ActivityRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Queried activity log");
        rows.into_iter().map(ActivityLogEntry::try_from).collect()
    }

    /// History of one record, newest first
    pub async fn for_entity(&self, entity: EntityRef, limit: i64) -> Result<Vec<ActivityLogEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {} FROM activity_log WHERE entity_type = ? AND entity_id = ? \
             ORDER BY timestamp DESC, id DESC LIMIT ?",
            COLUMNS
        ))
        .bind(entity.entity_type.as_str())
        .bind(entity.entity_id)
        .bind(limit.clamp(1, MAX_ACTIVITY_LIMIT))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ActivityLogEntry::try_from).collect()
    }
}

//! Repository implementations for domain entities
//!
//! Each repository holds the shared store handle and runs every mutation in
//! its own transaction. Rows are read into flat `*Row` structs and converted
//! into domain records, so a malformed stored value is reported rather than
//! silently accepted.
//!
//! References to other rows are resolved inside the write transaction
//! before insert or update, so a dangling reference is reported as a
//! validation error and no partial row is ever written.

pub mod user;
pub mod violation;
pub mod seizure;
pub mod infraction;
pub mod evidence;
pub mod activity;
pub mod statistics;

pub use user::UserRepository;
pub use violation::ViolationRepository;
pub use seizure::SeizureRepository;
pub use infraction::InfractionRepository;
pub use evidence::EvidenceRepository;
pub use activity::ActivityLogRepository;
pub use statistics::StatisticsRepository;

use domain_case::ChangeSet;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::error::DatabaseError;

/// Result of a partial update
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome<T> {
    /// Nothing was supplied, or every supplied value matched the stored one
    Unchanged,
    Updated {
        before: T,
        after: T,
        changes: ChangeSet,
    },
}

impl<T> UpdateOutcome<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }

    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            UpdateOutcome::Updated { changes, .. } => Some(changes),
            UpdateOutcome::Unchanged => None,
        }
    }

    /// The record as stored after the update
    pub fn into_after(self) -> Option<T> {
        match self {
            UpdateOutcome::Updated { after, .. } => Some(after),
            UpdateOutcome::Unchanged => None,
        }
    }
}

async fn row_exists(conn: &mut SqliteConnection, table: &str, id: i64) -> Result<bool, DatabaseError> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Fails with a validation error naming `field` when the user does not exist
pub(crate) async fn require_user(
    conn: &mut SqliteConnection,
    entity: &str,
    field: &str,
    id: core_kernel::UserId,
) -> Result<(), DatabaseError> {
    if row_exists(conn, "users", id.get()).await? {
        Ok(())
    } else {
        tracing::warn!(entity, field, user_id = id.get(), "Rejected write with unknown user");
        Err(DatabaseError::unresolved(entity, field, id))
    }
}

/// Like [`require_user`] for optional references
pub(crate) async fn require_user_if_set(
    conn: &mut SqliteConnection,
    entity: &str,
    field: &str,
    id: Option<core_kernel::UserId>,
) -> Result<(), DatabaseError> {
    match id {
        Some(id) => require_user(conn, entity, field, id).await,
        None => Ok(()),
    }
}

/// Fails with a validation error when the parent violation does not exist
pub(crate) async fn require_violation(
    conn: &mut SqliteConnection,
    entity: &str,
    id: core_kernel::ViolationId,
) -> Result<(), DatabaseError> {
    if row_exists(conn, "violations", id.get()).await? {
        Ok(())
    } else {
        tracing::warn!(entity, violation_id = id.get(), "Rejected write under unknown violation");
        Err(DatabaseError::unresolved(entity, "violation_id", id))
    }
}

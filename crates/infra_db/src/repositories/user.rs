//! User repository
//!
//! Users are provisioned by an administrator and never hard-deleted; an
//! account is retired by clearing `is_active`. The stored credential is an
//! opaque hash and is never interpreted here.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use core_kernel::UserId;
use domain_case::{EntityUpdate, NewUser, User, UserFilter, UserUpdate};

use super::UpdateOutcome;
use crate::codec::parse_enum;
use crate::error::{classify, DatabaseError};
use crate::pool::DatabasePool;

const ENTITY: &str = "User";

const COLUMNS: &str = "id, username, email, password_hash, full_name, badge_number, role, \
                       department, phone_number, is_active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    full_name: String,
    badge_number: Option<String>,
    role: String,
    department: Option<String>,
    phone_number: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id),
            role: parse_enum("role", &row.role)?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            badge_number: row.badge_number,
            department: row.department,
            phone_number: row.phone_number,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>, DatabaseError> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = ?", COLUMNS))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .map(User::try_from)
        .transpose()
}

/// Repository for user accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Creates a user account
    ///
    /// # Errors
    ///
    /// * `Validation` - a required field is blank or the email is malformed
    /// * `DuplicateEntry` - username, email or badge number is taken
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        user.validate().map_err(|e| DatabaseError::invalid(ENTITY, e))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, badge_number, role,
                               department, phone_number, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.badge_number)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(&user.phone_number)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let created = fetch(&mut tx, UserId::new(id))
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))?;
        tx.commit().await?;

        info!(user_id = id, role = %created.role, "User created");
        Ok(created)
    }

    /// Retrieves a user by identifier
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: UserId) -> Result<User, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
    }

    /// Retrieves a user by login name
    pub async fn get_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE username = ?", COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User '{}' not found", username)))?;
        User::try_from(row)
    }

    pub async fn exists(&self, id: UserId) -> Result<bool, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch(&mut conn, id).await?.is_some())
    }

    /// Applies the allow-listed fields of `update`
    ///
    /// Returns `Unchanged` without touching `updated_at` when no supplied
    /// value differs from the stored one.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<UpdateOutcome<User>, DatabaseError> {
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
            UPDATE users
            SET email = ?, full_name = ?, badge_number = ?, role = ?, department = ?,
                phone_number = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.email)
        .bind(&after.full_name)
        .bind(&after.badge_number)
        .bind(after.role.as_str())
        .bind(&after.department)
        .bind(&after.phone_number)
        .bind(after.is_active)
        .bind(after.updated_at)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;

        info!(changed = patched.changes.len(), "User updated");
        Ok(UpdateOutcome::Updated {
            before: current,
            after,
            changes: patched.changes,
        })
    }

    /// Lists users, newest account first
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users WHERE 1=1", COLUMNS));
        if let Some(role) = filter.role {
            query.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(active) = filter.is_active {
            query.push(" AND is_active = ").push_bind(active);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build_query_as::<UserRow>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed users");
        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_pool;
    use domain_case::Role;

    fn officer(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@police.example", username),
            password_hash: "$argon2id$opaque".to_string(),
            full_name: "Test Officer".to_string(),
            role: Role::Officer,
            badge_number: None,
            department: Some("Traffic".to_string()),
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = UserRepository::new(memory_pool().await);
        let created = repo.create(officer("hmostafa")).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert!(fetched.is_active);
        assert_eq!(repo.get_by_username("hmostafa").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = UserRepository::new(memory_pool().await);
        repo.create(officer("dup")).await.unwrap();
        let mut again = officer("dup");
        again.email = "other@police.example".to_string();
        let err = repo.create(again).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_deactivation_is_an_update() {
        let repo = UserRepository::new(memory_pool().await);
        let user = repo.create(officer("retiring")).await.unwrap();
        let outcome = repo.update(user.id, UserUpdate::deactivate()).await.unwrap();
        assert!(outcome.is_changed());
        assert!(!repo.get(user.id).await.unwrap().is_active);

        let active = repo
            .list(&UserFilter { role: None, is_active: Some(true) })
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = UserRepository::new(memory_pool().await);
        let err = repo.update(UserId::new(77), UserUpdate::deactivate()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

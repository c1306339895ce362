//! Database Test Helpers
//!
//! Every `TestDatabase` is a private in-memory SQLite store with the full
//! schema provisioned, so tests never share state and need no external
//! services.

use chrono::{DateTime, Utc};
use core_kernel::{Timezone, UserId, ViolationId};
use domain_case::{Evidence, Role, Seizure, User, Violation};
use infra_db::{Database, DatabaseConfig, DatabasePool};
use once_cell::sync::Lazy;

use crate::builders::{TestEvidenceBuilder, TestSeizureBuilder, TestUserBuilder, TestViolationBuilder};

/// Environment variable overriding the reporting timezone used by tests
pub const TEST_TIMEZONE_ENV: &str = "CASEDB_TEST_TIMEZONE";

/// Reporting timezone for test stores, UTC unless overridden
pub static TEST_TIMEZONE: Lazy<Timezone> = Lazy::new(|| {
    std::env::var(TEST_TIMEZONE_ENV)
        .ok()
        .and_then(|name| name.parse().ok())
        .unwrap_or_default()
});

/// An isolated, provisioned store
pub struct TestDatabase {
    pub db: Database,
}

impl TestDatabase {
    /// Opens a fresh in-memory store in the test timezone
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_timezone(*TEST_TIMEZONE).await
    }

    /// Opens a fresh in-memory store reporting in `timezone`
    pub async fn with_timezone(timezone: Timezone) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let db = Database::open(DatabaseConfig::in_memory(), timezone).await?;
        Ok(Self { db })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &DatabasePool {
        self.db.pool()
    }

    /// Number of rows currently in `table`
    ///
    /// # Panics
    ///
    /// Panics if the table does not exist
    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.pool())
            .await
            .unwrap_or_else(|e| panic!("Failed to count rows in {}: {}", table, e))
    }

    /// Creates a user with the given username and role
    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        self.db
            .users
            .create(TestUserBuilder::new().with_username(username).with_role(role).build())
            .await
            .expect("Failed to seed user")
    }

    /// Creates the default officer account
    pub async fn seed_officer(&self) -> UserId {
        self.seed_user("officer.one", Role::Officer).await.id
    }

    /// Creates a violation with default fields
    pub async fn seed_violation(&self, number: &str, officer: UserId) -> Violation {
        self.seed_violation_with(TestViolationBuilder::new().with_number(number), officer)
            .await
    }

    pub async fn seed_violation_with(&self, builder: TestViolationBuilder, officer: UserId) -> Violation {
        self.db
            .violations
            .create(builder.build(officer))
            .await
            .expect("Failed to seed violation")
    }

    /// Creates a violation dated `at`
    pub async fn seed_violation_at(&self, number: &str, officer: UserId, at: DateTime<Utc>) -> Violation {
        self.seed_violation_with(TestViolationBuilder::new().with_number(number).with_date(at), officer)
            .await
    }

    pub async fn seed_seizure(&self, number: &str, violation: ViolationId, officer: UserId) -> Seizure {
        self.db
            .seizures
            .create(TestSeizureBuilder::new().with_number(number).build(violation, officer))
            .await
            .expect("Failed to seed seizure")
    }

    pub async fn seed_evidence(&self, number: &str, violation: ViolationId, collected_by: UserId) -> Evidence {
        self.db
            .evidence
            .create(TestEvidenceBuilder::new().with_number(number).build(violation, collected_by))
            .await
            .expect("Failed to seed evidence")
    }
}

/// Creates an isolated test database for a single test
///
/// # Panics
///
/// Panics if the store cannot be opened
pub async fn create_test_database() -> TestDatabase {
    TestDatabase::new()
        .await
        .expect("Failed to create test database")
}

/// Helper macro for running store tests against a fresh database
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let $db = $crate::database::create_test_database().await;
            $body
        }
    };
}

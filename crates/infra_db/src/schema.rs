//! Schema provisioning
//!
//! Every statement is idempotent (`IF NOT EXISTS`), so provisioning runs on
//! each process start. Enumerated-domain `CHECK` constraints are generated
//! from the same enums the repositories parse into, keeping the two in
//! lockstep.
//!
//! ```text
//! users ◄──── violations ◄──┬── seizures
//!   ▲  ▲                    ├── infractions
//!   │  └────────────────────┴── evidence
//!   └── activity_log (entity reference is loose: type + id)
//! statistics (one row per calendar date)
//! ```

use domain_case::{
    EntityType, EvidenceStatus, EvidenceType, InfractionStatus, Role, SeizureCategory,
    SeizureStatus, Severity, ViolationStatus, ViolationType,
};
use serde::Serialize;
use sqlx::Row;
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

/// Tables owned by the schema, in creation order
pub const TABLES: &[&str] = &[
    "users",
    "violations",
    "seizures",
    "infractions",
    "evidence",
    "activity_log",
    "statistics",
];

/// Renders `column IN ('a', 'b', ...)`
pub(crate) fn in_list(column: &str, names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("{} IN ({})", column, quoted.join(", "))
}

fn check_in(column: &str, names: &[&str]) -> String {
    format!("CHECK ({})", in_list(column, names))
}

fn statements() -> Vec<String> {
    let mut ddl = vec![
        format!(
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                badge_number TEXT UNIQUE,
                role TEXT NOT NULL {role},
                department TEXT,
                phone_number TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            role = check_in("role", Role::NAMES),
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS violations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                violation_number TEXT NOT NULL UNIQUE,
                violator_name TEXT NOT NULL,
                violator_license_number TEXT,
                violator_phone TEXT,
                violator_address TEXT,
                violation_date TEXT NOT NULL,
                violation_type TEXT NOT NULL {violation_type},
                severity_level TEXT NOT NULL {severity},
                description TEXT,
                location TEXT NOT NULL,
                latitude REAL,
                longitude REAL,
                officer_id INTEGER NOT NULL REFERENCES users(id),
                status TEXT NOT NULL DEFAULT 'open' {status},
                fine_amount TEXT,
                paid_date TEXT,
                notes TEXT,
                evidence_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            violation_type = check_in("violation_type", ViolationType::NAMES),
            severity = check_in("severity_level", Severity::NAMES),
            status = check_in("status", ViolationStatus::NAMES),
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS seizures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                seizure_number TEXT NOT NULL UNIQUE,
                violation_id INTEGER NOT NULL REFERENCES violations(id),
                item_description TEXT NOT NULL,
                item_quantity INTEGER NOT NULL DEFAULT 1 CHECK (item_quantity >= 1),
                item_category TEXT NOT NULL {category},
                estimated_value TEXT,
                serial_number TEXT,
                storage_location TEXT,
                officer_id INTEGER NOT NULL REFERENCES users(id),
                seizure_date TEXT NOT NULL,
                release_date TEXT,
                release_authorized_by INTEGER REFERENCES users(id),
                release_reason TEXT,
                status TEXT NOT NULL DEFAULT 'stored' {status},
                condition_notes TEXT,
                photo_evidence_urls TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            category = check_in("item_category", SeizureCategory::NAMES),
            status = check_in("status", SeizureStatus::NAMES),
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS infractions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                infraction_number TEXT NOT NULL UNIQUE,
                violation_id INTEGER NOT NULL REFERENCES violations(id),
                infraction_type TEXT NOT NULL,
                points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
                description TEXT,
                statute_reference TEXT,
                minimum_fine TEXT,
                maximum_fine TEXT,
                status TEXT NOT NULL DEFAULT 'pending' {status},
                court_appearance_date TEXT,
                court_location TEXT,
                case_number TEXT,
                prosecutor_id INTEGER REFERENCES users(id),
                judge_id INTEGER REFERENCES users(id),
                outcome TEXT,
                sentence_details TEXT,
                probation_period_months INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            status = check_in("status", InfractionStatus::NAMES),
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS evidence (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                evidence_number TEXT NOT NULL UNIQUE,
                violation_id INTEGER NOT NULL REFERENCES violations(id),
                evidence_type TEXT NOT NULL {evidence_type},
                description TEXT NOT NULL,
                file_path TEXT,
                file_size INTEGER CHECK (file_size IS NULL OR file_size >= 0),
                mime_type TEXT,
                collected_by INTEGER NOT NULL REFERENCES users(id),
                collection_date TEXT NOT NULL,
                collection_location TEXT,
                chain_of_custody TEXT,
                storage_location TEXT,
                status TEXT NOT NULL DEFAULT 'stored' {status},
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            evidence_type = check_in("evidence_type", EvidenceType::NAMES),
            status = check_in("status", EvidenceStatus::NAMES),
        ),
        // entity references are loose: no foreign key on entity_id
        format!(
            r#"CREATE TABLE IF NOT EXISTS activity_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                action_type TEXT NOT NULL,
                entity_type TEXT CHECK (entity_type IS NULL OR {entity_type}),
                entity_id INTEGER,
                description TEXT NOT NULL,
                changes TEXT,
                ip_address TEXT,
                timestamp TEXT NOT NULL
            )"#,
            entity_type = in_list("entity_type", EntityType::NAMES),
        ),
        r#"CREATE TABLE IF NOT EXISTS statistics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                total_violations INTEGER NOT NULL DEFAULT 0,
                total_seizures INTEGER NOT NULL DEFAULT 0,
                total_infractions INTEGER NOT NULL DEFAULT 0,
                total_fines TEXT NOT NULL DEFAULT '0',
                violations_by_type TEXT NOT NULL DEFAULT '{}',
                violations_by_severity TEXT NOT NULL DEFAULT '{}',
                seizures_by_category TEXT NOT NULL DEFAULT '{}',
                top_violators TEXT NOT NULL DEFAULT '[]',
                officer_performance TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#
        .to_string(),
    ];

    let indexes = [
        ("idx_violations_officer", "violations(officer_id)"),
        ("idx_violations_date", "violations(violation_date)"),
        ("idx_violations_status", "violations(status)"),
        ("idx_seizures_violation", "seizures(violation_id)"),
        ("idx_seizures_officer", "seizures(officer_id)"),
        ("idx_seizures_date", "seizures(seizure_date)"),
        ("idx_infractions_violation", "infractions(violation_id)"),
        ("idx_infractions_created", "infractions(created_at)"),
        ("idx_evidence_violation", "evidence(violation_id)"),
        ("idx_evidence_collector", "evidence(collected_by)"),
        ("idx_evidence_created", "evidence(created_at)"),
        ("idx_activity_user", "activity_log(user_id)"),
        ("idx_activity_entity", "activity_log(entity_type, entity_id)"),
        ("idx_activity_timestamp", "activity_log(timestamp)"),
    ];
    ddl.extend(
        indexes
            .iter()
            .map(|(name, target)| format!("CREATE INDEX IF NOT EXISTS {} ON {}", name, target)),
    );

    ddl.push(
        r#"CREATE TRIGGER IF NOT EXISTS activity_log_no_update
            BEFORE UPDATE ON activity_log
            BEGIN
                SELECT RAISE(ABORT, 'activity_log is append-only');
            END"#
            .to_string(),
    );
    ddl.push(
        r#"CREATE TRIGGER IF NOT EXISTS activity_log_no_delete
            BEFORE DELETE ON activity_log
            BEGIN
                SELECT RAISE(ABORT, 'activity_log is append-only');
            END"#
            .to_string(),
    );

    ddl
}

/// Which expected tables exist in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl SchemaStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Creates and inspects the relational schema
pub struct SchemaManager;

impl SchemaManager {
    /// Creates every table, index and trigger that is absent
    ///
    /// Runs in a single transaction; on an already provisioned store this is
    /// a no-op.
    pub async fn provision(pool: &DatabasePool) -> Result<(), DatabaseError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        for statement in statements() {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        info!(tables = TABLES.len(), "Schema provisioned");
        Ok(())
    }

    /// Reports which of the expected tables are present
    pub async fn verify(pool: &DatabasePool) -> Result<SchemaStatus, DatabaseError> {
        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let existing: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<_, _>>()?;

        let (present, missing): (Vec<String>, Vec<String>) = TABLES
            .iter()
            .map(|t| t.to_string())
            .partition(|t| existing.contains(t));

        debug!(present = present.len(), missing = missing.len(), "Schema verified");
        Ok(SchemaStatus { present, missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, DatabaseConfig};

    #[test]
    fn test_check_constraint_lists_every_name() {
        let check = check_in("status", ViolationStatus::NAMES);
        assert_eq!(
            check,
            "CHECK (status IN ('open', 'closed', 'appealed', 'dismissed', 'resolved'))"
        );
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        SchemaManager::provision(&pool).await.unwrap();
        SchemaManager::provision(&pool).await.unwrap();

        let status = SchemaManager::verify(&pool).await.unwrap();
        assert!(status.is_complete(), "missing: {:?}", status.missing);
    }

    #[tokio::test]
    async fn test_verify_on_empty_store() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        let status = SchemaManager::verify(&pool).await.unwrap();
        assert_eq!(status.missing.len(), TABLES.len());
    }

    #[tokio::test]
    async fn test_out_of_domain_value_rejected_by_storage() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        SchemaManager::provision(&pool).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO users (username, email, password_hash, full_name, role, created_at, updated_at)
             VALUES ('x', 'x@example.org', 'h', 'X', 'janitor', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .unwrap_err();
        assert!(matches!(DatabaseError::from(&err), DatabaseError::ConstraintViolation(_)));
    }
}

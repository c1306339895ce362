//! Infrastructure Database Layer
//!
//! This crate provides the persistent store for the case-management system:
//! schema provisioning, one repository per entity, the append-only activity
//! log and the statistics aggregator, all on SQLite through SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories take an injected
//! pool handle, validate requests with the domain types before touching
//! storage, and run each mutation in its own transaction so a failed
//! operation leaves nothing behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{Database, DatabaseConfig};
//!
//! let db = Database::open(DatabaseConfig::new("sqlite://police_violations.db"), Timezone::default()).await?;
//! let violation = db.violations.get(ViolationId::new(1)).await?;
//! ```

pub mod pool;
pub mod error;
pub mod schema;
pub mod repositories;
pub mod database;
mod codec;

#[cfg(test)]
pub(crate) mod testing;

pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool, IN_MEMORY_URL};
pub use error::{DatabaseError, ErrorKind};
pub use schema::{SchemaManager, SchemaStatus};
pub use repositories::{
    ActivityLogRepository, EvidenceRepository, InfractionRepository, SeizureRepository,
    StatisticsRepository, UpdateOutcome, UserRepository, ViolationRepository,
};
pub use database::Database;

//! Store handle bundling every repository
//!
//! One `Database` is opened per process and cloned into whatever needs it;
//! clones share the same pool.

use core_kernel::Timezone;
use tracing::info;

use crate::error::DatabaseError;
use crate::pool::{create_pool, DatabaseConfig, DatabasePool};
use crate::repositories::{
    ActivityLogRepository, EvidenceRepository, InfractionRepository, SeizureRepository,
    StatisticsRepository, UserRepository, ViolationRepository,
};
use crate::schema::{SchemaManager, SchemaStatus};

#[derive(Debug, Clone)]
pub struct Database {
    pool: DatabasePool,
    pub users: UserRepository,
    pub violations: ViolationRepository,
    pub seizures: SeizureRepository,
    pub infractions: InfractionRepository,
    pub evidence: EvidenceRepository,
    pub activity: ActivityLogRepository,
    pub statistics: StatisticsRepository,
}

impl Database {
    /// Opens the store and provisions its schema
    ///
    /// # Errors
    ///
    /// `ConnectionFailed` or `MigrationFailed` when the store cannot be
    /// reached or provisioned; both are fatal at startup.
    pub async fn open(config: DatabaseConfig, timezone: Timezone) -> Result<Self, DatabaseError> {
        let pool = create_pool(config).await?;
        SchemaManager::provision(&pool).await?;
        info!(timezone = timezone.name(), "Database ready");
        Ok(Self::from_pool(pool, timezone))
    }

    /// Wraps an existing pool without provisioning
    pub fn from_pool(pool: DatabasePool, timezone: Timezone) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            violations: ViolationRepository::new(pool.clone()),
            seizures: SeizureRepository::new(pool.clone()),
            infractions: InfractionRepository::new(pool.clone()),
            evidence: EvidenceRepository::new(pool.clone()),
            activity: ActivityLogRepository::new(pool.clone()),
            statistics: StatisticsRepository::new(pool.clone(), timezone),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Checks the store answers and every table exists
    pub async fn readiness(&self) -> Result<SchemaStatus, DatabaseError> {
        SchemaManager::verify(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

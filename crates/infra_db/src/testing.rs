//! Helpers for repository unit tests

use chrono::Utc;
use core_kernel::UserId;
use domain_case::{NewUser, NewViolation, Role, Severity, ViolationType};

use crate::pool::{create_pool, DatabaseConfig, DatabasePool};
use crate::repositories::{UserRepository, ViolationRepository};
use crate::schema::SchemaManager;

pub(crate) async fn memory_pool() -> DatabasePool {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    SchemaManager::provision(&pool).await.unwrap();
    pool
}

pub(crate) async fn seed_officer(pool: &DatabasePool) -> UserId {
    UserRepository::new(pool.clone())
        .create(NewUser {
            username: "officer".into(),
            email: "officer@police.example".into(),
            password_hash: "hash".into(),
            full_name: "Duty Officer".into(),
            role: Role::Officer,
            badge_number: Some("B-100".into()),
            department: None,
            phone_number: None,
        })
        .await
        .unwrap()
        .id
}

pub(crate) fn new_violation(number: &str, officer: UserId) -> NewViolation {
    NewViolation {
        violation_number: number.into(),
        violator_name: "Sami Fares".into(),
        violation_date: Utc::now(),
        violation_type: ViolationType::Traffic,
        severity_level: Severity::Minor,
        location: "Ring Rd".into(),
        officer_id: officer,
        violator_license_number: None,
        violator_phone: None,
        violator_address: None,
        description: None,
        latitude: None,
        longitude: None,
        fine_amount: None,
        notes: None,
    }
}

pub(crate) async fn seed_violation(pool: &DatabasePool, number: &str, officer: UserId) -> core_kernel::ViolationId {
    ViolationRepository::new(pool.clone())
        .create(new_violation(number, officer))
        .await
        .unwrap()
        .id
}

//! Core Kernel - Foundational types for the police-violation case store
//!
//! This crate provides the building blocks shared by the domain, storage and
//! API layers:
//! - Surrogate identifiers for every persisted entity
//! - Monetary amounts with precise decimal arithmetic
//! - Reporting windows and the reporting timezone
//! - The validation error taxonomy

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Amount, MoneyError};
pub use temporal::{DateWindow, TemporalError, Timezone};
pub use identifiers::{
    UserId, ViolationId, SeizureId, InfractionId, EvidenceId,
    ActivityLogId, StatisticsId,
};
pub use error::CoreError;

//! Case-Management Domain
//!
//! Domain records, closed enumerations and update contracts for the police
//! violation tracking system.
//!
//! # Aggregate
//!
//! ```text
//! Violation ──┬── 0..N Seizure     (custody: stored -> released/destroyed/auctioned)
//!             ├── 0..N Infraction  (judicial: pending -> contested/resolved/...)
//!             └── 0..N Evidence    (chain of custody; drives evidence_count)
//! ```
//!
//! Every mutable entity has a typed `*Update` request listing only its
//! allow-listed fields. Applying one yields the merged record and a
//! [`ChangeSet`] that callers hand to the activity log.

#[macro_use]
mod macros;

pub mod changes;
pub mod validation;
pub mod user;
pub mod violation;
pub mod seizure;
pub mod infraction;
pub mod evidence;
pub mod activity;
pub mod statistics;

pub use changes::{ChangeSet, EntityUpdate, FieldChange, Patched};
pub use user::{NewUser, Role, User, UserFilter, UserUpdate};
pub use violation::{
    NewViolation, Severity, Violation, ViolationDetails, ViolationFilter, ViolationStatus,
    ViolationType, ViolationUpdate,
};
pub use seizure::{NewSeizure, Seizure, SeizureCategory, SeizureFilter, SeizureStatus, SeizureUpdate};
pub use infraction::{Infraction, InfractionFilter, InfractionStatus, InfractionUpdate, NewInfraction};
pub use evidence::{Evidence, EvidenceFilter, EvidenceStatus, EvidenceType, EvidenceUpdate, NewEvidence};
pub use activity::{ActionType, ActivityLogEntry, ActivityQuery, EntityRef, EntityType, NewActivity};
pub use statistics::{
    Breakdown, DailySnapshot, DailyStatistics, InfractionStatistics, OfficerPerformance,
    SeizureStatistics, ViolationStatistics, ViolatorCount,
};

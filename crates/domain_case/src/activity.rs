//! Append-only activity log
//!
//! Entries reference the affected entity loosely by type and id so that
//! history survives the referenced row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use core_kernel::{ActivityLogId, CoreError, UserId};
use crate::changes::ChangeSet;
use crate::validation;

/// Default number of entries returned by a query
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 100;

/// Upper bound on entries returned by a single query
pub const MAX_ACTIVITY_LIMIT: i64 = 1000;

domain_enum! {
    /// Kind of entity an activity entry points at
    EntityType, "entity_type" {
        User => "user",
        Violation => "violation",
        Seizure => "seizure",
        Infraction => "infraction",
        Evidence => "evidence",
        Statistics => "statistics",
    }
}

/// What the actor did
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    Create,
    Update,
    Deactivate,
    Login,
    Logout,
    Export,
    Snapshot,
    /// Free-form action recorded by callers outside the core set
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Deactivate => "deactivate",
            ActionType::Login => "login",
            ActionType::Logout => "logout",
            ActionType::Export => "export",
            ActionType::Snapshot => "snapshot",
            ActionType::Other(action) => action,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::require_text("action_type", s)?;
        Ok(match s {
            "create" => ActionType::Create,
            "update" => ActionType::Update,
            "deactivate" => ActionType::Deactivate,
            "login" => ActionType::Login,
            "logout" => ActionType::Logout,
            "export" => ActionType::Export,
            "snapshot" => ActionType::Snapshot,
            other => ActionType::Other(other.to_string()),
        })
    }
}

impl Serialize for ActionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Loose reference to any entity row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub entity_id: i64,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, entity_id: impl Into<i64>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
        }
    }
}

/// A persisted activity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityLogId,
    pub actor: UserId,
    pub action_type: ActionType,
    pub entity: Option<EntityRef>,
    pub description: String,
    pub changes: Option<Value>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// An activity entry to append
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub actor: UserId,
    pub action_type: ActionType,
    pub description: String,
    pub entity: Option<EntityRef>,
    pub changes: Option<Value>,
    pub ip_address: Option<String>,
}

impl NewActivity {
    pub fn new(actor: UserId, action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            actor,
            action_type,
            description: description.into(),
            entity: None,
            changes: None,
            ip_address: None,
        }
    }

    /// Entry for a newly created entity
    pub fn created(actor: UserId, entity: EntityRef, label: &str) -> Self {
        Self::new(actor, ActionType::Create, format!("Created {} {}", entity.entity_type, label))
            .on(entity)
    }

    /// Entry for an update, carrying the before/after of every modified field
    pub fn updated(actor: UserId, entity: EntityRef, label: &str, changes: &ChangeSet) -> Self {
        let fields: Vec<&str> = changes.fields().collect();
        Self::new(
            actor,
            ActionType::Update,
            format!("Updated {} {} ({})", entity.entity_type, label, fields.join(", ")),
        )
        .on(entity)
        .with_changes(changes.to_json())
    }

    pub fn on(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_changes(mut self, changes: Value) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn from_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("action_type", self.action_type.as_str())?;
        validation::require_text("description", &self.description)
    }
}

/// Filters for reading the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub actor: Option<UserId>,
    pub limit: i64,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            actor: None,
            limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }
}

impl ActivityQuery {
    /// Limit clamped to `1..=MAX_ACTIVITY_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_ACTIVITY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_is_preserved() {
        let action: ActionType = "password_reset".parse().unwrap();
        assert_eq!(action, ActionType::Other("password_reset".into()));
        assert_eq!(action.as_str(), "password_reset");
    }

    #[test]
    fn test_blank_action_rejected() {
        assert!("".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_update_entry_lists_changed_fields() {
        let mut changes = ChangeSet::new();
        let mut status = "open".to_string();
        changes.set("status", &mut status, "closed".to_string());
        let entry = NewActivity::updated(
            UserId::new(1),
            EntityRef::new(EntityType::Violation, 5),
            "V-1",
            &changes,
        );
        assert_eq!(entry.action_type, ActionType::Update);
        assert!(entry.description.contains("status"));
        assert_eq!(entry.changes.unwrap()["status"]["after"], "closed");
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = ActivityQuery { actor: None, limit: 50_000 };
        assert_eq!(query.effective_limit(), MAX_ACTIVITY_LIMIT);
        let query = ActivityQuery { actor: None, limit: 0 };
        assert_eq!(query.effective_limit(), 1);
    }
}

//! Field-level change tracking for partial updates
//!
//! Typed update requests are applied to the current record to produce the
//! merged record plus a [`ChangeSet`] of only the fields whose values moved.
//! The change set doubles as the audit payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use core_kernel::CoreError;

/// Before/after values of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub before: Value,
    pub after: Value,
}

/// Ordered set of modified fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, FieldChange>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `proposed` to `slot` when it differs and records the change
    pub fn set<T>(&mut self, field: &str, slot: &mut T, proposed: T)
    where
        T: Serialize + PartialEq,
    {
        if *slot == proposed {
            return;
        }
        self.0.insert(
            field.to_string(),
            FieldChange {
                before: to_value(slot),
                after: to_value(&proposed),
            },
        );
        *slot = proposed;
    }

    /// Like [`ChangeSet::set`] for nullable columns
    pub fn set_some<T>(&mut self, field: &str, slot: &mut Option<T>, proposed: Option<T>)
    where
        T: Serialize + PartialEq,
    {
        if let Some(value) = proposed {
            self.set(field, slot, Some(value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// JSON payload stored with the audit record
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Result of applying an update request to a record
#[derive(Debug, Clone)]
pub struct Patched<T> {
    pub record: T,
    pub changes: ChangeSet,
}

/// A typed partial update carrying only allow-listed mutable fields
pub trait EntityUpdate<T> {
    /// True when no field is supplied at all
    fn is_empty(&self) -> bool;

    /// Merges the update into `current`, validating the merged record
    ///
    /// `now` is used for fields the lifecycle stamps implicitly.
    fn apply(&self, current: &T, now: DateTime<Utc>) -> Result<Patched<T>, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_value_is_not_a_change() {
        let mut changes = ChangeSet::new();
        let mut name = "Ali".to_string();
        changes.set("violator_name", &mut name, "Ali".to_string());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_change_records_before_and_after() {
        let mut changes = ChangeSet::new();
        let mut points = 2_i64;
        changes.set("points", &mut points, 4);
        assert_eq!(points, 4);
        let change = changes.get("points").unwrap();
        assert_eq!(change.before, Value::from(2));
        assert_eq!(change.after, Value::from(4));
    }

    #[test]
    fn test_set_some_ignores_absent_values() {
        let mut changes = ChangeSet::new();
        let mut notes: Option<String> = Some("x".into());
        changes.set_some("notes", &mut notes, None);
        assert!(changes.is_empty());
        assert_eq!(notes.as_deref(), Some("x"));
    }
}

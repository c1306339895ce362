//! System users: officers, supervisors, analysts and administrators
//!
//! Users are never hard-deleted. Deactivation flips `is_active`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, UserId};
use crate::changes::{ChangeSet, EntityUpdate, Patched};
use crate::validation;

domain_enum! {
    /// Role granted to a user account
    Role, "role" {
        Admin => "admin",
        Officer => "officer",
        Supervisor => "supervisor",
        Analyst => "analyst",
    }
}

/// A persisted user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Opaque credential produced by the login subsystem; never interpreted here
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub badge_number: Option<String>,
    pub role: Role,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for provisioning a new user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("username", &self.username)?;
        validation::email("email", &self.email)?;
        validation::require_text("password_hash", &self.password_hash)?;
        validation::require_text("full_name", &self.full_name)?;
        validation::optional_text("badge_number", self.badge_number.as_deref())?;
        Ok(())
    }
}

/// Allow-listed mutable user fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub badge_number: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Update that deactivates the account
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}

impl EntityUpdate<User> for UserUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, current: &User, _now: DateTime<Utc>) -> Result<Patched<User>, CoreError> {
        let mut record = current.clone();
        let mut changes = ChangeSet::new();

        if let Some(email) = &self.email {
            validation::email("email", email)?;
            changes.set("email", &mut record.email, email.clone());
        }
        if let Some(full_name) = &self.full_name {
            validation::require_text("full_name", full_name)?;
            changes.set("full_name", &mut record.full_name, full_name.clone());
        }
        validation::optional_text("badge_number", self.badge_number.as_deref())?;
        changes.set_some("badge_number", &mut record.badge_number, self.badge_number.clone());
        if let Some(role) = self.role {
            changes.set("role", &mut record.role, role);
        }
        changes.set_some("department", &mut record.department, self.department.clone());
        changes.set_some("phone_number", &mut record.phone_number, self.phone_number.clone());
        if let Some(active) = self.is_active {
            changes.set("is_active", &mut record.is_active, active);
        }

        Ok(Patched { record, changes })
    }
}

/// Optional, conjunctive filters for listing users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            username: "hsaleh".into(),
            email: "hsaleh@police.gov".into(),
            password_hash: "$2b$12$opaque".into(),
            full_name: "Hana Saleh".into(),
            badge_number: Some("B-1001".into()),
            role: Role::Officer,
            department: Some("Traffic".into()),
            phone_number: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!("supervisor".parse::<Role>().unwrap(), Role::Supervisor);
        let err = "sheriff".parse::<Role>().unwrap_err();
        assert_eq!(err.field(), Some("role"));
    }

    #[test]
    fn test_deactivate_is_a_single_change() {
        let patched = UserUpdate::deactivate().apply(&officer(), Utc::now()).unwrap();
        assert!(!patched.record.is_active);
        assert_eq!(patched.changes.len(), 1);
        assert!(patched.changes.contains("is_active"));
    }

    #[test]
    fn test_same_values_produce_no_changes() {
        let user = officer();
        let update = UserUpdate {
            role: Some(Role::Officer),
            department: Some("Traffic".into()),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());
        assert!(update.apply(&user, Utc::now()).unwrap().changes.is_empty());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let update = UserUpdate {
            email: Some("nope".into()),
            ..UserUpdate::default()
        };
        assert!(update.apply(&officer(), Utc::now()).is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(officer()).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}

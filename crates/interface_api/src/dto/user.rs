//! User DTOs

use domain_case::{NewUser, UserFilter, UserUpdate};
use serde::Deserialize;
use validator::Validate;

use super::{parse_enum, parse_opt};
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Produced by the login subsystem; stored as given
    #[validate(length(min = 1))]
    pub password_hash: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    pub role: String,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

impl CreateUserRequest {
    pub fn into_domain(self) -> Result<NewUser, ApiError> {
        self.validate()?;
        Ok(NewUser {
            role: parse_enum(&self.role)?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            badge_number: self.badge_number,
            department: self.department,
            phone_number: self.phone_number,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub badge_number: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn into_domain(self) -> Result<UserUpdate, ApiError> {
        self.validate()?;
        Ok(UserUpdate {
            role: parse_opt(self.role.as_deref())?,
            email: self.email,
            full_name: self.full_name,
            badge_number: self.badge_number,
            department: self.department,
            phone_number: self.phone_number,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UserListQuery {
    pub fn filter(&self) -> Result<UserFilter, ApiError> {
        Ok(UserFilter {
            role: parse_opt(self.role.as_deref())?,
            is_active: self.is_active,
        })
    }
}

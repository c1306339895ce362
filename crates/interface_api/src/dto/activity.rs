//! Activity log query parameters

use core_kernel::UserId;
use domain_case::{ActivityQuery, EntityRef};
use serde::Deserialize;

use super::parse_enum;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityListQuery {
    pub actor: Option<i64>,
    pub limit: Option<i64>,
    /// With `entity_id`, restricts the log to one record's history
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
}

impl ActivityListQuery {
    pub fn query(&self) -> ActivityQuery {
        let defaults = ActivityQuery::default();
        ActivityQuery {
            actor: self.actor.map(UserId::new),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }

    /// The entity whose history was requested, if any
    pub fn entity(&self) -> Result<Option<EntityRef>, ApiError> {
        match (&self.entity_type, self.entity_id) {
            (Some(entity_type), Some(id)) => Ok(Some(EntityRef::new(parse_enum(entity_type)?, id))),
            (None, None) => Ok(None),
            _ => Err(ApiError::validation(
                "entity_id",
                "entity_type and entity_id must be given together",
            )),
        }
    }
}

//! Conversions at the storage boundary
//!
//! Enumerations are stored by name, amounts as canonical decimal text and
//! structured values as JSON text. Decoding failures mean the row was
//! written by something other than this crate and surface as
//! `SerializationError`.

use core_kernel::{Amount, CoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

use crate::error::DatabaseError;

pub(crate) fn parse_enum<T>(column: &str, value: &str) -> Result<T, DatabaseError>
where
    T: FromStr<Err = CoreError>,
{
    value
        .parse()
        .map_err(|e: CoreError| DatabaseError::SerializationError(format!("{}: {}", column, e)))
}

pub(crate) fn parse_amount(column: &str, value: Option<&str>) -> Result<Option<Amount>, DatabaseError> {
    value
        .map(|text| {
            text.parse::<Amount>()
                .map_err(|e| DatabaseError::SerializationError(format!("{}: {}", column, e)))
        })
        .transpose()
}

pub(crate) fn amount_text(value: Option<Amount>) -> Option<String> {
    value.map(|a| a.to_storage())
}

pub(crate) fn from_json<T: DeserializeOwned>(column: &str, text: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(text)
        .map_err(|e| DatabaseError::SerializationError(format!("{}: {}", column, e)))
}

pub(crate) fn to_json<T: Serialize>(column: &str, value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|e| DatabaseError::SerializationError(format!("{}: {}", column, e)))
}

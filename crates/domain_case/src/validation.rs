//! Field validation helpers shared by the create requests

use core_kernel::{Amount, CoreError};

/// Fails when a required text field is blank
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::required(field));
    }
    Ok(())
}

/// Fails when an optional text field is present but blank
pub fn optional_text(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CoreError::validation(field, "must not be blank when supplied")),
        _ => Ok(()),
    }
}

/// Basic shape check for e-mail addresses
pub fn email(field: &str, value: &str) -> Result<(), CoreError> {
    require_text(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(CoreError::validation(field, format!("'{}' is not a valid e-mail address", value))),
    }
}

pub fn non_negative_amount(field: &str, value: Option<Amount>) -> Result<(), CoreError> {
    match value {
        Some(amount) if amount.is_negative() => Err(CoreError::validation(field, "must not be negative")),
        _ => Ok(()),
    }
}

pub fn non_negative_int(field: &str, value: Option<i64>) -> Result<(), CoreError> {
    match value {
        Some(v) if v < 0 => Err(CoreError::validation(field, "must not be negative")),
        _ => Ok(()),
    }
}

pub fn in_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), CoreError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(CoreError::validation(
            field,
            format!("{} is outside [{}, {}]", v, min, max),
        )),
        _ => Ok(()),
    }
}

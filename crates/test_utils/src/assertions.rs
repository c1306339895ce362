//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for amounts, breakdowns and store
//! errors that give more meaningful messages than standard assertions.

use chrono::{DateTime, Utc};
use core_kernel::{Amount, DateWindow};
use domain_case::Breakdown;
use infra_db::{DatabaseError, ErrorKind};
use rust_decimal::Decimal;

/// Asserts that two amounts are numerically equal, ignoring scale
pub fn assert_amount_eq(actual: Amount, expected: Amount) {
    assert!(
        actual.value() == expected.value(),
        "Amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that an amount equals a decimal literal
pub fn assert_amount_is(actual: Amount, expected: Decimal) {
    assert_amount_eq(actual, Amount::new(expected));
}

/// Asserts that parts sum exactly to a total
pub fn assert_amount_sum_equals(parts: &[Amount], total: Amount) {
    let sum: Amount = parts.iter().copied().sum();
    assert!(
        sum.value() == total.value(),
        "Sum of parts {} does not equal total {}",
        sum,
        total
    );
}

/// Asserts that a breakdown's counts sum to the reported total
pub fn assert_breakdown_sums_to(breakdown: &Breakdown, total: u64) {
    let sum: u64 = breakdown.values().sum();
    assert_eq!(
        sum, total,
        "Breakdown {:?} sums to {} but total is {}",
        breakdown, sum, total
    );
}

/// Asserts the count recorded for one key of a breakdown
pub fn assert_breakdown_count(breakdown: &Breakdown, key: &str, expected: u64) {
    let actual = breakdown.get(key).copied().unwrap_or(0);
    assert_eq!(
        actual, expected,
        "Breakdown {:?} has {} for '{}', expected {}",
        breakdown, actual, key, expected
    );
}

/// Asserts that a window contains a specific timestamp
pub fn assert_window_contains(window: &DateWindow, timestamp: DateTime<Utc>) {
    assert!(
        window.contains(timestamp),
        "Window {:?} does not contain timestamp {}",
        window,
        timestamp
    );
}

/// Asserts that a window does not contain a specific timestamp
pub fn assert_window_excludes(window: &DateWindow, timestamp: DateTime<Utc>) {
    assert!(
        !window.contains(timestamp),
        "Window {:?} unexpectedly contains timestamp {}",
        window,
        timestamp
    );
}

/// Asserts that an error is a validation failure naming `field`
pub fn assert_validation_error(error: &DatabaseError, field: &str) {
    assert_eq!(
        error.kind(),
        ErrorKind::Validation,
        "Expected a validation error on '{}', got {:?}",
        field,
        error
    );
    assert_eq!(
        error.field(),
        Some(field),
        "Validation error names {:?}, expected '{}': {:?}",
        error.field(),
        field,
        error
    );
}

/// Asserts that an error is a uniqueness conflict
pub fn assert_conflict(error: &DatabaseError) {
    assert_eq!(
        error.kind(),
        ErrorKind::Conflict,
        "Expected a conflict, got {:?}",
        error
    );
}

/// Asserts that an error reports a missing record
pub fn assert_not_found(error: &DatabaseError) {
    assert!(error.is_not_found(), "Expected not found, got {:?}", error);
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

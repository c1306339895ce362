//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random case data that
//! satisfies the create-time validation rules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{Amount, UserId};
use domain_case::{EvidenceStatus, NewViolation, SeizureCategory, Severity, ViolationStatus, ViolationType};
use proptest::prelude::*;

use crate::builders::TestViolationBuilder;

/// Strategy for non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Amount> {
    (0i64..10_000_000i64).prop_map(Amount::from_minor)
}

/// Strategy for strictly positive amounts
pub fn positive_amount_strategy() -> impl Strategy<Value = Amount> {
    (1i64..10_000_000i64).prop_map(Amount::from_minor)
}

pub fn violation_type_strategy() -> impl Strategy<Value = ViolationType> {
    proptest::sample::select(ViolationType::ALL)
}

pub fn severity_strategy() -> impl Strategy<Value = Severity> {
    proptest::sample::select(Severity::ALL)
}

pub fn violation_status_strategy() -> impl Strategy<Value = ViolationStatus> {
    proptest::sample::select(ViolationStatus::ALL)
}

pub fn seizure_category_strategy() -> impl Strategy<Value = SeizureCategory> {
    proptest::sample::select(SeizureCategory::ALL)
}

pub fn evidence_status_strategy() -> impl Strategy<Value = EvidenceStatus> {
    proptest::sample::select(EvidenceStatus::ALL)
}

/// Strategy for timestamps within 2024
pub fn timestamp_2024_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..366 * 24 * 60).prop_map(|minutes| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    })
}

/// Strategy for a small pool of violator names, so repeats are common
pub fn violator_name_strategy() -> impl Strategy<Value = String> {
    proptest::sample::select(vec!["Ana Ruiz", "Ben Cole", "Chen Wei", "Dara Okafor", "Eli Moss"])
        .prop_map(str::to_string)
}

/// Strategy for valid violation payloads recorded by `officer`
///
/// Violation numbers are left at the builder default; callers that persist
/// several payloads must renumber them.
pub fn new_violation_strategy(officer: UserId) -> impl Strategy<Value = NewViolation> {
    (
        violator_name_strategy(),
        violation_type_strategy(),
        severity_strategy(),
        proptest::option::of(amount_strategy()),
        timestamp_2024_strategy(),
    )
        .prop_map(move |(name, violation_type, severity, fine, date)| {
            let builder = TestViolationBuilder::new()
                .with_violator(name)
                .with_type(violation_type)
                .with_severity(severity)
                .with_date(date);
            match fine {
                Some(fine) => builder.with_fine(fine),
                None => builder,
            }
            .build(officer)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_generated_amounts_are_non_negative(amount in amount_strategy()) {
            prop_assert!(!amount.is_negative());
        }

        #[test]
        fn test_generated_violations_validate(violation in new_violation_strategy(UserId::new(7))) {
            prop_assert!(violation.validate().is_ok());
            prop_assert_eq!(violation.officer_id, UserId::new(7));
        }
    }
}

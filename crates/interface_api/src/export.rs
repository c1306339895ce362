//! Violation report export
//!
//! One CSV row per violation, headed by the violation column names.

use std::io::Write;

use domain_case::Violation;
use thiserror::Error;

/// Header row, in column order
pub const VIOLATION_COLUMNS: &[&str] = &[
    "id",
    "violation_number",
    "violator_name",
    "violator_license_number",
    "violator_phone",
    "violator_address",
    "violation_date",
    "violation_type",
    "severity_level",
    "description",
    "location",
    "latitude",
    "longitude",
    "officer_id",
    "status",
    "fine_amount",
    "paid_date",
    "notes",
    "evidence_count",
    "created_at",
    "updated_at",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No violations to export")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn record(v: &Violation) -> Vec<String> {
    vec![
        v.id.get().to_string(),
        v.violation_number.clone(),
        v.violator_name.clone(),
        opt(&v.violator_license_number),
        opt(&v.violator_phone),
        opt(&v.violator_address),
        v.violation_date.to_rfc3339(),
        v.violation_type.to_string(),
        v.severity_level.to_string(),
        opt(&v.description),
        v.location.clone(),
        opt(&v.latitude),
        opt(&v.longitude),
        v.officer_id.get().to_string(),
        v.status.to_string(),
        opt(&v.fine_amount),
        v.paid_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        opt(&v.notes),
        v.evidence_count.to_string(),
        v.created_at.to_rfc3339(),
        v.updated_at.to_rfc3339(),
    ]
}

/// Writes `violations` as CSV to `writer`
///
/// # Errors
///
/// `ExportError::Empty` when there is nothing to write; nothing is written
/// in that case.
pub fn write_violations_csv<W: Write>(violations: &[Violation], writer: W) -> Result<(), ExportError> {
    if violations.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(VIOLATION_COLUMNS)?;
    for violation in violations {
        out.write_record(record(violation))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Amount, UserId};
    use rust_decimal_macros::dec;
    use test_utils::TestViolationBuilder;

    fn sample(id: i64, number: &str) -> Violation {
        let new = TestViolationBuilder::new()
            .with_number(number)
            .with_fine(Amount::new(dec!(150)))
            .build(UserId::new(3));
        Violation {
            id: core_kernel::ViolationId::new(id),
            violation_number: new.violation_number,
            violator_name: new.violator_name,
            violator_license_number: None,
            violator_phone: None,
            violator_address: Some("12 Elm St, Apt 4".into()),
            violation_date: new.violation_date,
            violation_type: new.violation_type,
            severity_level: new.severity_level,
            description: None,
            location: new.location,
            latitude: None,
            longitude: None,
            officer_id: new.officer_id,
            status: Default::default(),
            fine_amount: new.fine_amount,
            paid_date: None,
            notes: None,
            evidence_count: 0,
            created_at: new.violation_date,
            updated_at: new.violation_date,
        }
    }

    #[test]
    fn test_empty_listing_is_reported() {
        let mut buf = Vec::new();
        assert!(matches!(write_violations_csv(&[], &mut buf), Err(ExportError::Empty)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_header_and_one_row_per_violation() {
        let mut buf = Vec::new();
        write_violations_csv(&[sample(1, "V-1"), sample(2, "V-2")], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], VIOLATION_COLUMNS.join(","));
        assert!(lines[1].starts_with("1,V-1,"));
        assert!(lines[1].contains("\"12 Elm St, Apt 4\""));
        assert!(lines[2].starts_with("2,V-2,"));
    }
}

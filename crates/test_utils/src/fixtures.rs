//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities of the case store.
//! These fixtures are consistent and predictable so assertions can name
//! exact values.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Amount, DateWindow, Timezone};
use rust_decimal_macros::dec;

/// Fixture for monetary amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// Typical traffic fine
    pub fn traffic_fine() -> Amount {
        Amount::new(dec!(150.00))
    }

    /// Typical parking fine
    pub fn parking_fine() -> Amount {
        Amount::new(dec!(40.00))
    }

    /// Estimated value of a seized vehicle
    pub fn vehicle_value() -> Amount {
        Amount::new(dec!(12500.00))
    }

    pub fn zero() -> Amount {
        Amount::zero()
    }

    /// Rejected by every amount field
    pub fn negative() -> Amount {
        Amount::new(dec!(-10.00))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reporting day used by the statistics scenarios (2024-03-15)
    pub fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid fixture date")
    }

    /// Mid-morning on the reporting day
    pub fn report_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    /// Afternoon on the reporting day
    pub fn report_afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 15, 45, 0).unwrap()
    }

    /// The day before the reporting day
    pub fn day_before() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()
    }

    /// The day after the reporting day
    pub fn day_after() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap()
    }

    /// Window covering the whole reporting day in UTC
    pub fn report_day_window() -> DateWindow {
        Timezone::default()
            .day_window(Self::report_date())
            .expect("UTC day window")
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn violation_number() -> &'static str {
        "VN-2024-0001"
    }

    pub fn seizure_number() -> &'static str {
        "SZ-2024-0001"
    }

    pub fn infraction_number() -> &'static str {
        "INF-2024-0001"
    }

    pub fn evidence_number() -> &'static str {
        "EV-2024-0001"
    }

    pub fn violator_name() -> &'static str {
        "Karim Haddad"
    }

    pub fn location() -> &'static str {
        "Main St & 5th Ave"
    }

    /// Opaque credential; the store never interprets it
    pub fn password_hash() -> &'static str {
        "$argon2id$v=19$m=19456,t=2,p=1$fixture"
    }
}

//! Test Data Builders
//!
//! Provides builder patterns for constructing create payloads with sensible
//! defaults. Tests specify only the fields they care about; references to
//! other records (officer, violation) are passed to `build`.

use chrono::{DateTime, Utc};
use core_kernel::{Amount, UserId, ViolationId};
use domain_case::{
    EvidenceType, NewEvidence, NewInfraction, NewSeizure, NewUser, NewViolation, Role,
    SeizureCategory, Severity, ViolationType,
};

use crate::fixtures::{StringFixtures, TemporalFixtures};

/// Builder for user accounts
///
/// Unless set explicitly, the badge number is derived from the username so
/// that users built with distinct usernames never collide on it.
pub struct TestUserBuilder {
    username: String,
    full_name: String,
    role: Role,
    badge_number: Option<Option<String>>,
    department: Option<String>,
}

impl Default for TestUserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestUserBuilder {
    pub fn new() -> Self {
        Self {
            username: "officer.one".to_string(),
            full_name: "Officer One".to_string(),
            role: Role::Officer,
            badge_number: None,
            department: Some("Traffic".to_string()),
        }
    }

    /// Sets the username; the email is derived from it
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge_number = Some(Some(badge.into()));
        self
    }

    pub fn without_badge(mut self) -> Self {
        self.badge_number = Some(None);
        self
    }

    pub fn build(self) -> NewUser {
        let badge_number = self
            .badge_number
            .unwrap_or_else(|| Some(format!("B-{}", self.username)));
        NewUser {
            email: format!("{}@police.example", self.username),
            username: self.username,
            password_hash: StringFixtures::password_hash().to_string(),
            full_name: self.full_name,
            role: self.role,
            badge_number,
            department: self.department,
            phone_number: None,
        }
    }
}

/// Builder for violations
pub struct TestViolationBuilder {
    violation_number: String,
    violator_name: String,
    violation_date: DateTime<Utc>,
    violation_type: ViolationType,
    severity_level: Severity,
    location: String,
    fine_amount: Option<Amount>,
    violator_license_number: Option<String>,
}

impl Default for TestViolationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestViolationBuilder {
    pub fn new() -> Self {
        Self {
            violation_number: StringFixtures::violation_number().to_string(),
            violator_name: StringFixtures::violator_name().to_string(),
            violation_date: TemporalFixtures::report_morning(),
            violation_type: ViolationType::Traffic,
            severity_level: Severity::Minor,
            location: StringFixtures::location().to_string(),
            fine_amount: None,
            violator_license_number: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.violation_number = number.into();
        self
    }

    pub fn with_violator(mut self, name: impl Into<String>) -> Self {
        self.violator_name = name.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.violation_date = date;
        self
    }

    pub fn with_type(mut self, violation_type: ViolationType) -> Self {
        self.violation_type = violation_type;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity_level = severity;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_fine(mut self, fine: Amount) -> Self {
        self.fine_amount = Some(fine);
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.violator_license_number = Some(license.into());
        self
    }

    /// Builds the payload recorded by `officer`
    pub fn build(self, officer: UserId) -> NewViolation {
        NewViolation {
            violation_number: self.violation_number,
            violator_name: self.violator_name,
            violation_date: self.violation_date,
            violation_type: self.violation_type,
            severity_level: self.severity_level,
            location: self.location,
            officer_id: officer,
            violator_license_number: self.violator_license_number,
            violator_phone: None,
            violator_address: None,
            description: None,
            latitude: None,
            longitude: None,
            fine_amount: self.fine_amount,
            notes: None,
        }
    }
}

/// Builder for seizures
pub struct TestSeizureBuilder {
    seizure_number: String,
    item_description: String,
    item_quantity: i64,
    item_category: SeizureCategory,
    seizure_date: DateTime<Utc>,
    estimated_value: Option<Amount>,
    photo_evidence_urls: Vec<String>,
}

impl Default for TestSeizureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSeizureBuilder {
    pub fn new() -> Self {
        Self {
            seizure_number: StringFixtures::seizure_number().to_string(),
            item_description: "Unregistered motorcycle".to_string(),
            item_quantity: 1,
            item_category: SeizureCategory::Vehicle,
            seizure_date: TemporalFixtures::report_morning(),
            estimated_value: None,
            photo_evidence_urls: Vec::new(),
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.seizure_number = number.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.item_description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.item_quantity = quantity;
        self
    }

    pub fn with_category(mut self, category: SeizureCategory) -> Self {
        self.item_category = category;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.seizure_date = date;
        self
    }

    pub fn with_value(mut self, value: Amount) -> Self {
        self.estimated_value = Some(value);
        self
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_evidence_urls.push(url.into());
        self
    }

    pub fn build(self, violation: ViolationId, officer: UserId) -> NewSeizure {
        NewSeizure {
            seizure_number: self.seizure_number,
            violation_id: violation,
            item_description: self.item_description,
            item_quantity: self.item_quantity,
            item_category: self.item_category,
            officer_id: officer,
            seizure_date: self.seizure_date,
            estimated_value: self.estimated_value,
            serial_number: None,
            storage_location: Some("Impound Lot A".to_string()),
            condition_notes: None,
            photo_evidence_urls: self.photo_evidence_urls,
        }
    }
}

/// Builder for infractions
pub struct TestInfractionBuilder {
    infraction_number: String,
    infraction_type: String,
    points: i64,
    statute_reference: Option<String>,
    minimum_fine: Option<Amount>,
    maximum_fine: Option<Amount>,
}

impl Default for TestInfractionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInfractionBuilder {
    pub fn new() -> Self {
        Self {
            infraction_number: StringFixtures::infraction_number().to_string(),
            infraction_type: "speeding".to_string(),
            points: 3,
            statute_reference: Some("VC 22350".to_string()),
            minimum_fine: None,
            maximum_fine: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.infraction_number = number.into();
        self
    }

    pub fn with_type(mut self, infraction_type: impl Into<String>) -> Self {
        self.infraction_type = infraction_type.into();
        self
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    /// Sets the fine range
    pub fn with_fine_range(mut self, minimum: Amount, maximum: Amount) -> Self {
        self.minimum_fine = Some(minimum);
        self.maximum_fine = Some(maximum);
        self
    }

    pub fn build(self, violation: ViolationId) -> NewInfraction {
        NewInfraction {
            infraction_number: self.infraction_number,
            violation_id: violation,
            infraction_type: self.infraction_type,
            points: self.points,
            description: None,
            statute_reference: self.statute_reference,
            minimum_fine: self.minimum_fine,
            maximum_fine: self.maximum_fine,
        }
    }
}

/// Builder for evidence items
pub struct TestEvidenceBuilder {
    evidence_number: String,
    evidence_type: EvidenceType,
    description: String,
    collection_date: DateTime<Utc>,
    file_path: Option<String>,
    file_size: Option<i64>,
}

impl Default for TestEvidenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEvidenceBuilder {
    pub fn new() -> Self {
        Self {
            evidence_number: StringFixtures::evidence_number().to_string(),
            evidence_type: EvidenceType::Photo,
            description: "Dashcam still of the plate".to_string(),
            collection_date: TemporalFixtures::report_morning(),
            file_path: None,
            file_size: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.evidence_number = number.into();
        self
    }

    pub fn with_type(mut self, evidence_type: EvidenceType) -> Self {
        self.evidence_type = evidence_type;
        self
    }

    pub fn with_collection_date(mut self, date: DateTime<Utc>) -> Self {
        self.collection_date = date;
        self
    }

    /// Attaches a stored file
    pub fn with_file(mut self, path: impl Into<String>, size: i64) -> Self {
        self.file_path = Some(path.into());
        self.file_size = Some(size);
        self
    }

    pub fn build(self, violation: ViolationId, collected_by: UserId) -> NewEvidence {
        NewEvidence {
            evidence_number: self.evidence_number,
            violation_id: violation,
            evidence_type: self.evidence_type,
            description: self.description,
            collected_by,
            collection_date: self.collection_date,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: None,
            collection_location: None,
            chain_of_custody: None,
            storage_location: Some("Locker 12".to_string()),
            notes: None,
        }
    }
}

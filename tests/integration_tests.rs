//! Integration Tests for the case store
//!
//! These tests drive the repositories, statistics aggregator and activity
//! log together against a fresh in-memory store per test.

use core_kernel::{Amount, DateWindow, ViolationId};
use domain_case::{
    ActionType, ActivityQuery, EntityRef, EntityType, EvidenceStatus, EvidenceType, EvidenceUpdate,
    InfractionStatus, NewActivity, Role, SeizureCategory, SeizureStatus, Severity, ViolationFilter,
    ViolationStatus, ViolationType, ViolationUpdate,
};
use infra_db::UpdateOutcome;
use rust_decimal_macros::dec;
use test_utils::{
    assert_amount_is, assert_breakdown_count, assert_breakdown_sums_to, assert_conflict,
    assert_not_found, assert_validation_error, create_test_database, TemporalFixtures,
    TestEvidenceBuilder, TestInfractionBuilder, TestSeizureBuilder, TestUserBuilder,
    TestViolationBuilder,
};

mod statistics_scenarios {
    use super::*;

    /// One violation with a seizure and an infraction on the same day
    #[tokio::test]
    async fn test_single_case_statistics() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;

        let v1 = t
            .db
            .violations
            .create(
                TestViolationBuilder::new()
                    .with_number("V1")
                    .with_type(ViolationType::Traffic)
                    .with_severity(Severity::Minor)
                    .with_fine(Amount::new(dec!(150)))
                    .build(officer),
            )
            .await
            .expect("create V1");

        t.db.seizures
            .create(
                TestSeizureBuilder::new()
                    .with_number("S1")
                    .with_category(SeizureCategory::Vehicle)
                    .with_value(Amount::new(dec!(5000)))
                    .with_date(v1.violation_date)
                    .build(v1.id, officer),
            )
            .await
            .expect("create S1");

        t.db.infractions
            .create(TestInfractionBuilder::new().with_number("I1").with_points(2).build(v1.id))
            .await
            .expect("create I1");

        let day = TemporalFixtures::report_day_window();

        let violations = t.db.statistics.violation_statistics(day).await.unwrap();
        assert_eq!(violations.total_violations, 1);
        assert_eq!(violations.violations_by_type.len(), 1);
        assert_breakdown_count(&violations.violations_by_type, "traffic", 1);
        assert_amount_is(violations.total_fines, dec!(150));

        let seizures = t.db.statistics.seizure_statistics(day).await.unwrap();
        assert_eq!(seizures.total_seizures, 1);
        assert_amount_is(seizures.total_estimated_value, dec!(5000));

        let infractions = t
            .db
            .statistics
            .infraction_statistics(DateWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(infractions.total_infractions, 1);
        assert_eq!(infractions.total_points, 2);
    }

    #[tokio::test]
    async fn test_aggregator_agrees_with_listing() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;

        let cases = [
            ("VA-1", ViolationType::Traffic, Some(dec!(100)), TemporalFixtures::report_morning()),
            ("VA-2", ViolationType::Parking, None, TemporalFixtures::report_afternoon()),
            ("VA-3", ViolationType::Traffic, Some(dec!(75.50)), TemporalFixtures::report_afternoon()),
            ("VA-4", ViolationType::Criminal, Some(dec!(999)), TemporalFixtures::day_before()),
            ("VA-5", ViolationType::Parking, Some(dec!(40)), TemporalFixtures::day_after()),
        ];
        for (number, violation_type, fine, at) in cases {
            let builder = TestViolationBuilder::new()
                .with_number(number)
                .with_type(violation_type)
                .with_date(at);
            let builder = match fine {
                Some(fine) => builder.with_fine(Amount::new(fine)),
                None => builder,
            };
            t.seed_violation_with(builder, officer).await;
        }

        let day = TemporalFixtures::report_day_window();
        let stats = t.db.statistics.violation_statistics(day).await.unwrap();
        let listed = t.db.violations.list(&ViolationFilter::within(day)).await.unwrap();

        assert_eq!(stats.total_violations, listed.len() as u64);
        assert_eq!(stats.total_violations, 3);
        let listed_fines: Amount = listed.iter().map(|v| v.fine_or_zero()).sum();
        assert_eq!(stats.total_fines, listed_fines);
        assert_amount_is(stats.total_fines, dec!(175.50));
        assert_breakdown_sums_to(&stats.violations_by_type, stats.total_violations);
        assert_breakdown_sums_to(&stats.violations_by_severity, stats.total_violations);
        assert_breakdown_sums_to(&stats.violations_by_status, stats.total_violations);
        assert_breakdown_count(&stats.violations_by_type, "parking", 1);
    }

    #[tokio::test]
    async fn test_daily_snapshot_is_idempotent() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        t.seed_violation_at("VS-1", officer, TemporalFixtures::report_morning()).await;
        t.seed_violation_at("VS-2", officer, TemporalFixtures::report_afternoon()).await;

        let date = TemporalFixtures::report_date();
        let first = t.db.statistics.save_daily_snapshot(date).await.unwrap();
        let second = t.db.statistics.save_daily_snapshot(date).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.statistics.total_violations, 2);
        assert_eq!(t.count_rows("statistics").await, 1);

        let stored = t.db.statistics.daily_snapshot(date).await.unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_officer_ranking_orders_by_count() {
        let t = create_test_database().await;
        let busy = t.seed_user("busy", Role::Officer).await.id;
        let quiet = t.seed_user("quiet", Role::Officer).await.id;

        for number in ["VR-1", "VR-2", "VR-3"] {
            t.seed_violation(number, busy).await;
        }
        t.seed_violation("VR-4", quiet).await;

        let ranking = t
            .db
            .statistics
            .officer_performance(DateWindow::unbounded(), None)
            .await
            .unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].officer_id, busy);
        assert_eq!(ranking[0].violations_count, 3);
        assert_eq!(ranking[1].officer_id, quiet);
    }
}

mod integrity_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_seizure_for_missing_violation_rejected() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;

        let err = t
            .db
            .seizures
            .create(TestSeizureBuilder::new().build(ViolationId::new(9999), officer))
            .await
            .unwrap_err();

        assert_validation_error(&err, "violation_id");
        assert!(err.is_retryable());
        assert_eq!(t.count_rows("seizures").await, 0);
    }

    #[tokio::test]
    async fn test_children_of_missing_violation_leave_no_rows() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let missing = ViolationId::new(4242);

        let err = t
            .db
            .infractions
            .create(TestInfractionBuilder::new().build(missing))
            .await
            .unwrap_err();
        assert_validation_error(&err, "violation_id");

        let err = t
            .db
            .evidence
            .create(TestEvidenceBuilder::new().build(missing, officer))
            .await
            .unwrap_err();
        assert_validation_error(&err, "violation_id");

        assert_eq!(t.count_rows("infractions").await, 0);
        assert_eq!(t.count_rows("evidence").await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_violation_number_conflicts() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let original = t
            .seed_violation_with(
                TestViolationBuilder::new()
                    .with_number("VD-1")
                    .with_violator("First Violator"),
                officer,
            )
            .await;

        let err = t
            .db
            .violations
            .create(
                TestViolationBuilder::new()
                    .with_number("VD-1")
                    .with_violator("Second Violator")
                    .build(officer),
            )
            .await
            .unwrap_err();

        assert_conflict(&err);
        assert_eq!(t.count_rows("violations").await, 1);
        let stored = t.db.violations.get(original.id).await.unwrap();
        assert_eq!(stored, original);
    }

    #[tokio::test]
    async fn test_violation_round_trips() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;

        let payload = TestViolationBuilder::new()
            .with_number("VT-1")
            .with_type(ViolationType::Administrative)
            .with_severity(Severity::Serious)
            .with_fine(Amount::new(dec!(320.25)))
            .with_license("DL-778812")
            .build(officer);
        let created = t.db.violations.create(payload.clone()).await.unwrap();
        let other = t.seed_violation("VT-2", officer).await;
        let fetched = t.db.violations.get(created.id).await.unwrap();

        assert_ne!(created.id, other.id);
        assert_eq!(fetched.violation_number, payload.violation_number);
        assert_eq!(fetched.violation_type, payload.violation_type);
        assert_eq!(fetched.severity_level, payload.severity_level);
        assert_eq!(fetched.fine_amount, payload.fine_amount);
        assert_eq!(fetched.violator_license_number, payload.violator_license_number);
        assert_eq!(fetched.violation_date, payload.violation_date);
        assert_eq!(fetched.status, ViolationStatus::Open);
        assert_eq!(fetched.evidence_count, 0);
    }

    #[tokio::test]
    async fn test_seizure_round_trips() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VS-1", officer).await;

        let payload = TestSeizureBuilder::new()
            .with_number("SZ-RT-1")
            .with_description("Two laptops")
            .with_quantity(2)
            .with_category(SeizureCategory::Other)
            .with_value(Amount::new(dec!(1850.75)))
            .with_photo("https://evidence.example/sz-rt-1/front.jpg")
            .with_photo("https://evidence.example/sz-rt-1/serial.jpg")
            .build(violation.id, officer);
        let created = t.db.seizures.create(payload.clone()).await.unwrap();
        let fetched = t.db.seizures.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.seizure_number, payload.seizure_number);
        assert_eq!(fetched.violation_id, payload.violation_id);
        assert_eq!(fetched.item_description, payload.item_description);
        assert_eq!(fetched.item_quantity, payload.item_quantity);
        assert_eq!(fetched.item_category, payload.item_category);
        assert_eq!(fetched.officer_id, payload.officer_id);
        assert_eq!(fetched.seizure_date, payload.seizure_date);
        assert_eq!(fetched.estimated_value, payload.estimated_value);
        assert_eq!(fetched.storage_location, payload.storage_location);
        assert_eq!(fetched.photo_evidence_urls, payload.photo_evidence_urls);
        assert_eq!(fetched.status, SeizureStatus::Stored);
        assert!(fetched.release_date.is_none());
    }

    #[tokio::test]
    async fn test_infraction_round_trips() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VI-1", officer).await;

        let payload = TestInfractionBuilder::new()
            .with_number("INF-RT-1")
            .with_type("reckless_driving")
            .with_points(4)
            .with_fine_range(Amount::new(dec!(250)), Amount::new(dec!(1000.50)))
            .build(violation.id);
        let created = t.db.infractions.create(payload.clone()).await.unwrap();
        let fetched = t.db.infractions.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.infraction_number, payload.infraction_number);
        assert_eq!(fetched.violation_id, payload.violation_id);
        assert_eq!(fetched.infraction_type, payload.infraction_type);
        assert_eq!(fetched.points, payload.points);
        assert_eq!(fetched.statute_reference, payload.statute_reference);
        assert_eq!(fetched.minimum_fine, payload.minimum_fine);
        assert_eq!(fetched.maximum_fine, payload.maximum_fine);
        assert_eq!(fetched.status, InfractionStatus::Pending);
    }

    #[tokio::test]
    async fn test_evidence_round_trips() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VE-1", officer).await;

        let payload = TestEvidenceBuilder::new()
            .with_number("EV-RT-1")
            .with_type(EvidenceType::Video)
            .with_collection_date(TemporalFixtures::report_afternoon())
            .with_file("/evidence/ev-rt-1.mp4", 7_340_032)
            .build(violation.id, officer);
        let created = t.db.evidence.create(payload.clone()).await.unwrap();
        let fetched = t.db.evidence.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.evidence_number, payload.evidence_number);
        assert_eq!(fetched.violation_id, payload.violation_id);
        assert_eq!(fetched.evidence_type, payload.evidence_type);
        assert_eq!(fetched.description, payload.description);
        assert_eq!(fetched.collected_by, payload.collected_by);
        assert_eq!(fetched.collection_date, payload.collection_date);
        assert_eq!(fetched.file_path, payload.file_path);
        assert_eq!(fetched.file_size, payload.file_size);
        assert_eq!(fetched.storage_location, payload.storage_location);
        assert_eq!(fetched.status, EvidenceStatus::Stored);
    }

    #[tokio::test]
    async fn test_duplicate_child_numbers_conflict() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VC-1", officer).await;

        let seizure = t.seed_seizure("SZ-DUP", violation.id, officer).await;
        let err = t
            .db
            .seizures
            .create(
                TestSeizureBuilder::new()
                    .with_number("SZ-DUP")
                    .with_description("Different item")
                    .build(violation.id, officer),
            )
            .await
            .unwrap_err();
        assert_conflict(&err);
        assert_eq!(t.db.seizures.get(seizure.id).await.unwrap(), seizure);

        let infraction = t
            .db
            .infractions
            .create(TestInfractionBuilder::new().with_number("INF-DUP").build(violation.id))
            .await
            .unwrap();
        let err = t
            .db
            .infractions
            .create(
                TestInfractionBuilder::new()
                    .with_number("INF-DUP")
                    .with_points(9)
                    .build(violation.id),
            )
            .await
            .unwrap_err();
        assert_conflict(&err);
        assert_eq!(t.db.infractions.get(infraction.id).await.unwrap(), infraction);

        t.seed_evidence("EV-DUP", violation.id, officer).await;
        let err = t
            .db
            .evidence
            .create(TestEvidenceBuilder::new().with_number("EV-DUP").build(violation.id, officer))
            .await
            .unwrap_err();
        assert_conflict(&err);

        assert_eq!(t.count_rows("seizures").await, 1);
        assert_eq!(t.count_rows("infractions").await, 1);
        assert_eq!(t.count_rows("evidence").await, 1);
        assert_eq!(t.db.violations.get(violation.id).await.unwrap().evidence_count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_identifiers_conflict() {
        let t = create_test_database().await;
        t.db.users
            .create(TestUserBuilder::new().with_username("cpl.ray").with_badge("B-500").build())
            .await
            .unwrap();

        let mut same_email = TestUserBuilder::new().with_username("cpl.roy").build();
        same_email.email = "cpl.ray@police.example".to_string();
        let err = t.db.users.create(same_email).await.unwrap_err();
        assert_conflict(&err);

        let same_badge = TestUserBuilder::new()
            .with_username("cpl.rex")
            .with_badge("B-500")
            .build();
        let err = t.db.users.create(same_badge).await.unwrap_err();
        assert_conflict(&err);

        assert_eq!(t.count_rows("users").await, 1);
    }

    #[tokio::test]
    async fn test_missing_violation_not_found() {
        let t = create_test_database().await;
        let err = t.db.violations.get(ViolationId::new(77)).await.unwrap_err();
        assert_not_found(&err);
    }
}

mod update_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_empty_update_leaves_timestamp() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VU-1", officer).await;

        let outcome = t
            .db
            .violations
            .update(violation.id, ViolationUpdate::default())
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Unchanged));

        let same_values = ViolationUpdate {
            status: Some(violation.status),
            location: Some(violation.location.clone()),
            ..Default::default()
        };
        let outcome = t.db.violations.update(violation.id, same_values).await.unwrap();
        assert!(!outcome.is_changed());

        let stored = t.db.violations.get(violation.id).await.unwrap();
        assert_eq!(stored.updated_at, violation.updated_at);
    }

    #[tokio::test]
    async fn test_update_reports_field_changes() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VU-2", officer).await;

        let outcome = t
            .db
            .violations
            .update(
                violation.id,
                ViolationUpdate {
                    status: Some(ViolationStatus::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let changes = outcome.changes().expect("status changed").clone();
        assert!(changes.contains("status"));
        assert_eq!(changes.len(), 1);
        let after = outcome.into_after().unwrap();
        assert_eq!(after.status, ViolationStatus::Closed);
        assert!(after.updated_at >= violation.updated_at);
    }

    #[tokio::test]
    async fn test_evidence_count_tracks_active_items() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VE-1", officer).await;

        let mut items = Vec::new();
        for n in 0..4 {
            items.push(t.seed_evidence(&format!("EV-{}", n), violation.id, officer).await);
        }
        assert_eq!(t.db.violations.get(violation.id).await.unwrap().evidence_count, 4);

        t.db.evidence
            .update(
                items[1].id,
                EvidenceUpdate {
                    status: Some(EvidenceStatus::Destroyed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = t.db.violations.get(violation.id).await.unwrap();
        assert_eq!(stored.evidence_count, 3);
        assert_eq!(t.db.evidence.recount(violation.id).await.unwrap(), 3);
        assert_eq!(t.db.evidence.list_by_violation(violation.id).await.unwrap().len(), 4);
    }
}

mod activity_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_mutations_paired_with_activity_entries() {
        let t = create_test_database().await;
        let officer = t.seed_officer().await;
        let violation = t.seed_violation("VL-1", officer).await;
        let entity = EntityRef::new(EntityType::Violation, violation.id);

        t.db.activity
            .record(NewActivity::created(officer, entity, &violation.violation_number))
            .await
            .unwrap();

        let outcome = t
            .db
            .violations
            .update(
                violation.id,
                ViolationUpdate {
                    severity_level: Some(Severity::Critical),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = outcome.changes().unwrap();
        t.db.activity
            .record(NewActivity::updated(officer, entity, &violation.violation_number, changes))
            .await
            .unwrap();

        let trail = t.db.activity.for_entity(entity, 10).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].action_type, ActionType::Update);
        assert!(trail[0].changes.is_some());
        assert_eq!(trail[1].action_type, ActionType::Create);

        let by_actor = t
            .db
            .activity
            .query(&ActivityQuery {
                actor: Some(officer),
                limit: 1,
            })
            .await
            .unwrap();
        assert_eq!(by_actor.len(), 1);
        assert_eq!(by_actor[0].id, trail[0].id);
    }
}

use super::common::*;
use crate::workflows::registration::domain::{
    ApplicationNumber, District, ExamAllocation, Union,
};
use crate::workflows::registration::store::{RecordStore, StoreError};

fn allocation() -> (ApplicationNumber, ExamAllocation) {
    (
        ApplicationNumber("CBT2025-000042".to_string()),
        ExamAllocation {
            center: "DAV PUBLIC SCHOOL, PATNA".to_string(),
            shift: "B (12:00 PM - 1:00 PM, 12-06-2025)".to_string(),
        },
    )
}

#[test]
fn union_switch_clears_foreign_district_preferences() {
    let mut store = RecordStore::new();
    store.update_personal_info(personal_info(Union::Harit));

    // Same candidate flips the union but keeps one stale Harit district.
    let mut switched = personal_info(Union::Tirhut);
    switched.district_preferences = vec![District::Patna, District::Vaishali];
    store.update_personal_info(switched);

    let stored = store
        .record()
        .personal_info
        .as_ref()
        .expect("personal info present");
    assert_eq!(stored.district_preferences, vec![District::Vaishali]);
}

#[test]
fn districts_valid_for_new_union_survive_switch() {
    let mut store = RecordStore::new();
    store.update_personal_info(personal_info(Union::Tirhut));

    let merged = store.update_personal_info(personal_info(Union::Tirhut));
    assert_eq!(
        merged.district_preferences,
        vec![District::Vaishali, District::Samastipur]
    );
}

#[test]
fn allocation_is_write_once() {
    let mut store = RecordStore::new();
    let (number, assignment) = allocation();
    store
        .assign_allocation(number.clone(), assignment)
        .expect("first assignment succeeds");

    let second = store.assign_allocation(
        ApplicationNumber("CBT2025-999999".to_string()),
        ExamAllocation {
            center: "SOMEWHERE ELSE".to_string(),
            shift: "C".to_string(),
        },
    );
    match second {
        Err(StoreError::AllocationAssigned(existing)) => assert_eq!(existing, number),
        other => panic!("expected allocation conflict, got {other:?}"),
    }

    let record = store.record();
    assert_eq!(record.application_number.as_ref(), Some(&number));
    assert_eq!(
        record.exam_center.as_deref(),
        Some("DAV PUBLIC SCHOOL, PATNA")
    );
}

#[test]
fn payment_is_recorded_once() {
    let mut store = RecordStore::new();
    store
        .record_payment(true, "TXN-1".to_string())
        .expect("first payment records");

    match store.record_payment(true, "TXN-2".to_string()) {
        Err(StoreError::PaymentRecorded(existing)) => assert_eq!(existing, "TXN-1"),
        other => panic!("expected payment conflict, got {other:?}"),
    }
    assert_eq!(store.record().transaction_number.as_deref(), Some("TXN-1"));
}

#[test]
fn lookup_matches_only_the_assigned_number() {
    let mut store = RecordStore::new();
    assert!(store.find_by_application_number("CBT2025-000042").is_none());

    let (number, assignment) = allocation();
    store
        .assign_allocation(number, assignment)
        .expect("assignment succeeds");

    assert!(store.find_by_application_number("CBT2025-000042").is_some());
    assert!(store.find_by_application_number("CBT2025-000043").is_none());
}

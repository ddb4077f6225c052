use super::common::*;
use crate::workflows::registration::admit_card::{
    AdmitCardError, AdmitCardView, DEFAULT_CENTER, DEFAULT_SHIFT,
};
use crate::workflows::registration::domain::{ApplicationNumber, Union};
use crate::workflows::registration::store::RecordStore;

fn paid_store(union: Union) -> RecordStore {
    let mut store = RecordStore::new();
    store.update_personal_info(personal_info(union));
    store
        .record_payment(true, "TXN-1".to_string())
        .expect("payment records");
    store
}

#[test]
fn unpaid_record_is_gated() {
    let mut store = RecordStore::new();
    store.update_personal_info(personal_info(Union::Harit));

    match AdmitCardView::from_record(store.record()) {
        Err(AdmitCardError::PaymentPending) => {}
        other => panic!("expected payment gate, got {other:?}"),
    }
}

#[test]
fn incomplete_record_is_rejected() {
    let mut store = RecordStore::new();
    store
        .record_payment(true, "TXN-1".to_string())
        .expect("payment records");

    match AdmitCardView::from_record(store.record()) {
        Err(AdmitCardError::IncompleteRecord) => {}
        other => panic!("expected incomplete-record error, got {other:?}"),
    }
}

#[test]
fn view_formats_candidate_details() {
    let mut store = paid_store(Union::Harit);
    store
        .assign_allocation(
            ApplicationNumber("CBT2025-000007".to_string()),
            crate::workflows::registration::domain::ExamAllocation {
                center: "DAV PUBLIC SCHOOL, PATNA".to_string(),
                shift: "B (12:00 PM - 1:00 PM, 12-06-2025)".to_string(),
            },
        )
        .expect("allocation assigned");

    let view = AdmitCardView::from_record(store.record()).expect("view builds");
    assert_eq!(view.application_number, "CBT2025-000007");
    assert_eq!(view.union, "Harit Union");
    assert_eq!(view.dob, "17-04-1998");
    assert_eq!(view.gender, "FEMALE");
    assert!(view.posts.contains("Assistant Manager"));
    assert!(view.district_preferences.contains("Patna"));
    assert_eq!(view.qr_payload, "APPNO:CBT2025-000007");
}

#[test]
fn missing_allocation_falls_back_to_defaults() {
    // A number but no center/shift: the card still renders with the
    // printed placeholders.
    let record = crate::workflows::registration::store::RegistrationRecord {
        application_number: Some(ApplicationNumber("CBT2025-000008".to_string())),
        personal_info: Some(personal_info(Union::Harit)),
        payment_status: true,
        transaction_number: Some("TXN-1".to_string()),
        ..Default::default()
    };

    let view = AdmitCardView::from_record(&record).expect("view builds");
    assert_eq!(view.exam_center, DEFAULT_CENTER);
    assert_eq!(view.exam_shift, DEFAULT_SHIFT);
}

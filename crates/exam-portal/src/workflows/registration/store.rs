use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationNumber, ExamAllocation, PersonalInfo};
use super::upload::{DocumentKind, UploadedFile};

/// The single in-progress candidate record for a session.
///
/// Created empty at session start and populated incrementally by the step
/// controllers; never deleted within the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub application_number: Option<ApplicationNumber>,
    pub personal_info: Option<PersonalInfo>,
    pub exam_center: Option<String>,
    pub exam_shift: Option<String>,
    pub photo: Option<UploadedFile>,
    pub signature: Option<UploadedFile>,
    pub payment_status: bool,
    pub transaction_number: Option<String>,
    pub documents: BTreeMap<DocumentKind, UploadedFile>,
}

/// Errors raised when a merge would break a write-once invariant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("allocation already assigned to {0}")]
    AllocationAssigned(ApplicationNumber),
    #[error("payment already recorded under transaction {0}")]
    PaymentRecorded(String),
}

/// Exclusively-owned session context holding the registration record.
///
/// Updates are pure merges by field; validation is the step controllers'
/// job. Single mutator per session, so no interior locking here.
#[derive(Debug, Default)]
pub struct RecordStore {
    record: RegistrationRecord,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &RegistrationRecord {
        &self.record
    }

    /// Replace the personal-info section.
    ///
    /// District preferences not valid for the incoming union are dropped,
    /// which also covers the union-switch case: prefs chosen under the
    /// previous union survive only if the new union's list contains them.
    pub fn update_personal_info(&mut self, mut info: PersonalInfo) -> &PersonalInfo {
        info.district_preferences
            .retain(|district| district.valid_for(info.union));
        self.record.personal_info.insert(info)
    }

    pub fn update_photo(&mut self, photo: UploadedFile) {
        self.record.photo = Some(photo);
    }

    pub fn update_signature(&mut self, signature: UploadedFile) {
        self.record.signature = Some(signature);
    }

    pub fn update_document(&mut self, kind: DocumentKind, file: UploadedFile) {
        self.record.documents.insert(kind, file);
    }

    /// Record the allocation outputs. Write-once: a second assignment is a
    /// conflict and leaves the stored values untouched.
    pub fn assign_allocation(
        &mut self,
        number: ApplicationNumber,
        allocation: ExamAllocation,
    ) -> Result<(), StoreError> {
        if let Some(existing) = &self.record.application_number {
            return Err(StoreError::AllocationAssigned(existing.clone()));
        }
        self.record.application_number = Some(number);
        self.record.exam_center = Some(allocation.center);
        self.record.exam_shift = Some(allocation.shift);
        Ok(())
    }

    /// Record the payment outcome exactly once.
    pub fn record_payment(
        &mut self,
        success: bool,
        transaction_number: String,
    ) -> Result<(), StoreError> {
        if let Some(existing) = &self.record.transaction_number {
            return Err(StoreError::PaymentRecorded(existing.clone()));
        }
        self.record.payment_status = success;
        self.record.transaction_number = Some(transaction_number);
        Ok(())
    }

    /// Look the session record up by application number. The store holds a
    /// single record, so this is an equality check against the assigned
    /// number; session-local uniqueness is all that exists.
    pub fn find_by_application_number(&self, query: &str) -> Option<&RegistrationRecord> {
        match &self.record.application_number {
            Some(number) if number.0 == query => Some(&self.record),
            _ => None,
        }
    }
}

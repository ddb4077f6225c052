//! Exam registration intake, allocation, payment verification, and
//! admit-card export.
//!
//! The four step controllers run strictly in sequence behind the
//! [`RegistrationWorkflow`] facade; the record store, allocation policy, and
//! export collaborators are pluggable so the workflow can be exercised in
//! isolation.

pub mod admit_card;
pub mod allocation;
mod config;
pub mod domain;
pub mod export;
pub mod router;
pub mod store;
pub mod upload;
mod validate;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use admit_card::{AdmitCardError, AdmitCardView};
pub use allocation::{
    AllocationPolicy, RosterAllocationPolicy, SeededAllocationPolicy, CENTER_POOL, SHIFT_POOL,
};
pub use config::RegistrationConfig;
pub use domain::{
    ApplicationNumber, District, ExamAllocation, FormVariant, Gender, PersonalInfo, Post, Union,
};
pub use export::{
    dispatch_notification, paginate, AdmitCardNotice, DocumentEncoder, EncodeError, ExportError,
    ExportService, ExportedDocument, Notifier, NotifyError, PageSlice, RasterImage, RasterizeError,
    Rasterizer,
};
pub use router::{registration_router, RegistrationState, SearchResultView, StepView};
pub use store::{RecordStore, RegistrationRecord, StoreError};
pub use upload::{
    payload_from_bytes, DocumentKind, FilePayload, UploadError, UploadField, UploadedFile,
};
pub use validate::FieldError;
pub use workflow::{RegistrationForm, RegistrationWorkflow, Transition, WorkflowError, WorkflowStage};

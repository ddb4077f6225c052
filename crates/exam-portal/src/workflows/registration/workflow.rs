use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::allocation::AllocationPolicy;
use super::config::RegistrationConfig;
use super::domain::{FormVariant, PersonalInfo, Union};
use super::store::{RecordStore, RegistrationRecord, StoreError};
use super::upload::{DocumentKind, FilePayload, UploadError, UploadField, UploadedFile};
use super::validate::{validate_personal_info, FieldError};

/// Linear workflow cursor. `Home` is both the session start and where the
/// Tirhut deferral lands after payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStage {
    Home,
    Registration,
    DocumentUpload,
    PaymentVerification,
    AdmitCardDownload,
}

impl WorkflowStage {
    pub const fn label(self) -> &'static str {
        match self {
            WorkflowStage::Home => "home",
            WorkflowStage::Registration => "registration",
            WorkflowStage::DocumentUpload => "document_upload",
            WorkflowStage::PaymentVerification => "payment_verification",
            WorkflowStage::AdmitCardDownload => "admit_card_download",
        }
    }
}

/// Outcome of a step submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Step validated and the cursor moved forward.
    Advanced(WorkflowStage),
    /// An entry guard failed; the cursor was sent back instead of erroring.
    Redirected(WorkflowStage),
    /// Payment confirmed for a Tirhut Union candidate: the admit card is
    /// delivered later by email and the session returns home.
    Deferred { message: String },
}

/// Step-level failure. Everything here is recoverable: the form stays
/// interactive and the candidate can re-submit.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("No application found with this number. Please check and try again.")]
    NotFound,
    #[error("payment verification timed out")]
    VerificationTimeout,
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete registration-step submission: the personal-info section plus
/// the uploads that step collects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub variant: FormVariant,
    pub personal_info: PersonalInfo,
    pub photo: Option<FilePayload>,
    pub signature: Option<FilePayload>,
    pub cv: Option<FilePayload>,
    pub work_certificate: Option<FilePayload>,
    pub qualification_certificate: Option<FilePayload>,
}

/// The four step controllers behind one facade, threading the exclusively
/// owned session context through each submission.
pub struct RegistrationWorkflow<P> {
    store: RecordStore,
    stage: WorkflowStage,
    policy: P,
    config: RegistrationConfig,
}

impl<P> RegistrationWorkflow<P>
where
    P: AllocationPolicy,
{
    pub fn new(policy: P, config: RegistrationConfig) -> Self {
        Self {
            store: RecordStore::new(),
            stage: WorkflowStage::Home,
            policy,
            config,
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn record(&self) -> &RegistrationRecord {
        self.store.record()
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Enter the registration form from the home page.
    pub fn begin(&mut self) -> WorkflowStage {
        self.stage = WorkflowStage::Registration;
        self.stage
    }

    /// Registration step: validate every field and required upload, merge
    /// into the record, run allocation once, and advance.
    pub fn submit_registration(
        &mut self,
        form: RegistrationForm,
    ) -> Result<Transition, WorkflowError> {
        let errors = validate_personal_info(&form.personal_info);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let photo = required_upload(UploadField::Photo, form.photo)?;
        let signature = required_upload(UploadField::Signature, form.signature)?;

        let certificates = match form.variant {
            FormVariant::Standard => Vec::new(),
            FormVariant::Extended => vec![
                (
                    DocumentKind::Cv,
                    required_upload(UploadField::Document(DocumentKind::Cv), form.cv)?,
                ),
                (
                    DocumentKind::WorkCertificate,
                    required_upload(
                        UploadField::Document(DocumentKind::WorkCertificate),
                        form.work_certificate,
                    )?,
                ),
                (
                    DocumentKind::QualificationCertificate,
                    required_upload(
                        UploadField::Document(DocumentKind::QualificationCertificate),
                        form.qualification_certificate,
                    )?,
                ),
            ],
        };

        let merged_info = self.store.update_personal_info(form.personal_info).clone();
        self.store.update_photo(photo);
        self.store.update_signature(signature);
        for (kind, file) in certificates {
            self.store.update_document(kind, file);
        }

        // Allocation runs exactly once per record; edits after the first
        // successful submission keep the assigned values.
        if self.store.record().application_number.is_none() {
            let (number, allocation) = self.policy.allocate(&merged_info);
            info!(application_number = %number, center = %allocation.center, "exam center allocated");
            self.store.assign_allocation(number, allocation)?;
        }

        self.stage = WorkflowStage::DocumentUpload;
        Ok(Transition::Advanced(self.stage))
    }

    /// Document-upload step. Both proofs must pass file validation before
    /// either is merged.
    pub fn submit_documents(
        &mut self,
        id_proof: FilePayload,
        address_proof: FilePayload,
    ) -> Result<Transition, WorkflowError> {
        if self.missing_personal_info() {
            self.stage = WorkflowStage::Registration;
            return Ok(Transition::Redirected(self.stage));
        }

        let id_proof =
            UploadedFile::accept(UploadField::Document(DocumentKind::IdProof), id_proof)?;
        let address_proof = UploadedFile::accept(
            UploadField::Document(DocumentKind::AddressProof),
            address_proof,
        )?;

        self.store.update_document(DocumentKind::IdProof, id_proof);
        self.store
            .update_document(DocumentKind::AddressProof, address_proof);

        self.stage = WorkflowStage::PaymentVerification;
        Ok(Transition::Advanced(self.stage))
    }

    /// Payment step: a time-bounded simulated verification, then the
    /// union-dependent branch.
    pub async fn submit_payment(
        &mut self,
        transaction_number: &str,
        transaction_date: &str,
    ) -> Result<Transition, WorkflowError> {
        if self.store.record().application_number.is_none() {
            self.stage = WorkflowStage::Registration;
            return Ok(Transition::Redirected(self.stage));
        }

        let mut errors = Vec::new();
        if transaction_number.trim().is_empty() {
            errors.push(FieldError {
                field: "transaction_number",
                message: "Transaction number is required".to_string(),
            });
        }
        if transaction_date.trim().is_empty() {
            errors.push(FieldError {
                field: "transaction_date",
                message: "Transaction date is required".to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        self.simulate_verification().await?;
        self.store
            .record_payment(true, transaction_number.trim().to_string())?;
        info!(transaction_number = transaction_number.trim(), "payment verified");

        let union = self
            .store
            .record()
            .personal_info
            .as_ref()
            .map(|info| info.union);
        if union == Some(Union::Tirhut) {
            self.stage = WorkflowStage::Home;
            return Ok(Transition::Deferred {
                message: "Your Registration and payment is completed. You will receive your \
                          admit card after 18th June 2025 through email."
                    .to_string(),
            });
        }

        self.stage = WorkflowStage::AdmitCardDownload;
        Ok(Transition::Advanced(self.stage))
    }

    /// Direct lookup by application number, reachable without walking the
    /// linear chain.
    pub async fn search(&self, query: &str) -> Result<RegistrationRecord, WorkflowError> {
        if query.trim().is_empty() {
            return Err(WorkflowError::Validation(vec![FieldError {
                field: "application_number",
                message: "Please enter application number".to_string(),
            }]));
        }

        tokio::time::sleep(Duration::from_millis(self.config.search_delay_ms)).await;

        self.store
            .find_by_application_number(query.trim())
            .cloned()
            .ok_or(WorkflowError::NotFound)
    }

    fn missing_personal_info(&self) -> bool {
        self.store
            .record()
            .personal_info
            .as_ref()
            .map(|info| info.name.trim().is_empty())
            .unwrap_or(true)
    }

    async fn simulate_verification(&self) -> Result<(), WorkflowError> {
        let delay = Duration::from_millis(self.config.verification_delay_ms);
        let ceiling = Duration::from_millis(self.config.verification_timeout_ms);
        tokio::time::timeout(ceiling, tokio::time::sleep(delay))
            .await
            .map_err(|_| WorkflowError::VerificationTimeout)
    }
}

fn required_upload(
    field: UploadField,
    payload: Option<FilePayload>,
) -> Result<UploadedFile, WorkflowError> {
    let payload = payload.ok_or(UploadError::Missing { field })?;
    Ok(UploadedFile::accept(field, payload)?)
}

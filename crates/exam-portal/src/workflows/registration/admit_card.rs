use serde::{Deserialize, Serialize};

use super::store::RegistrationRecord;

/// Fallback venue/shift printed when allocation somehow never ran; matches
/// the placeholders on the printed card.
pub const DEFAULT_CENTER: &str = "DAV PUBLIC SCHOOL, RANCHI";
pub const DEFAULT_SHIFT: &str = "A (9:00 AM - 10:00 AM, 12-06-2025)";

pub const EXAM_TITLE: &str = "Admit Card for Computer Based Test (CBT): June 2025";
pub const GATE_ENTRY_NOTE: &str = "30 minutes before shift start time";

/// Reasons an admit card cannot be rendered for a record.
#[derive(Debug, thiserror::Error)]
pub enum AdmitCardError {
    #[error("payment is not verified for this application")]
    PaymentPending,
    #[error("registration is incomplete; personal information is missing")]
    IncompleteRecord,
}

/// Flattened, display-ready admit card. Everything downstream (rasterizer,
/// encoder, notifier) consumes this instead of the raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmitCardView {
    pub application_number: String,
    pub union: String,
    pub exam_title: String,
    pub exam_center: String,
    pub exam_shift: String,
    pub gate_entry: String,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub dob: String,
    pub gender: String,
    pub aadhaar_number: String,
    pub posts: String,
    pub district_preferences: String,
    pub photo_data_url: Option<String>,
    pub signature_data_url: Option<String>,
    /// Decorative scannable payload; not cryptographically meaningful.
    pub qr_payload: String,
}

impl AdmitCardView {
    /// Build the card from a paid-up record. The payment gate sits here so
    /// no downstream stage ever sees an unpaid record.
    pub fn from_record(record: &RegistrationRecord) -> Result<Self, AdmitCardError> {
        if !record.payment_status {
            return Err(AdmitCardError::PaymentPending);
        }
        let info = record
            .personal_info
            .as_ref()
            .ok_or(AdmitCardError::IncompleteRecord)?;
        let application_number = record
            .application_number
            .as_ref()
            .ok_or(AdmitCardError::IncompleteRecord)?;

        let posts = info
            .selected_posts
            .iter()
            .map(|post| post.label())
            .collect::<Vec<_>>()
            .join(", ");
        let district_preferences = info
            .district_preferences
            .iter()
            .map(|district| district.label())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            application_number: application_number.0.clone(),
            union: info.union.label().to_string(),
            exam_title: EXAM_TITLE.to_string(),
            exam_center: record
                .exam_center
                .clone()
                .unwrap_or_else(|| DEFAULT_CENTER.to_string()),
            exam_shift: record
                .exam_shift
                .clone()
                .unwrap_or_else(|| DEFAULT_SHIFT.to_string()),
            gate_entry: GATE_ENTRY_NOTE.to_string(),
            name: info.name.clone(),
            father_name: info.father_name.clone(),
            mother_name: info.mother_name.clone(),
            dob: info.dob.format("%d-%m-%Y").to_string(),
            gender: info.gender.label().to_uppercase(),
            aadhaar_number: info.aadhaar_number.clone(),
            posts,
            district_preferences,
            photo_data_url: record.photo.as_ref().map(|file| file.data_url()),
            signature_data_url: record.signature.as_ref().map(|file| file.data_url()),
            qr_payload: format!("APPNO:{}", application_number.0),
        })
    }

    /// Rough line count of the rendered card, used by rasterizer adapters
    /// to size the output image.
    pub fn content_lines(&self) -> usize {
        // Header block, the ten detail rows, the six-instruction block,
        // plus wrapped lines for long post/district selections.
        3 + 10 + 6 + self.posts.len() / 60 + self.district_preferences.len() / 60
    }
}

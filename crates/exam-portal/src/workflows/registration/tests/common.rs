use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::registration::admit_card::AdmitCardView;
use crate::workflows::registration::allocation::RosterAllocationPolicy;
use crate::workflows::registration::config::RegistrationConfig;
use crate::workflows::registration::domain::{
    District, FormVariant, Gender, PersonalInfo, Post, Union,
};
use crate::workflows::registration::export::{
    AdmitCardNotice, DocumentEncoder, EncodeError, Notifier, NotifyError, PageSlice, RasterImage,
    RasterizeError, Rasterizer,
};
use crate::workflows::registration::upload::{payload_from_bytes, FilePayload};
use crate::workflows::registration::workflow::{RegistrationForm, RegistrationWorkflow};

pub(super) fn small_jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len, 0xAB);
    bytes
}

pub(super) fn photo_payload() -> FilePayload {
    payload_from_bytes("photo.jpg", "image/jpeg", &small_jpeg(4 * 1024))
}

pub(super) fn signature_payload() -> FilePayload {
    payload_from_bytes("signature.png", "image/png", &small_jpeg(2 * 1024))
}

pub(super) fn pdf_payload(name: &str) -> FilePayload {
    payload_from_bytes(name, "application/pdf", b"%PDF-1.4 stub")
}

pub(super) fn personal_info(union: Union) -> PersonalInfo {
    let district_preferences = match union {
        Union::Harit => vec![District::Patna, District::Nalanda],
        Union::Tirhut => vec![District::Vaishali, District::Samastipur],
    };
    PersonalInfo {
        union,
        name: "Anjali Kumari".to_string(),
        father_name: "Ramesh Kumar".to_string(),
        mother_name: "Sunita Devi".to_string(),
        dob: NaiveDate::from_ymd_opt(1998, 4, 17).expect("valid date"),
        gender: Gender::Female,
        email: "anjali.kumari@example.com".to_string(),
        mobile: "9876543210".to_string(),
        address: "12 Station Road, Patna".to_string(),
        aadhaar_number: "123456789012".to_string(),
        selected_posts: vec![Post::AssistantManager, Post::DataEntryOperator],
        district_preferences,
    }
}

pub(super) fn registration_form(union: Union) -> RegistrationForm {
    RegistrationForm {
        variant: FormVariant::Standard,
        personal_info: personal_info(union),
        photo: Some(photo_payload()),
        signature: Some(signature_payload()),
        cv: None,
        work_certificate: None,
        qualification_certificate: None,
    }
}

pub(super) fn build_workflow() -> RegistrationWorkflow<RosterAllocationPolicy> {
    RegistrationWorkflow::new(RosterAllocationPolicy, RegistrationConfig::immediate())
}

/// Drive a workflow through registration and document upload.
pub(super) async fn advance_to_payment(
    workflow: &mut RegistrationWorkflow<RosterAllocationPolicy>,
    union: Union,
) {
    workflow.begin();
    workflow
        .submit_registration(registration_form(union))
        .expect("registration succeeds");
    workflow
        .submit_documents(pdf_payload("id.pdf"), pdf_payload("address.pdf"))
        .expect("documents accepted");
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<AdmitCardNotice>>>,
    pub(super) fail: bool,
}

impl MemoryNotifier {
    pub(super) fn failing() -> Self {
        Self {
            notices: Arc::default(),
            fail: true,
        }
    }

    pub(super) fn notices(&self) -> Vec<AdmitCardNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn dispatch(&self, notice: AdmitCardNotice) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("smtp unreachable".to_string()));
        }
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

/// Rasterizer stub sizing the image from the view's content so pagination
/// is exercised without a real renderer.
pub(super) struct StubRasterizer {
    pub(super) line_height_px: u32,
    pub(super) fail: bool,
}

impl Default for StubRasterizer {
    fn default() -> Self {
        Self {
            line_height_px: 48,
            fail: false,
        }
    }
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, view: &AdmitCardView) -> Result<RasterImage, RasterizeError> {
        if self.fail {
            return Err(RasterizeError("renderer unavailable".to_string()));
        }
        let height_px = view.content_lines() as u32 * self.line_height_px;
        Ok(RasterImage {
            width_px: 1240,
            height_px,
            png_data: vec![0x89, 0x50, 0x4E, 0x47],
        })
    }
}

#[derive(Default)]
pub(super) struct StubEncoder;

impl DocumentEncoder for StubEncoder {
    fn encode(&self, image: &RasterImage, pages: &[PageSlice]) -> Result<Vec<u8>, EncodeError> {
        if pages.is_empty() {
            return Err(EncodeError("no pages".to_string()));
        }
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(&image.png_data);
        bytes.extend_from_slice(format!("\n%%pages:{}", pages.len()).as_bytes());
        Ok(bytes)
    }
}

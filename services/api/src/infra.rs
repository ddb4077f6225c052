use chrono::NaiveDate;
use exam_portal::workflows::registration::{
    AdmitCardNotice, AdmitCardView, AllocationPolicy, ApplicationNumber, DocumentEncoder,
    EncodeError, ExamAllocation, Notifier, NotifyError, PageSlice, PersonalInfo, RasterImage,
    RasterizeError, Rasterizer, RegistrationState, RosterAllocationPolicy, SeededAllocationPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Allocation strategy selected at startup: the sequential roster by
/// default, or the seeded randomized policy when `--seed` is given.
pub(crate) enum PortalPolicy {
    Roster(RosterAllocationPolicy),
    Seeded(SeededAllocationPolicy),
}

impl PortalPolicy {
    pub(crate) fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => PortalPolicy::Seeded(SeededAllocationPolicy::from_seed(seed)),
            None => PortalPolicy::Roster(RosterAllocationPolicy),
        }
    }
}

impl AllocationPolicy for PortalPolicy {
    fn allocate(&self, info: &PersonalInfo) -> (ApplicationNumber, ExamAllocation) {
        match self {
            PortalPolicy::Roster(policy) => policy.allocate(info),
            PortalPolicy::Seeded(policy) => policy.allocate(info),
        }
    }
}

pub(crate) type PortalState =
    RegistrationState<PortalPolicy, TextRasterizer, PdfLineEncoder, OutboxNotifier>;

/// Lays the admit card out as text lines. This deployment carries no
/// headless renderer; the raster bytes are the laid-out text and the
/// paired [`PdfLineEncoder`] consumes them line by line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextRasterizer {
    pub(crate) width_px: u32,
    pub(crate) line_height_px: u32,
}

impl Default for TextRasterizer {
    fn default() -> Self {
        // A4 width at 150dpi.
        Self {
            width_px: 1240,
            line_height_px: 48,
        }
    }
}

impl TextRasterizer {
    fn card_lines(view: &AdmitCardView) -> Vec<String> {
        let mut lines = vec![
            view.exam_title.clone(),
            format!("Application Number: {}", view.application_number),
            format!("Union: {}", view.union),
            String::new(),
            format!("Candidate Name: {}", view.name),
            format!("Father's Name: {}", view.father_name),
            format!("Mother's Name: {}", view.mother_name),
            format!("Date of Birth: {}", view.dob),
            format!("Gender: {}", view.gender),
            format!("Aadhaar Number: {}", view.aadhaar_number),
            format!("Posts Applied: {}", view.posts),
            format!("District Preferences: {}", view.district_preferences),
            String::new(),
            format!("Exam Center: {}", view.exam_center),
            format!("Shift: {}", view.exam_shift),
            format!("Gate Entry: {}", view.gate_entry),
            format!("Scan Code: {}", view.qr_payload),
            String::new(),
            "Instructions:".to_string(),
        ];
        lines.extend(
            [
                "1. Carry this admit card and a valid photo ID to the exam center.",
                "2. Gate entry closes 30 minutes before the shift start time.",
                "3. Electronic devices are not permitted inside the exam hall.",
                "4. Occupy only the seat mentioned on this card.",
                "5. Preserve this admit card until results are declared.",
                "6. Follow all instructions given by the invigilator.",
            ]
            .map(str::to_string),
        );
        lines
    }
}

impl Rasterizer for TextRasterizer {
    fn rasterize(&self, view: &AdmitCardView) -> Result<RasterImage, RasterizeError> {
        let lines = Self::card_lines(view);
        let height_px = (lines.len() as u32)
            .checked_mul(self.line_height_px)
            .ok_or_else(|| RasterizeError("card layout exceeds raster bounds".to_string()))?;
        Ok(RasterImage {
            width_px: self.width_px,
            height_px,
            png_data: lines.join("\n").into_bytes(),
        })
    }
}

/// Hand-written minimal PDF writer: one Helvetica text page per slice,
/// no compression, plain cross-reference table.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PdfLineEncoder;

const PAGE_WIDTH_PT: f64 = 595.0;
const PAGE_HEIGHT_PT: f64 = 842.0;
const MARGIN_PT: f64 = 48.0;
const LEADING_PT: f64 = 14.0;

fn escape_pdf_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn page_content(lines: &[&str]) -> String {
    let mut stream = String::from("BT\n/F1 11 Tf\n");
    stream.push_str(&format!(
        "1 0 0 1 {MARGIN_PT} {} Tm\n{LEADING_PT} TL\n",
        PAGE_HEIGHT_PT - MARGIN_PT
    ));
    for line in lines {
        stream.push_str(&format!("({}) Tj T*\n", escape_pdf_text(line)));
    }
    stream.push_str("ET\n");
    stream
}

impl DocumentEncoder for PdfLineEncoder {
    fn encode(&self, image: &RasterImage, pages: &[PageSlice]) -> Result<Vec<u8>, EncodeError> {
        let text = std::str::from_utf8(&image.png_data)
            .map_err(|err| EncodeError(format!("raster bytes are not a text layout: {err}")))?;
        let lines: Vec<&str> = text.lines().collect();
        let page_count = pages.len().max(1);
        let lines_per_page = lines.len().div_ceil(page_count).max(1);

        // Objects: 1 catalog, 2 page tree, 3 font, then a page and a
        // content stream per slice.
        let object_count = 3 + 2 * page_count;
        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = vec![0usize; object_count + 1];

        let push_object = |out: &mut Vec<u8>, offsets: &mut Vec<usize>, num: usize, body: String| {
            offsets[num] = out.len();
            out.extend(format!("{num} 0 obj\n{body}\nendobj\n").bytes());
        };

        let kids = (0..page_count)
            .map(|index| format!("{} 0 R", 4 + 2 * index))
            .collect::<Vec<_>>()
            .join(" ");
        push_object(&mut out, &mut offsets, 1, "<< /Type /Catalog /Pages 2 0 R >>".to_string());
        push_object(
            &mut out,
            &mut offsets,
            2,
            format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"),
        );
        push_object(
            &mut out,
            &mut offsets,
            3,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        );

        for index in 0..page_count {
            let start = index * lines_per_page;
            let end = (start + lines_per_page).min(lines.len());
            let slice = if start < lines.len() {
                &lines[start..end]
            } else {
                &[]
            };
            let content = page_content(slice);

            let page_object = 4 + 2 * index;
            let stream_object = page_object + 1;
            push_object(
                &mut out,
                &mut offsets,
                page_object,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH_PT} {PAGE_HEIGHT_PT}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {stream_object} 0 R >>"
                ),
            );
            push_object(
                &mut out,
                &mut offsets,
                stream_object,
                format!("<< /Length {} >>\nstream\n{content}endstream", content.len()),
            );
        }

        let xref_start = out.len();
        out.extend(format!("xref\n0 {}\n", object_count + 1).bytes());
        out.extend(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            out.extend(format!("{offset:010} 00000 n \n").bytes());
        }
        out.extend(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
                object_count + 1
            )
            .bytes(),
        );
        Ok(out)
    }
}

/// Notification transport stub: notices are logged and parked in an
/// outbox instead of being handed to a mail relay.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    outbox: Arc<Mutex<Vec<AdmitCardNotice>>>,
}

impl OutboxNotifier {
    pub(crate) fn sent(&self) -> Vec<AdmitCardNotice> {
        self.outbox.lock().expect("outbox mutex poisoned").clone()
    }
}

impl Notifier for OutboxNotifier {
    fn dispatch(&self, notice: AdmitCardNotice) -> Result<(), NotifyError> {
        info!(
            application_number = %notice.application_number,
            recipient = %notice.recipient_email,
            "admit card notice queued for delivery"
        );
        self.outbox
            .lock()
            .map_err(|_| NotifyError::Transport("outbox mutex poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_portal::workflows::registration::paginate;

    fn sample_view() -> AdmitCardView {
        AdmitCardView {
            application_number: "CBT2025-000001".to_string(),
            union: "Harit Union".to_string(),
            exam_title: "Admit Card for Computer Based Test (CBT): June 2025".to_string(),
            exam_center: "DAV PUBLIC SCHOOL, RANCHI".to_string(),
            exam_shift: "A (9:00 AM - 10:00 AM, 12-06-2025)".to_string(),
            gate_entry: "30 minutes before shift start time".to_string(),
            name: "Anjali Kumari".to_string(),
            father_name: "Rajesh Kumar".to_string(),
            mother_name: "Sunita Devi".to_string(),
            dob: "17-04-1998".to_string(),
            gender: "FEMALE".to_string(),
            aadhaar_number: "123456789012".to_string(),
            posts: "Assistant Manager".to_string(),
            district_preferences: "Patna".to_string(),
            photo_data_url: None,
            signature_data_url: None,
            qr_payload: "APPNO:CBT2025-000001".to_string(),
        }
    }

    #[test]
    fn rasterizer_sizes_by_line_count() {
        let rasterizer = TextRasterizer::default();
        let image = rasterizer.rasterize(&sample_view()).expect("raster builds");
        assert_eq!(image.width_px, 1240);
        assert_eq!(image.height_px % rasterizer.line_height_px, 0);
        assert!(String::from_utf8(image.png_data)
            .expect("text layout")
            .contains("Application Number: CBT2025-000001"));
    }

    #[test]
    fn encoder_emits_one_pdf_page_per_slice() {
        let rasterizer = TextRasterizer::default();
        let image = rasterizer.rasterize(&sample_view()).expect("raster builds");
        let pages = paginate(&image);

        let bytes = PdfLineEncoder.encode(&image, &pages).expect("pdf encodes");
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains(&format!("/Count {}", pages.len())));
        assert!(pdf.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn pdf_text_is_escaped() {
        assert_eq!(escape_pdf_text("A (9:00 AM)"), "A \\(9:00 AM\\)");
        assert_eq!(escape_pdf_text("back\\slash"), "back\\\\slash");
    }
}

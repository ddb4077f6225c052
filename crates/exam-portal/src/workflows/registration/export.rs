use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::admit_card::{AdmitCardError, AdmitCardView};
use super::store::RegistrationRecord;

/// A4 geometry in millimetres; the raster is scaled to the page width and
/// split across pages by height.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Raster output of the black-box rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub png_data: Vec<u8>,
}

/// One page slice of the scaled raster. `offset_mm` is the vertical shift
/// of the full image relative to the page top (zero or negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub offset_mm: f64,
    pub image_height_mm: f64,
}

/// View-to-raster rendering, treated as an external collaborator.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, view: &AdmitCardView) -> Result<RasterImage, RasterizeError>;
}

#[derive(Debug, thiserror::Error)]
#[error("rasterization failed: {0}")]
pub struct RasterizeError(pub String);

/// Paginated-document encoding, treated as an external collaborator.
pub trait DocumentEncoder: Send + Sync {
    fn encode(&self, image: &RasterImage, pages: &[PageSlice]) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Debug, thiserror::Error)]
#[error("document encoding failed: {0}")]
pub struct EncodeError(pub String);

/// Outbound admit-card notification (e-mail stub in this deployment).
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notice: AdmitCardNotice) -> Result<(), NotifyError>;
}

/// Payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmitCardNotice {
    pub application_number: String,
    pub recipient_email: String,
    pub candidate_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Export failure taxonomy. Rasterization and encoding failures produce a
/// single user-visible error and no partial output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Gate(#[from] AdmitCardError),
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Finished download: the encoded document plus its public file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Compute the page slices for a raster scaled to the fixed page width.
/// Height follows the aspect ratio; a new page is added while remaining
/// content height exceeds one page.
pub fn paginate(image: &RasterImage) -> Vec<PageSlice> {
    let image_height_mm = if image.width_px == 0 {
        PAGE_HEIGHT_MM
    } else {
        f64::from(image.height_px) * PAGE_WIDTH_MM / f64::from(image.width_px)
    };

    let mut pages = Vec::new();
    let mut height_left = image_height_mm;
    let mut offset_mm = 0.0;
    pages.push(PageSlice {
        offset_mm,
        image_height_mm,
    });
    height_left -= PAGE_HEIGHT_MM;
    while height_left > 0.0 {
        offset_mm -= PAGE_HEIGHT_MM;
        pages.push(PageSlice {
            offset_mm,
            image_height_mm,
        });
        height_left -= PAGE_HEIGHT_MM;
    }
    pages
}

/// Render-to-raster-to-document pipeline behind the terminal step.
pub struct ExportService<Z, E, N> {
    rasterizer: Arc<Z>,
    encoder: Arc<E>,
    notifier: Arc<N>,
}

impl<Z, E, N> ExportService<Z, E, N>
where
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    pub fn new(rasterizer: Arc<Z>, encoder: Arc<E>, notifier: Arc<N>) -> Self {
        Self {
            rasterizer,
            encoder,
            notifier,
        }
    }

    /// Produce the downloadable admit card for a paid-up record.
    ///
    /// The notification dispatch is returned as its own task handle so the
    /// caller decides whether to await it; its failure never blocks the
    /// download.
    pub fn export(
        &self,
        record: &RegistrationRecord,
    ) -> Result<(ExportedDocument, JoinHandle<Result<(), NotifyError>>), ExportError> {
        let view = AdmitCardView::from_record(record)?;

        let notice = AdmitCardNotice {
            application_number: view.application_number.clone(),
            recipient_email: record
                .personal_info
                .as_ref()
                .map(|info| info.email.clone())
                .unwrap_or_default(),
            candidate_name: view.name.clone(),
        };
        let notification = dispatch_notification(self.notifier.clone(), notice);

        let image = self.rasterizer.rasterize(&view)?;
        let pages = paginate(&image);
        let bytes = self.encoder.encode(&image, &pages)?;

        let document = ExportedDocument {
            file_name: format!("admit_card_{}.pdf", view.application_number),
            bytes,
            page_count: pages.len(),
        };
        info!(
            file_name = %document.file_name,
            pages = document.page_count,
            "admit card exported"
        );
        Ok((document, notification))
    }
}

/// Fire the notification as an explicit asynchronous task with its own
/// result type. Callers may await the handle or drop it.
pub fn dispatch_notification<N>(
    notifier: Arc<N>,
    notice: AdmitCardNotice,
) -> JoinHandle<Result<(), NotifyError>>
where
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        let application_number = notice.application_number.clone();
        let result = notifier.dispatch(notice);
        if let Err(error) = &result {
            warn!(%application_number, %error, "admit card notification failed");
        }
        result
    })
}

use std::sync::Arc;

use super::common::*;
use crate::workflows::registration::domain::Union;
use crate::workflows::registration::export::{
    paginate, ExportError, ExportService, NotifyError, RasterImage, PAGE_HEIGHT_MM,
};
use crate::workflows::registration::workflow::RegistrationWorkflow;

async fn paid_workflow(
    union: Union,
) -> RegistrationWorkflow<crate::workflows::registration::allocation::RosterAllocationPolicy> {
    let mut workflow = build_workflow();
    advance_to_payment(&mut workflow, union).await;
    workflow
        .submit_payment("TXN-500", "2025-06-01")
        .await
        .expect("payment verifies");
    workflow
}

fn build_exporter(
    notifier: MemoryNotifier,
) -> ExportService<StubRasterizer, StubEncoder, MemoryNotifier> {
    ExportService::new(
        Arc::new(StubRasterizer::default()),
        Arc::new(StubEncoder),
        Arc::new(notifier),
    )
}

#[test]
fn single_page_raster_yields_one_slice() {
    let image = RasterImage {
        width_px: 1240,
        height_px: 1500,
        png_data: Vec::new(),
    };
    let pages = paginate(&image);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].offset_mm, 0.0);
}

#[test]
fn tall_raster_splits_into_pages_while_height_remains() {
    // 1000px wide, 3000px tall scales to 630mm at page width: three pages.
    let image = RasterImage {
        width_px: 1000,
        height_px: 3000,
        png_data: Vec::new(),
    };
    let pages = paginate(&image);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].offset_mm, -PAGE_HEIGHT_MM);
    assert_eq!(pages[2].offset_mm, -2.0 * PAGE_HEIGHT_MM);
}

#[tokio::test]
async fn export_is_gated_on_payment() {
    let mut workflow = build_workflow();
    advance_to_payment(&mut workflow, Union::Harit).await;

    let notifier = MemoryNotifier::default();
    let exporter = build_exporter(notifier.clone());

    match exporter.export(workflow.record()) {
        Err(ExportError::Gate(_)) => {}
        other => panic!("expected payment gate, got {other:?}"),
    }
    assert!(notifier.notices().is_empty(), "gate must precede dispatch");
}

#[tokio::test]
async fn export_names_file_by_application_number() {
    let workflow = paid_workflow(Union::Harit).await;
    let number = workflow
        .record()
        .application_number
        .as_ref()
        .expect("allocated")
        .0
        .clone();

    let notifier = MemoryNotifier::default();
    let exporter = build_exporter(notifier.clone());

    let (document, notification) = exporter
        .export(workflow.record())
        .expect("export succeeds");
    assert_eq!(document.file_name, format!("admit_card_{number}.pdf"));
    assert!(!document.bytes.is_empty());
    assert_eq!(document.page_count, 1);

    notification
        .await
        .expect("task joins")
        .expect("notification delivered");
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].application_number, number);
    assert_eq!(notices[0].recipient_email, "anjali.kumari@example.com");
}

#[tokio::test]
async fn notification_failure_does_not_block_download() {
    let workflow = paid_workflow(Union::Harit).await;

    let exporter = build_exporter(MemoryNotifier::failing());
    let (document, notification) = exporter
        .export(workflow.record())
        .expect("export succeeds despite notifier");
    assert!(!document.bytes.is_empty());

    match notification.await.expect("task joins") {
        Err(NotifyError::Transport(_)) => {}
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn rasterization_failure_is_a_single_error() {
    let workflow = paid_workflow(Union::Harit).await;

    let exporter = ExportService::new(
        Arc::new(StubRasterizer {
            fail: true,
            ..StubRasterizer::default()
        }),
        Arc::new(StubEncoder),
        Arc::new(MemoryNotifier::default()),
    );

    match exporter.export(workflow.record()) {
        Err(ExportError::Rasterize(_)) => {}
        other => panic!("expected rasterize failure, got {other:?}"),
    }
}

use crate::infra::{parse_date, OutboxNotifier, PdfLineEncoder, PortalPolicy, TextRasterizer};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use exam_portal::error::AppError;
use exam_portal::workflows::registration::{
    payload_from_bytes, District, ExportService, FilePayload, FormVariant, Gender, PersonalInfo,
    Post, RegistrationConfig, RegistrationForm, RegistrationWorkflow, Transition, Union,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Union the demo candidate registers under
    #[arg(long, value_enum, default_value = "harit")]
    pub(crate) union: DemoUnion,
    /// Candidate date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) dob: Option<NaiveDate>,
    /// Photo to attach instead of the built-in placeholder
    #[arg(long)]
    pub(crate) photo: Option<PathBuf>,
    /// Signature to attach instead of the built-in placeholder
    #[arg(long)]
    pub(crate) signature: Option<PathBuf>,
    /// Where to write the exported admit card
    #[arg(long, default_value = "admit_card.pdf")]
    pub(crate) output: PathBuf,
    /// Use the seeded randomized allocation policy instead of the roster
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub(crate) enum DemoUnion {
    #[default]
    Harit,
    Tirhut,
}

impl From<DemoUnion> for Union {
    fn from(value: DemoUnion) -> Self {
        match value {
            DemoUnion::Harit => Union::Harit,
            DemoUnion::Tirhut => Union::Tirhut,
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        union,
        dob,
        photo,
        signature,
        output,
        seed,
    } = args;
    let union = Union::from(union);

    println!("Exam registration portal demo");
    println!(
        "Candidate journey: registration -> documents -> payment -> admit card ({})",
        union.label()
    );

    let mut workflow = RegistrationWorkflow::new(
        PortalPolicy::from_seed(seed),
        RegistrationConfig::default(),
    );
    workflow.begin();

    let form = demo_form(union, dob, photo.as_deref(), signature.as_deref())?;
    let candidate = form.personal_info.name.clone();
    workflow.submit_registration(form)?;
    let record = workflow.record();
    let number = record
        .application_number
        .as_ref()
        .map(|number| number.0.clone())
        .unwrap_or_default();
    println!("\nStep 1: registration accepted for {candidate}");
    println!("- application number {number}");
    println!(
        "- allocated {} | shift {}",
        record.exam_center.as_deref().unwrap_or("-"),
        record.exam_shift.as_deref().unwrap_or("-")
    );

    workflow.submit_documents(
        payload_from_bytes("id_proof.pdf", "application/pdf", DEMO_PDF),
        payload_from_bytes("address_proof.pdf", "application/pdf", DEMO_PDF),
    )?;
    println!("\nStep 2: ID and address proofs uploaded");

    let config = workflow.config();
    println!(
        "\nStep 3: paying INR {} to {} (verification takes a moment)",
        config.exam_fee_inr, config.upi_payee
    );
    println!("- scan to pay: {}", config.payment_qr_payload());
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let transition = workflow.submit_payment("DEMO-TXN-0001", &today).await?;

    if let Transition::Deferred { message } = transition {
        println!("- payment verified");
        println!("- {message}");
        return Ok(());
    }
    println!("- payment verified; admit card download unlocked");

    let found = workflow.search(&number).await?;
    println!("\nStep 4: searched record for {number}");

    let notifier = OutboxNotifier::default();
    let exporter = ExportService::new(
        Arc::new(TextRasterizer::default()),
        Arc::new(PdfLineEncoder),
        Arc::new(notifier.clone()),
    );
    let (document, notification) = exporter.export(&found)?;
    std::fs::write(&output, &document.bytes)?;
    println!(
        "- exported {} ({} page{}) to {}",
        document.file_name,
        document.page_count,
        if document.page_count == 1 { "" } else { "s" },
        output.display()
    );

    // The download never waits on this; the demo does, to report it.
    let delivered = matches!(notification.await, Ok(Ok(())));
    if delivered {
        for notice in notifier.sent() {
            println!("- notice queued for {}", notice.recipient_email);
        }
    } else {
        println!("- admit card notice could not be queued");
    }

    Ok(())
}

const DEMO_PDF: &[u8] = b"%PDF-1.4 demo proof document";
const DEMO_IMAGE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn demo_form(
    union: Union,
    dob: Option<NaiveDate>,
    photo: Option<&Path>,
    signature: Option<&Path>,
) -> Result<RegistrationForm, AppError> {
    let dob = dob
        .or_else(|| NaiveDate::from_ymd_opt(1998, 4, 17))
        .unwrap_or_default();
    let district_preferences = match union {
        Union::Harit => vec![District::Patna, District::Nalanda],
        Union::Tirhut => vec![District::Vaishali, District::Samastipur],
    };

    let photo = match photo {
        Some(path) => load_payload(path)?,
        None => payload_from_bytes("photo.png", "image/png", DEMO_IMAGE),
    };
    let signature = match signature {
        Some(path) => load_payload(path)?,
        None => payload_from_bytes("signature.png", "image/png", DEMO_IMAGE),
    };

    Ok(RegistrationForm {
        variant: FormVariant::Standard,
        personal_info: PersonalInfo {
            union,
            name: "Anjali Kumari".to_string(),
            father_name: "Rajesh Kumar".to_string(),
            mother_name: "Sunita Devi".to_string(),
            dob,
            gender: Gender::Female,
            email: "anjali.kumari@example.com".to_string(),
            mobile: "9876543210".to_string(),
            address: "12 Bailey Road, Patna".to_string(),
            aadhaar_number: "123456789012".to_string(),
            selected_posts: vec![Post::AssistantManager, Post::DataEntryOperator],
            district_preferences,
        },
        photo: Some(photo),
        signature: Some(signature),
        cv: None,
        work_certificate: None,
        qualification_certificate: None,
    })
}

fn load_payload(path: &Path) -> Result<FilePayload, AppError> {
    let bytes = std::fs::read(path)?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    Ok(payload_from_bytes(
        &file_name,
        content_type.essence_str(),
        &bytes,
    ))
}

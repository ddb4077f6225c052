use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::allocation::AllocationPolicy;
use super::export::{DocumentEncoder, ExportError, ExportService, Notifier, Rasterizer};
use super::store::RegistrationRecord;
use super::upload::FilePayload;
use super::workflow::{RegistrationForm, RegistrationWorkflow, Transition, WorkflowError};

/// Shared state for the workflow endpoints: the single-session workflow
/// behind an async mutex (one mutator at a time) plus the export pipeline.
pub struct RegistrationState<P, Z, E, N> {
    pub workflow: Mutex<RegistrationWorkflow<P>>,
    pub exporter: ExportService<Z, E, N>,
}

/// Router builder exposing the step-controller endpoints.
pub fn registration_router<P, Z, E, N>(state: Arc<RegistrationState<P, Z, E, N>>) -> Router
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/registration",
            post(submit_registration_handler::<P, Z, E, N>),
        )
        .route(
            "/api/v1/registration/documents",
            post(submit_documents_handler::<P, Z, E, N>),
        )
        .route(
            "/api/v1/registration/payment",
            post(submit_payment_handler::<P, Z, E, N>),
        )
        .route(
            "/api/v1/admit-card/:application_number",
            get(search_handler::<P, Z, E, N>),
        )
        .route(
            "/api/v1/admit-card/:application_number/export",
            post(export_handler::<P, Z, E, N>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DocumentUploadRequest {
    pub id_proof: FilePayload,
    pub address_proof: FilePayload,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub transaction_number: String,
    pub transaction_date: String,
}

/// Step outcome exposed to the client after each submission.
#[derive(Debug, Serialize)]
pub struct StepView {
    pub transition: &'static str,
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_number: Option<String>,
}

impl StepView {
    fn from_transition(transition: Transition, record: &RegistrationRecord) -> Self {
        let application_number = record
            .application_number
            .as_ref()
            .map(|number| number.0.clone());
        match transition {
            Transition::Advanced(stage) => Self {
                transition: "advanced",
                stage: stage.label(),
                message: None,
                application_number,
            },
            Transition::Redirected(stage) => Self {
                transition: "redirected",
                stage: stage.label(),
                message: None,
                application_number,
            },
            Transition::Deferred { message } => Self {
                transition: "deferred",
                stage: super::workflow::WorkflowStage::Home.label(),
                message: Some(message),
                application_number,
            },
        }
    }
}

/// Sanitized lookup result for the admit-card search page.
#[derive(Debug, Serialize)]
pub struct SearchResultView {
    pub application_number: String,
    pub candidate_name: String,
    pub exam_center: Option<String>,
    pub exam_shift: Option<String>,
    pub payment_status: bool,
}

impl SearchResultView {
    fn from_record(record: &RegistrationRecord) -> Self {
        Self {
            application_number: record
                .application_number
                .as_ref()
                .map(|number| number.0.clone())
                .unwrap_or_default(),
            candidate_name: record
                .personal_info
                .as_ref()
                .map(|info| info.name.clone())
                .unwrap_or_default(),
            exam_center: record.exam_center.clone(),
            exam_shift: record.exam_shift.clone(),
            payment_status: record.payment_status,
        }
    }
}

async fn submit_registration_handler<P, Z, E, N>(
    State(state): State<Arc<RegistrationState<P, Z, E, N>>>,
    axum::Json(form): axum::Json<RegistrationForm>,
) -> Response
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    let mut workflow = state.workflow.lock().await;
    match workflow.submit_registration(form) {
        Ok(transition) => {
            let view = StepView::from_transition(transition, workflow.record());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => workflow_error_response(error),
    }
}

async fn submit_documents_handler<P, Z, E, N>(
    State(state): State<Arc<RegistrationState<P, Z, E, N>>>,
    axum::Json(request): axum::Json<DocumentUploadRequest>,
) -> Response
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    let mut workflow = state.workflow.lock().await;
    match workflow.submit_documents(request.id_proof, request.address_proof) {
        Ok(transition) => {
            let view = StepView::from_transition(transition, workflow.record());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => workflow_error_response(error),
    }
}

async fn submit_payment_handler<P, Z, E, N>(
    State(state): State<Arc<RegistrationState<P, Z, E, N>>>,
    axum::Json(request): axum::Json<PaymentRequest>,
) -> Response
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    let mut workflow = state.workflow.lock().await;
    match workflow
        .submit_payment(&request.transaction_number, &request.transaction_date)
        .await
    {
        Ok(transition) => {
            let view = StepView::from_transition(transition, workflow.record());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => workflow_error_response(error),
    }
}

async fn search_handler<P, Z, E, N>(
    State(state): State<Arc<RegistrationState<P, Z, E, N>>>,
    Path(application_number): Path<String>,
) -> Response
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    let workflow = state.workflow.lock().await;
    match workflow.search(&application_number).await {
        Ok(record) => {
            let view = SearchResultView::from_record(&record);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => workflow_error_response(error),
    }
}

async fn export_handler<P, Z, E, N>(
    State(state): State<Arc<RegistrationState<P, Z, E, N>>>,
    Path(application_number): Path<String>,
) -> Response
where
    P: AllocationPolicy + 'static,
    Z: Rasterizer + 'static,
    E: DocumentEncoder + 'static,
    N: Notifier + 'static,
{
    let record = {
        let workflow = state.workflow.lock().await;
        match workflow.search(&application_number).await {
            Ok(record) => record,
            Err(error) => return workflow_error_response(error),
        }
    };

    match state.exporter.export(&record) {
        Ok((document, _notification)) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(ExportError::Gate(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn workflow_error_response(error: WorkflowError) -> Response {
    let status = match &error {
        WorkflowError::Validation(_) | WorkflowError::Upload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::Store(_) => StatusCode::CONFLICT,
        WorkflowError::NotFound => StatusCode::NOT_FOUND,
        WorkflowError::VerificationTimeout => StatusCode::GATEWAY_TIMEOUT,
    };

    let payload = match &error {
        WorkflowError::Validation(fields) => json!({
            "error": "validation failed",
            "fields": fields
                .iter()
                .map(|field| json!({ "field": field.field, "message": field.message }))
                .collect::<Vec<_>>(),
        }),
        WorkflowError::Upload(upload) => json!({
            "error": upload.to_string(),
            "field": upload.field().label(),
        }),
        other => json!({ "error": other.to_string() }),
    };

    (status, axum::Json(payload)).into_response()
}

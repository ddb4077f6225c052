use crate::cli::ServeArgs;
use crate::infra::{AppState, OutboxNotifier, PdfLineEncoder, PortalPolicy, TextRasterizer};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use exam_portal::config::AppConfig;
use exam_portal::error::AppError;
use exam_portal::telemetry;
use exam_portal::workflows::registration::{
    ExportService, RegistrationConfig, RegistrationState, RegistrationWorkflow,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let policy = PortalPolicy::from_seed(args.seed);
    let portal_state = Arc::new(RegistrationState {
        workflow: Mutex::new(RegistrationWorkflow::new(
            policy,
            RegistrationConfig::default(),
        )),
        exporter: ExportService::new(
            Arc::new(TextRasterizer::default()),
            Arc::new(PdfLineEncoder),
            Arc::new(OutboxNotifier::default()),
        ),
    });

    let app = with_portal_routes(portal_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "exam registration portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{AppState, EnvAuthorizer, InMemoryInspectionStore, TracingAuditSink};
use crate::routes::with_inspection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use fleet_safety::config::AppConfig;
use fleet_safety::error::AppError;
use fleet_safety::telemetry;
use fleet_safety::workflows::inspection::InspectionService;
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

    let store = Arc::new(InMemoryInspectionStore::default());
    let authorizer = Arc::new(EnvAuthorizer::from_env());
    let audit = Arc::new(TracingAuditSink);
    let inspection_service = Arc::new(InspectionService::new(store, authorizer, audit));

    let app = with_inspection_routes(inspection_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fleet safety inspection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

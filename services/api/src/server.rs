use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryExaminationStore};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use surgiscan::config::AppConfig;
use surgiscan::error::AppError;
use surgiscan::telemetry;
use surgiscan::workflows::certification::{
    CertificateAssembler, CertificateReviewService, PlainTextRenderer, ReviewError,
};
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

    let store = if args.seed_demo {
        InMemoryExaminationStore::seeded(Local::now().date_naive()).map_err(ReviewError::from)?
    } else {
        InMemoryExaminationStore::default()
    };
    let assembler = CertificateAssembler::new(config.practice.clone(), PlainTextRenderer);
    let review_service = Arc::new(CertificateReviewService::new(
        Arc::new(store.clone()),
        assembler,
        config.assessment,
    ));

    let app = with_operational_routes(review_service, store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        critical_findings = ?config.assessment.critical_findings,
        "fitness certification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

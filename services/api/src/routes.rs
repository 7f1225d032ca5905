use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use surgiscan::workflows::certification::{
    certification_router, CertificateReviewService, DocumentRenderer, IntakeRecord,
    ValidationEngine,
};
use tracing::{info, warn};

use crate::infra::{AppState, ExaminationBundle, InMemoryExaminationStore};

pub(crate) fn with_operational_routes<D>(
    service: Arc<CertificateReviewService<InMemoryExaminationStore, D>>,
    store: InMemoryExaminationStore,
) -> axum::Router
where
    D: DocumentRenderer + 'static,
{
    certification_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/examinations",
            axum::routing::post(admit_examination).layer(Extension(store)),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Loads a completed set of station records so a certificate can be requested for it.
///
/// The questionnaire's section progress is recomputed from the intake before storing.
pub(crate) async fn admit_examination(
    Extension(store): Extension<InMemoryExaminationStore>,
    Json(mut bundle): Json<ExaminationBundle>,
) -> Response {
    let patient_id = bundle.patient.id.clone();
    let mut questionnaire = bundle.questionnaire.take().unwrap_or_default();
    let intake = IntakeRecord::for_patient(&bundle.patient, questionnaire.clone());
    let validation = ValidationEngine::new().validate(&intake, bundle.patient.examination_type);
    questionnaire.section_progress = validation.section_progress();
    let section_progress = questionnaire.section_progress.clone();
    bundle.questionnaire = Some(questionnaire);

    match store.admit(bundle) {
        Ok(()) => {
            info!(
                patient_id = %patient_id.0,
                completion = validation.completion_percentage,
                "examination admitted"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "patient_id": patient_id,
                    "section_progress": section_progress,
                })),
            )
                .into_response()
        }
        Err(err) => {
            warn!(patient_id = %patient_id.0, error = %err, "examination not admitted");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

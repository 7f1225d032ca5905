use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use super::assessment::FitnessAssessmentCriteria;
use super::certificate::{CertificateError, DocumentRenderer, PractitionerIdentity};
use super::domain::{ExaminationType, IntakeRecord, PatientId};
use super::repository::ExaminationStore;
use super::service::{
    CertificateGenerationResult, CertificateReview, CertificateReviewService,
    PractitionerOverride, ReviewError,
};
use super::validation::ValidationResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateRequest {
    pub record: IntakeRecord,
    pub examination_type: ExaminationType,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    #[serde(flatten)]
    result: ValidationResult,
    is_valid: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequest {
    pub practitioner: PractitionerIdentity,
    #[serde(default, rename = "override")]
    pub practitioner_override: Option<PractitionerOverride>,
}

/// Router exposing intake validation, assessment and certificate issuing.
pub fn certification_router<S, D>(service: Arc<CertificateReviewService<S, D>>) -> Router
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    Router::new()
        .route("/api/v1/intake/validate", post(validate_handler::<S, D>))
        .route("/api/v1/assessments", post(assess_handler::<S, D>))
        .route(
            "/api/v1/patients/:patient_id/certificate",
            post(certificate_handler::<S, D>),
        )
        .route(
            "/api/v1/patients/:patient_id/certificate/document",
            post(document_handler::<S, D>),
        )
        .with_state(service)
}

pub(crate) fn review_error_status(error: &ReviewError) -> StatusCode {
    match error {
        ReviewError::PatientNotFound => StatusCode::NOT_FOUND,
        ReviewError::Certificate(CertificateError::Assembly(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewError::Certificate(CertificateError::Render(_)) | ReviewError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) async fn validate_handler<S, D>(
    State(service): State<Arc<CertificateReviewService<S, D>>>,
    axum::Json(request): axum::Json<ValidateRequest>,
) -> Response
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    let result = service.validate(&request.record, request.examination_type);
    let is_valid = result.is_valid();
    (
        StatusCode::OK,
        axum::Json(ValidateResponse { result, is_valid }),
    )
        .into_response()
}

pub(crate) async fn assess_handler<S, D>(
    State(service): State<Arc<CertificateReviewService<S, D>>>,
    axum::Json(criteria): axum::Json<FitnessAssessmentCriteria>,
) -> Response
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    let decision = service.assess(&criteria);
    (StatusCode::OK, axum::Json(decision)).into_response()
}

async fn run_review<S, D>(
    service: Arc<CertificateReviewService<S, D>>,
    patient_id: String,
    request: CertificateRequest,
) -> Result<Result<CertificateReview, ReviewError>, tokio::task::JoinError>
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    tokio::task::spawn_blocking(move || {
        service.review(
            &PatientId(patient_id),
            &request.practitioner,
            request.practitioner_override,
        )
    })
    .await
}

pub(crate) async fn certificate_handler<S, D>(
    State(service): State<Arc<CertificateReviewService<S, D>>>,
    Path(patient_id): Path<String>,
    axum::Json(request): axum::Json<CertificateRequest>,
) -> Response
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    match run_review(service, patient_id, request).await {
        Ok(Ok(review)) => {
            let result = CertificateGenerationResult::from(Ok(review));
            (StatusCode::OK, axum::Json(result)).into_response()
        }
        Ok(Err(error)) => {
            let status = review_error_status(&error);
            let result = CertificateGenerationResult::from(Err(error));
            (status, axum::Json(result)).into_response()
        }
        Err(join_error) => {
            let result = CertificateGenerationResult::failure(join_error.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(result)).into_response()
        }
    }
}

pub(crate) async fn document_handler<S, D>(
    State(service): State<Arc<CertificateReviewService<S, D>>>,
    Path(patient_id): Path<String>,
    axum::Json(request): axum::Json<CertificateRequest>,
) -> Response
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    match run_review(service, patient_id, request).await {
        Ok(Ok(review)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, review.document.content_type)],
            review.document.bytes,
        )
            .into_response(),
        Ok(Err(error)) => {
            let status = review_error_status(&error);
            let result = CertificateGenerationResult::from(Err(error));
            (status, axum::Json(result)).into_response()
        }
        Err(join_error) => {
            let result = CertificateGenerationResult::failure(join_error.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(result)).into_response()
        }
    }
}

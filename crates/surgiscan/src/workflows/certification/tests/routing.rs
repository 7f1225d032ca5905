use super::common::*;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::certification::assessment::{AssessmentConfig, DrugScreenStatus};
use crate::workflows::certification::certificate::PlainTextRenderer;
use crate::workflows::certification::domain::ExaminationType;
use crate::workflows::certification::router::CertificateRequest;
use crate::workflows::certification::CertificateReviewService;

fn post_json(uri: &str, payload: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request")
}

fn certificate_request() -> Value {
    json!({ "practitioner": practitioner() })
}

#[tokio::test]
async fn validate_route_reports_section_status() {
    let (service, _store) = build_service();
    let router = router_with_service(service);

    let mut record = intake(ExaminationType::WorkingAtHeights);
    if let Some(demographics) = record.demographics.as_mut() {
        demographics.id_number = "8001010001088".to_string();
    }

    let response = router
        .oneshot(post_json(
            "/api/v1/intake/validate",
            &json!({ "record": record, "examination_type": "working-at-heights" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["is_valid"], false);
    assert_eq!(payload["completion_percentage"], 75);
    assert_eq!(payload["section_status"]["demographics"], "incomplete");
    assert!(payload["critical_issues"][0]
        .as_str()
        .is_some_and(|issue| issue.contains("ID number")));
}

#[tokio::test]
async fn assess_route_returns_the_decision() {
    let (service, _store) = build_service();
    let router = router_with_service(service);

    let mut criteria = healthy_criteria(ExaminationType::PreEmployment);
    criteria.drug_screen = DrugScreenStatus::Positive;

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments",
            &serde_json::to_value(&criteria).expect("serialize criteria"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "unfit");
    assert_eq!(payload["reasoning"][0], "Positive drug screen result");
}

#[tokio::test]
async fn certificate_route_issues_for_seeded_patient() {
    let (service, store) = build_service();
    store.seed_healthy(ExaminationType::Periodic);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/patients/{PATIENT_ID}/certificate"),
            &certificate_request(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["certificate"]["status"], "fit");
    assert_eq!(payload["certificate"]["patient"]["surname"], "Mokoena");
}

#[tokio::test]
async fn certificate_route_accepts_practitioner_override() {
    let (service, store) = build_service();
    store.seed_healthy(ExaminationType::Periodic);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/patients/{PATIENT_ID}/certificate"),
            &json!({
                "practitioner": practitioner(),
                "override": {
                    "status": "temporary-unfit",
                    "comments": "Awaiting chest X-ray",
                    "reason": "Persistent cough on examination"
                }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["certificate"]["status"], "temporary-unfit");
    assert_eq!(payload["fitness_assessment"]["source"], "overridden");
    assert_eq!(payload["fitness_assessment"]["computed"]["status"], "fit");
    assert_eq!(
        payload["warnings"][0],
        "Practitioner override changed status from fit to temporary-unfit: \
         Persistent cough on examination"
    );
}

#[tokio::test]
async fn certificate_handler_returns_not_found_for_unknown_patient() {
    let (service, _store) = build_service();
    let request: CertificateRequest =
        serde_json::from_value(certificate_request()).expect("request decodes");

    let response = crate::workflows::certification::router::certificate_handler::<
        MemoryStore,
        PlainTextRenderer,
    >(
        State(Arc::new(service)),
        Path("pt-unknown".to_string()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errors"][0], "Patient data not found");
}

#[tokio::test]
async fn certificate_handler_returns_unprocessable_for_unjustified_override() {
    let (service, store) = build_service();
    store.seed_healthy(ExaminationType::Periodic);
    let request: CertificateRequest = serde_json::from_value(json!({
        "practitioner": practitioner(),
        "override": { "status": "unfit" }
    }))
    .expect("request decodes");

    let response = crate::workflows::certification::router::certificate_handler::<
        MemoryStore,
        PlainTextRenderer,
    >(
        State(Arc::new(service)),
        Path(PATIENT_ID.to_string()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn certificate_handler_returns_internal_error_when_store_is_down() {
    let service = Arc::new(CertificateReviewService::new(
        Arc::new(UnavailableStore),
        assembler(),
        AssessmentConfig::default(),
    ));
    let request: CertificateRequest =
        serde_json::from_value(certificate_request()).expect("request decodes");

    let response = crate::workflows::certification::router::certificate_handler::<
        UnavailableStore,
        PlainTextRenderer,
    >(State(service), Path(PATIENT_ID.to_string()), axum::Json(request))
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["errors"][0],
        "store unavailable: records database offline"
    );
}

#[tokio::test]
async fn document_route_returns_rendered_bytes() {
    let (service, store) = build_service();
    store.seed_healthy(ExaminationType::Periodic);
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/patients/{PATIENT_ID}/certificate/document"),
            &certificate_request(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/plain; charset=utf-8")
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(body.to_vec()).expect("utf-8 body");
    assert!(text.contains("CERTIFICATE OF FITNESS"));
    assert!(text.contains("Surname           Mokoena"));
}

#[tokio::test]
async fn document_route_reports_missing_patient_as_failed_result() {
    let (service, _store) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/patients/pt-missing/certificate/document",
            &certificate_request(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errors"], json!(["Patient data not found"]));
    assert!(payload.get("document").is_none());
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::certification::assessment::{
    AssessmentConfig, FitnessAssessmentCriteria, FitnessAssessmentEngine,
};
use crate::workflows::certification::certificate::{
    CertificateAssembler, CertificateDocument, CompanyIdentity, DocumentRenderer,
    PlainTextRenderer, PractitionerIdentity, RenderError, RenderedDocument,
};
use crate::workflows::certification::domain::{
    Declarations, Demographics, DrugScreenOutcome, DrugScreenTest, Employment, ExaminationType,
    Gender, HearingTest, HeightsSafety, IntakeRecord, LatestTests, LungFunctionTest,
    MedicalHistory, PatientId, PatientRecord, PeriodicUpdate, QuestionnaireResponse, ReturnToWork,
    TestResult, VisionTest, VitalSigns,
};
use crate::workflows::certification::repository::{
    PatientStore, QuestionnaireStore, StoreError, TestStore, VitalsStore,
};
use crate::workflows::certification::{certification_router, CertificateReviewService};

pub(super) const PATIENT_ID: &str = "pt-0001";
pub(super) const VALID_ID_NUMBER: &str = "7807215422086";

pub(super) fn exam_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

pub(super) fn at(hour: u32) -> NaiveDateTime {
    exam_date().and_hms_opt(hour, 0, 0).expect("valid time")
}

pub(super) fn practice() -> CompanyIdentity {
    CompanyIdentity {
        name: "Highveld Occupational Health".to_string(),
        address: "12 Shaft Road, Witbank".to_string(),
        phone: "013 555 0100".to_string(),
        email: "clinic@highveld-oh.example".to_string(),
    }
}

pub(super) fn practitioner() -> PractitionerIdentity {
    PractitionerIdentity {
        name: "Dr N. Dlamini".to_string(),
        practice_number: "OMP-0457".to_string(),
        qualification: Some("MBChB, DOH".to_string()),
        stamp: None,
    }
}

pub(super) fn demographics() -> Demographics {
    Demographics {
        first_name: "Thabo George".to_string(),
        surname: "Mokoena".to_string(),
        id_number: VALID_ID_NUMBER.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1978, 7, 21),
        gender: Some(Gender::Male),
        phone: Some("082 555 0199".to_string()),
        email: None,
    }
}

pub(super) fn employment() -> Employment {
    Employment {
        company_name: "Kusile Mining".to_string(),
        position: "Plant Operator".to_string(),
        department: Some("Processing".to_string()),
        employee_number: Some("KM-2231".to_string()),
    }
}

pub(super) fn patient(examination_type: ExaminationType) -> PatientRecord {
    PatientRecord {
        id: PatientId(PATIENT_ID.to_string()),
        demographics: demographics(),
        employment: employment(),
        examination_type,
        examination_date: exam_date(),
    }
}

pub(super) fn clear_history() -> MedicalHistory {
    MedicalHistory {
        heart_disease: Some(false),
        high_blood_pressure: Some(false),
        epilepsy_or_convulsions: Some(false),
        diabetes: Some(false),
        mental_health_condition: Some(false),
        tuberculosis: Some(false),
        tuberculosis_treatment_current: Some(false),
        pneumonia: Some(false),
        asthma: Some(false),
        allergies: Some(false),
        current_medications: Vec::new(),
        other_conditions: None,
    }
}

pub(super) fn clear_heights() -> HeightsSafety {
    HeightsSafety {
        advised_not_to_work_at_height: Some(false),
        serious_occupational_accident: Some(false),
        fear_of_heights_or_enclosed_spaces: Some(false),
        fits_seizures_or_blackouts: Some(false),
        suicidal_thoughts: Some(false),
        mental_health_professional: Some(false),
        thoughts_not_own: Some(false),
        substance_abuse: Some(false),
        other_problems: Some(false),
        informed_of_safety_requirements: Some(true),
        dizziness_or_balance_problems: Some(false),
        comments: None,
    }
}

pub(super) fn signed_declarations() -> Declarations {
    Declarations {
        information_correct: Some(true),
        no_misleading_information: Some(true),
        consent_to_examination: Some(true),
        employee_name: Some("Thabo George Mokoena".to_string()),
        employee_signature: Some("T.G. Mokoena".to_string()),
        signed_on: Some(exam_date()),
    }
}

/// Fully answered questionnaire with nothing of note.
pub(super) fn questionnaire(examination_type: ExaminationType) -> QuestionnaireResponse {
    let mut response = QuestionnaireResponse {
        medical_history: Some(clear_history()),
        declarations: Some(signed_declarations()),
        ..QuestionnaireResponse::default()
    };
    match examination_type {
        ExaminationType::WorkingAtHeights => response.heights_safety = Some(clear_heights()),
        ExaminationType::Periodic => {
            response.periodic_update = Some(PeriodicUpdate {
                new_conditions: Some(false),
                new_medication: Some(false),
                injuries_since_last: Some(false),
                details: None,
            })
        }
        ExaminationType::ReturnToWork => {
            response.return_to_work = Some(ReturnToWork {
                absence_reason: Some("Fractured wrist".to_string()),
                cleared_by_treating_doctor: Some(true),
                ongoing_treatment: Some(false),
                restrictions_advised: Some(false),
            })
        }
        ExaminationType::PreEmployment | ExaminationType::Exit => {}
    }
    response
}

pub(super) fn intake(examination_type: ExaminationType) -> IntakeRecord {
    IntakeRecord::for_patient(&patient(examination_type), questionnaire(examination_type))
}

pub(super) fn vitals(systolic: u16, diastolic: u16) -> VitalSigns {
    VitalSigns {
        recorded_at: at(9),
        systolic: Some(systolic),
        diastolic: Some(diastolic),
        pulse: Some(72),
        temperature_celsius: Some(36.6),
        height_cm: Some(175.0),
        weight_kg: Some(70.0),
        bmi: None,
    }
}

pub(super) fn vision(left: &str, right: &str) -> TestResult {
    TestResult::Vision(VisionTest {
        recorded_at: at(10),
        left_eye: left.to_string(),
        right_eye: right.to_string(),
        colour_vision: Some("Normal".to_string()),
        interpretation: String::new(),
    })
}

pub(super) fn hearing(left: f32, right: f32) -> TestResult {
    TestResult::Hearing(HearingTest {
        recorded_at: at(10),
        left_ear_db: left,
        right_ear_db: right,
        interpretation: String::new(),
    })
}

pub(super) fn lung_function(fev1: f32, fvc: f32) -> TestResult {
    TestResult::LungFunction(LungFunctionTest {
        recorded_at: at(11),
        fev1_percent: fev1,
        fvc_percent: fvc,
        fev1_fvc_ratio: Some(0.82),
        interpretation: String::new(),
    })
}

pub(super) fn drug_screen(result: DrugScreenOutcome) -> TestResult {
    TestResult::DrugScreen(DrugScreenTest {
        recorded_at: at(11),
        result,
        substances: Vec::new(),
        interpretation: String::new(),
    })
}

pub(super) fn normal_tests() -> Vec<TestResult> {
    vec![
        vision("20/20", "20/20"),
        hearing(15.0, 20.0),
        lung_function(95.0, 92.0),
        drug_screen(DrugScreenOutcome::Negative),
    ]
}

/// Criteria for a healthy worker of the given examination type.
pub(super) fn healthy_criteria(examination_type: ExaminationType) -> FitnessAssessmentCriteria {
    let questionnaire = questionnaire(examination_type);
    let reading = vitals(118, 76);
    FitnessAssessmentCriteria::from_records(
        &patient(examination_type),
        Some(&questionnaire),
        Some(&reading),
        &LatestTests::from_results(&normal_tests()),
    )
}

pub(super) fn engine() -> FitnessAssessmentEngine {
    FitnessAssessmentEngine::new(AssessmentConfig::default())
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    patients: Arc<Mutex<HashMap<PatientId, PatientRecord>>>,
    questionnaires: Arc<Mutex<HashMap<PatientId, QuestionnaireResponse>>>,
    vitals: Arc<Mutex<HashMap<PatientId, Vec<VitalSigns>>>>,
    tests: Arc<Mutex<HashMap<PatientId, Vec<TestResult>>>>,
}

impl MemoryStore {
    pub(super) fn seed(
        &self,
        patient: PatientRecord,
        questionnaire: Option<QuestionnaireResponse>,
        vitals: Vec<VitalSigns>,
        tests: Vec<TestResult>,
    ) {
        let id = patient.id.clone();
        if let Some(questionnaire) = questionnaire {
            self.questionnaires
                .lock()
                .expect("store mutex poisoned")
                .insert(id.clone(), questionnaire);
        }
        self.vitals
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), vitals);
        self.tests
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), tests);
        self.patients
            .lock()
            .expect("store mutex poisoned")
            .insert(id, patient);
    }

    /// Seeds a complete, unremarkable examination.
    pub(super) fn seed_healthy(&self, examination_type: ExaminationType) {
        self.seed(
            patient(examination_type),
            Some(questionnaire(examination_type)),
            vec![vitals(118, 76)],
            normal_tests(),
        );
    }
}

impl PatientStore for MemoryStore {
    fn patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError> {
        Ok(self
            .patients
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }
}

impl QuestionnaireStore for MemoryStore {
    fn questionnaire(&self, id: &PatientId) -> Result<Option<QuestionnaireResponse>, StoreError> {
        Ok(self
            .questionnaires
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }
}

impl VitalsStore for MemoryStore {
    fn vitals(&self, id: &PatientId) -> Result<Vec<VitalSigns>, StoreError> {
        Ok(self
            .vitals
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

impl TestStore for MemoryStore {
    fn tests(&self, id: &PatientId) -> Result<Vec<TestResult>, StoreError> {
        Ok(self
            .tests
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

pub(super) struct UnavailableStore;

impl PatientStore for UnavailableStore {
    fn patient(&self, _id: &PatientId) -> Result<Option<PatientRecord>, StoreError> {
        Err(StoreError::Unavailable("records database offline".to_string()))
    }
}

impl QuestionnaireStore for UnavailableStore {
    fn questionnaire(&self, _id: &PatientId) -> Result<Option<QuestionnaireResponse>, StoreError> {
        Err(StoreError::Unavailable("records database offline".to_string()))
    }
}

impl VitalsStore for UnavailableStore {
    fn vitals(&self, _id: &PatientId) -> Result<Vec<VitalSigns>, StoreError> {
        Err(StoreError::Unavailable("records database offline".to_string()))
    }
}

impl TestStore for UnavailableStore {
    fn tests(&self, _id: &PatientId) -> Result<Vec<TestResult>, StoreError> {
        Err(StoreError::Unavailable("records database offline".to_string()))
    }
}

pub(super) struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, _document: &CertificateDocument) -> Result<RenderedDocument, RenderError> {
        Err(RenderError::Backend("pdf engine crashed".to_string()))
    }
}

pub(super) fn assembler() -> CertificateAssembler<PlainTextRenderer> {
    CertificateAssembler::new(practice(), PlainTextRenderer)
}

pub(super) fn build_service() -> (
    CertificateReviewService<MemoryStore, PlainTextRenderer>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let service =
        CertificateReviewService::new(store.clone(), assembler(), AssessmentConfig::default());
    (service, store)
}

pub(super) fn router_with_service(
    service: CertificateReviewService<MemoryStore, PlainTextRenderer>,
) -> axum::Router {
    certification_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

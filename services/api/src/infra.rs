use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use surgiscan::workflows::certification::domain::{
    Declarations, DrugScreenOutcome, DrugScreenTest, HearingTest, HeightsSafety,
    LungFunctionTest, MedicalHistory, PeriodicUpdate, ReturnToWork, VisionTest,
};
use surgiscan::workflows::certification::{
    Demographics, Employment, ExaminationType, PatientId, PatientRecord, PatientStore,
    PractitionerIdentity, QuestionnaireResponse, QuestionnaireStore, StoreError, TestResult,
    TestStore, VitalSigns, VitalsStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything captured across the stations for one patient.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExaminationBundle {
    pub(crate) patient: PatientRecord,
    #[serde(default)]
    pub(crate) questionnaire: Option<QuestionnaireResponse>,
    #[serde(default)]
    pub(crate) vitals: Vec<VitalSigns>,
    #[serde(default)]
    pub(crate) tests: Vec<TestResult>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryExaminationStore {
    records: Arc<Mutex<HashMap<PatientId, ExaminationBundle>>>,
}

impl InMemoryExaminationStore {
    fn records(&self) -> Result<MutexGuard<'_, HashMap<PatientId, ExaminationBundle>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("examination store lock poisoned".to_string()))
    }

    pub(crate) fn admit(&self, bundle: ExaminationBundle) -> Result<(), StoreError> {
        let mut guard = self.records()?;
        guard.insert(bundle.patient.id.clone(), bundle);
        Ok(())
    }

    /// Store preloaded with the demo cohort examined on `examined_on`.
    pub(crate) fn seeded(examined_on: NaiveDate) -> Result<Self, StoreError> {
        let store = Self::default();
        for bundle in demo_cohort(examined_on) {
            store.admit(bundle)?;
        }
        Ok(store)
    }

    pub(crate) fn patient_ids(&self) -> Result<Vec<PatientId>, StoreError> {
        let mut ids: Vec<PatientId> = self.records()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub(crate) fn bundle(&self, id: &PatientId) -> Result<Option<ExaminationBundle>, StoreError> {
        Ok(self.records()?.get(id).cloned())
    }
}

impl PatientStore for InMemoryExaminationStore {
    fn patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError> {
        Ok(self.records()?.get(id).map(|bundle| bundle.patient.clone()))
    }
}

impl QuestionnaireStore for InMemoryExaminationStore {
    fn questionnaire(&self, id: &PatientId) -> Result<Option<QuestionnaireResponse>, StoreError> {
        Ok(self
            .records()?
            .get(id)
            .and_then(|bundle| bundle.questionnaire.clone()))
    }
}

impl VitalsStore for InMemoryExaminationStore {
    fn vitals(&self, id: &PatientId) -> Result<Vec<VitalSigns>, StoreError> {
        Ok(self
            .records()?
            .get(id)
            .map(|bundle| bundle.vitals.clone())
            .unwrap_or_default())
    }
}

impl TestStore for InMemoryExaminationStore {
    fn tests(&self, id: &PatientId) -> Result<Vec<TestResult>, StoreError> {
        Ok(self
            .records()?
            .get(id)
            .map(|bundle| bundle.tests.clone())
            .unwrap_or_default())
    }
}

pub(crate) fn demo_practitioner() -> PractitionerIdentity {
    PractitionerIdentity {
        name: "Dr N. Dlamini".to_string(),
        practice_number: "OMP-0457".to_string(),
        qualification: Some("MBChB, DOH".to_string()),
        stamp: None,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn station_time(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn patient(
    id: &str,
    first_name: &str,
    surname: &str,
    id_number: &str,
    position: &str,
    examination_type: ExaminationType,
    examined_on: NaiveDate,
) -> PatientRecord {
    PatientRecord {
        id: PatientId(id.to_string()),
        demographics: Demographics {
            first_name: first_name.to_string(),
            surname: surname.to_string(),
            id_number: id_number.to_string(),
            date_of_birth: None,
            gender: None,
            phone: None,
            email: None,
        },
        employment: Employment {
            company_name: "Kusile Mining".to_string(),
            position: position.to_string(),
            department: None,
            employee_number: None,
        },
        examination_type,
        examination_date: examined_on,
    }
}

fn questionnaire(
    full_name: &str,
    examined_on: NaiveDate,
    medical_history: MedicalHistory,
) -> QuestionnaireResponse {
    QuestionnaireResponse {
        medical_history: Some(medical_history),
        declarations: Some(Declarations {
            information_correct: Some(true),
            no_misleading_information: Some(true),
            consent_to_examination: Some(true),
            employee_name: Some(full_name.to_string()),
            employee_signature: Some(full_name.to_string()),
            signed_on: Some(examined_on),
        }),
        ..QuestionnaireResponse::default()
    }
}

fn clear_history() -> MedicalHistory {
    MedicalHistory {
        heart_disease: Some(false),
        high_blood_pressure: Some(false),
        epilepsy_or_convulsions: Some(false),
        diabetes: Some(false),
        mental_health_condition: Some(false),
        asthma: Some(false),
        ..MedicalHistory::default()
    }
}

fn vitals(
    examined_on: NaiveDate,
    blood_pressure: (u16, u16),
    temperature_celsius: f32,
    weight_kg: f32,
) -> VitalSigns {
    VitalSigns {
        recorded_at: station_time(examined_on, 8),
        systolic: Some(blood_pressure.0),
        diastolic: Some(blood_pressure.1),
        pulse: Some(74),
        temperature_celsius: Some(temperature_celsius),
        height_cm: Some(172.0),
        weight_kg: Some(weight_kg),
        bmi: None,
    }
}

fn tests(examined_on: NaiveDate, drug_screen: DrugScreenOutcome) -> Vec<TestResult> {
    vec![
        TestResult::Vision(VisionTest {
            recorded_at: station_time(examined_on, 9),
            left_eye: "20/20".to_string(),
            right_eye: "20/30".to_string(),
            colour_vision: Some("Normal".to_string()),
            interpretation: String::new(),
        }),
        TestResult::Hearing(HearingTest {
            recorded_at: station_time(examined_on, 9),
            left_ear_db: 15.0,
            right_ear_db: 20.0,
            interpretation: String::new(),
        }),
        TestResult::LungFunction(LungFunctionTest {
            recorded_at: station_time(examined_on, 10),
            fev1_percent: 91.0,
            fvc_percent: 94.0,
            fev1_fvc_ratio: Some(0.81),
            interpretation: String::new(),
        }),
        TestResult::DrugScreen(DrugScreenTest {
            recorded_at: station_time(examined_on, 10),
            result: drug_screen,
            substances: Vec::new(),
            interpretation: String::new(),
        }),
    ]
}

/// Four examinations covering the common certificate outcomes.
pub(crate) fn demo_cohort(examined_on: NaiveDate) -> Vec<ExaminationBundle> {
    let periodic = ExaminationBundle {
        patient: patient(
            "demo-001",
            "Thabo George",
            "Mokoena",
            "7807215422086",
            "Plant Operator",
            ExaminationType::Periodic,
            examined_on,
        ),
        questionnaire: Some(QuestionnaireResponse {
            periodic_update: Some(PeriodicUpdate {
                new_conditions: Some(false),
                new_medication: Some(false),
                injuries_since_last: Some(false),
                details: None,
            }),
            ..questionnaire("Thabo George Mokoena", examined_on, clear_history())
        }),
        vitals: vec![vitals(examined_on, (122, 78), 36.6, 74.0)],
        tests: tests(examined_on, DrugScreenOutcome::Negative),
    };

    let heights = ExaminationBundle {
        patient: patient(
            "demo-002",
            "Lerato",
            "Khumalo",
            "9202204720086",
            "Rigger",
            ExaminationType::WorkingAtHeights,
            examined_on,
        ),
        questionnaire: Some(QuestionnaireResponse {
            heights_safety: Some(HeightsSafety {
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
            }),
            ..questionnaire("Lerato Khumalo", examined_on, clear_history())
        }),
        vitals: vec![vitals(examined_on, (145, 92), 36.8, 65.0)],
        tests: tests(examined_on, DrugScreenOutcome::Negative),
    };

    let pre_employment = ExaminationBundle {
        patient: patient(
            "demo-003",
            "Sipho",
            "Ndlovu",
            "8506155000086",
            "Boilermaker",
            ExaminationType::PreEmployment,
            examined_on,
        ),
        questionnaire: Some(questionnaire("Sipho Ndlovu", examined_on, clear_history())),
        vitals: vec![vitals(examined_on, (128, 82), 36.5, 81.0)],
        tests: tests(examined_on, DrugScreenOutcome::Positive),
    };

    let return_to_work = ExaminationBundle {
        patient: patient(
            "demo-004",
            "Ayanda",
            "Zulu",
            "0102034000088",
            "Control Room Operator",
            ExaminationType::ReturnToWork,
            examined_on,
        ),
        questionnaire: Some(QuestionnaireResponse {
            return_to_work: Some(ReturnToWork {
                absence_reason: Some("Influenza".to_string()),
                cleared_by_treating_doctor: Some(true),
                ongoing_treatment: Some(false),
                restrictions_advised: Some(false),
            }),
            ..questionnaire(
                "Ayanda Zulu",
                examined_on,
                MedicalHistory {
                    asthma: Some(true),
                    current_medications: vec!["Salbutamol inhaler".to_string()],
                    ..clear_history()
                },
            )
        }),
        vitals: vec![vitals(examined_on, (118, 74), 38.4, 58.0)],
        tests: tests(examined_on, DrugScreenOutcome::Negative),
    };

    vec![periodic, heights, pre_employment, return_to_work]
}

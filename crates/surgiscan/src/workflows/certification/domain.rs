use std::collections::BTreeMap;

use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered patients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(pub String);

/// Examination categories offered at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExaminationType {
    PreEmployment,
    Periodic,
    Exit,
    ReturnToWork,
    WorkingAtHeights,
}

impl ExaminationType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::PreEmployment,
            Self::Periodic,
            Self::Exit,
            Self::ReturnToWork,
            Self::WorkingAtHeights,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PreEmployment => "Pre-Employment",
            Self::Periodic => "Periodical",
            Self::Exit => "Exit",
            Self::ReturnToWork => "Return to Work",
            Self::WorkingAtHeights => "Working at Heights",
        }
    }

    /// Questionnaire section that only applies to this examination type, if any.
    pub const fn type_specific_section(self) -> Option<IntakeSection> {
        match self {
            Self::WorkingAtHeights => Some(IntakeSection::HeightsSafety),
            Self::Periodic => Some(IntakeSection::PeriodicUpdate),
            Self::ReturnToWork => Some(IntakeSection::ReturnToWork),
            Self::PreEmployment | Self::Exit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

/// Personal details captured at the reception station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub first_name: String,
    pub surname: String,
    pub id_number: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Demographics {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    pub company_name: String,
    pub position: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub employee_number: Option<String>,
}

/// The examination record opened at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub demographics: Demographics,
    pub employment: Employment,
    pub examination_type: ExaminationType,
    pub examination_date: NaiveDate,
}

impl PatientRecord {
    /// Certificates lapse one calendar year after the examination.
    pub fn certificate_expiry(&self) -> NaiveDate {
        self.examination_date
            .checked_add_months(Months::new(12))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// A single set of vitals taken at the nursing station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub recorded_at: NaiveDateTime,
    #[serde(default)]
    pub systolic: Option<u16>,
    #[serde(default)]
    pub diastolic: Option<u16>,
    #[serde(default)]
    pub pulse: Option<u16>,
    #[serde(default)]
    pub temperature_celsius: Option<f32>,
    #[serde(default)]
    pub height_cm: Option<f32>,
    #[serde(default)]
    pub weight_kg: Option<f32>,
    #[serde(default)]
    pub bmi: Option<f32>,
}

impl VitalSigns {
    /// Recorded BMI, or one derived from height and weight.
    pub fn body_mass_index(&self) -> Option<f32> {
        self.bmi.or_else(|| {
            let height_m = self.height_cm? / 100.0;
            let weight = self.weight_kg?;
            if height_m > 0.0 && weight > 0.0 {
                Some(weight / (height_m * height_m))
            } else {
                None
            }
        })
    }

    pub fn latest(readings: &[VitalSigns]) -> Option<&VitalSigns> {
        readings.iter().max_by_key(|reading| reading.recorded_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionTest {
    pub recorded_at: NaiveDateTime,
    pub left_eye: String,
    pub right_eye: String,
    #[serde(default)]
    pub colour_vision: Option<String>,
    #[serde(default)]
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingTest {
    pub recorded_at: NaiveDateTime,
    pub left_ear_db: f32,
    pub right_ear_db: f32,
    #[serde(default)]
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LungFunctionTest {
    pub recorded_at: NaiveDateTime,
    pub fev1_percent: f32,
    pub fvc_percent: f32,
    #[serde(default)]
    pub fev1_fvc_ratio: Option<f32>,
    #[serde(default)]
    pub interpretation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugScreenOutcome {
    Negative,
    Positive,
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugScreenTest {
    pub recorded_at: NaiveDateTime,
    pub result: DrugScreenOutcome,
    #[serde(default)]
    pub substances: Vec<String>,
    #[serde(default)]
    pub interpretation: String,
}

/// Station test result, tagged by domain at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestResult {
    Vision(VisionTest),
    Hearing(HearingTest),
    LungFunction(LungFunctionTest),
    DrugScreen(DrugScreenTest),
}

/// Most recent result per test domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestTests {
    pub vision: Option<VisionTest>,
    pub hearing: Option<HearingTest>,
    pub lung_function: Option<LungFunctionTest>,
    pub drug_screen: Option<DrugScreenTest>,
}

impl LatestTests {
    pub fn from_results(results: &[TestResult]) -> Self {
        fn keep_newer<T: Clone>(
            slot: &mut Option<T>,
            candidate: &T,
            at: impl Fn(&T) -> NaiveDateTime,
        ) {
            let newer = slot
                .as_ref()
                .map(|current| at(candidate) >= at(current))
                .unwrap_or(true);
            if newer {
                *slot = Some(candidate.clone());
            }
        }

        let mut latest = Self::default();
        for result in results {
            match result {
                TestResult::Vision(test) => keep_newer(&mut latest.vision, test, |t| t.recorded_at),
                TestResult::Hearing(test) => keep_newer(&mut latest.hearing, test, |t| t.recorded_at),
                TestResult::LungFunction(test) => {
                    keep_newer(&mut latest.lung_function, test, |t| t.recorded_at)
                }
                TestResult::DrugScreen(test) => {
                    keep_newer(&mut latest.drug_screen, test, |t| t.recorded_at)
                }
            }
        }
        latest
    }
}

/// Sections tracked while an intake record is being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSection {
    Demographics,
    MedicalHistory,
    Respiratory,
    OccupationalExposure,
    HeightsSafety,
    PeriodicUpdate,
    ReturnToWork,
    Declarations,
}

impl IntakeSection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Demographics => "Demographics",
            Self::MedicalHistory => "Medical History",
            Self::Respiratory => "Respiratory",
            Self::OccupationalExposure => "Occupational Exposure",
            Self::HeightsSafety => "Working at Heights",
            Self::PeriodicUpdate => "Periodic Update",
            Self::ReturnToWork => "Return to Work",
            Self::Declarations => "Declarations",
        }
    }
}

pub(crate) fn answered_yes(answer: Option<bool>) -> bool {
    answer == Some(true)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistory {
    pub heart_disease: Option<bool>,
    pub high_blood_pressure: Option<bool>,
    pub epilepsy_or_convulsions: Option<bool>,
    pub diabetes: Option<bool>,
    pub mental_health_condition: Option<bool>,
    pub tuberculosis: Option<bool>,
    pub tuberculosis_treatment_current: Option<bool>,
    pub pneumonia: Option<bool>,
    pub asthma: Option<bool>,
    pub allergies: Option<bool>,
    pub current_medications: Vec<String>,
    pub other_conditions: Option<String>,
}

impl MedicalHistory {
    fn answers(&self) -> [Option<bool>; 10] {
        [
            self.heart_disease,
            self.high_blood_pressure,
            self.epilepsy_or_convulsions,
            self.diabetes,
            self.mental_health_condition,
            self.tuberculosis,
            self.tuberculosis_treatment_current,
            self.pneumonia,
            self.asthma,
            self.allergies,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.answers().iter().all(Option::is_none)
            && self.current_medications.is_empty()
            && self
                .other_conditions
                .as_deref()
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespiratorySection {
    pub shortness_of_breath: Option<bool>,
    pub chronic_cough: Option<bool>,
    pub wheezing: Option<bool>,
    pub current_smoker: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupationalExposure {
    pub noise: Option<bool>,
    pub dust: Option<bool>,
    pub chemicals: Option<bool>,
    pub fumes: Option<bool>,
    pub years_exposed: Option<u16>,
}

/// The eleven yes/no questions of the working-at-heights questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightsSafety {
    pub advised_not_to_work_at_height: Option<bool>,
    pub serious_occupational_accident: Option<bool>,
    pub fear_of_heights_or_enclosed_spaces: Option<bool>,
    pub fits_seizures_or_blackouts: Option<bool>,
    pub suicidal_thoughts: Option<bool>,
    pub mental_health_professional: Option<bool>,
    pub thoughts_not_own: Option<bool>,
    pub substance_abuse: Option<bool>,
    pub other_problems: Option<bool>,
    pub informed_of_safety_requirements: Option<bool>,
    pub dizziness_or_balance_problems: Option<bool>,
    pub comments: Option<String>,
}

impl HeightsSafety {
    pub const QUESTION_COUNT: usize = 11;

    pub fn answers(&self) -> [Option<bool>; Self::QUESTION_COUNT] {
        [
            self.advised_not_to_work_at_height,
            self.serious_occupational_accident,
            self.fear_of_heights_or_enclosed_spaces,
            self.fits_seizures_or_blackouts,
            self.suicidal_thoughts,
            self.mental_health_professional,
            self.thoughts_not_own,
            self.substance_abuse,
            self.other_problems,
            self.informed_of_safety_requirements,
            self.dizziness_or_balance_problems,
        ]
    }

    pub fn unanswered(&self) -> usize {
        self.answers().iter().filter(|answer| answer.is_none()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicUpdate {
    pub new_conditions: Option<bool>,
    pub new_medication: Option<bool>,
    pub injuries_since_last: Option<bool>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnToWork {
    pub absence_reason: Option<String>,
    pub cleared_by_treating_doctor: Option<bool>,
    pub ongoing_treatment: Option<bool>,
    pub restrictions_advised: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declarations {
    pub information_correct: Option<bool>,
    pub no_misleading_information: Option<bool>,
    pub consent_to_examination: Option<bool>,
    pub employee_name: Option<String>,
    pub employee_signature: Option<String>,
    pub signed_on: Option<NaiveDate>,
}

/// Multi-section intake questionnaire; every section is optional until answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireResponse {
    pub medical_history: Option<MedicalHistory>,
    pub respiratory: Option<RespiratorySection>,
    pub occupational_exposure: Option<OccupationalExposure>,
    pub heights_safety: Option<HeightsSafety>,
    pub periodic_update: Option<PeriodicUpdate>,
    pub return_to_work: Option<ReturnToWork>,
    pub declarations: Option<Declarations>,
    pub section_progress: BTreeMap<IntakeSection, bool>,
}

/// In-progress intake record as edited at reception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeRecord {
    pub demographics: Option<Demographics>,
    pub employment: Option<Employment>,
    pub questionnaire: QuestionnaireResponse,
}

impl IntakeRecord {
    pub fn for_patient(patient: &PatientRecord, questionnaire: QuestionnaireResponse) -> Self {
        Self {
            demographics: Some(patient.demographics.clone()),
            employment: Some(patient.employment.clone()),
            questionnaire,
        }
    }
}

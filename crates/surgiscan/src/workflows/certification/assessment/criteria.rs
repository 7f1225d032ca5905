use serde::{Deserialize, Serialize};

use super::super::domain::{
    answered_yes, DrugScreenOutcome, ExaminationType, HeightsSafety, LatestTests, MedicalHistory,
    PatientRecord, QuestionnaireResponse, VitalSigns,
};

/// Normalized clinical view consumed by the assessment engine.
///
/// Absent domains stay `None` (or [`DrugScreenStatus::NotDone`]) so that no rule
/// fires on data that was never collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessAssessmentCriteria {
    pub examination_type: ExaminationType,
    #[serde(default)]
    pub vitals: VitalsCriteria,
    #[serde(default)]
    pub vision: Option<VisionCriteria>,
    #[serde(default)]
    pub hearing: Option<HearingCriteria>,
    #[serde(default)]
    pub lung_function: Option<LungFunctionCriteria>,
    #[serde(default)]
    pub drug_screen: DrugScreenStatus,
    #[serde(default)]
    pub medical_history: MedicalHistoryCriteria,
    #[serde(default)]
    pub heights: Option<HeightsCriteria>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsCriteria {
    pub systolic: Option<u16>,
    pub diastolic: Option<u16>,
    pub pulse: Option<u16>,
    pub temperature_celsius: Option<f32>,
    pub bmi: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionCriteria {
    pub left_eye: String,
    pub right_eye: String,
}

impl VisionCriteria {
    /// Worst (largest) Snellen denominator across both eyes.
    pub fn worst_denominator(&self) -> Option<u32> {
        [&self.left_eye, &self.right_eye]
            .into_iter()
            .filter_map(|acuity| snellen_denominator(acuity))
            .max()
    }

    /// True when either eye carries an acuity that is not a `20/N` reading.
    pub fn has_unreadable_eye(&self) -> bool {
        [&self.left_eye, &self.right_eye]
            .into_iter()
            .any(|acuity| snellen_denominator(acuity).is_none())
    }
}

/// Parses the `N` out of a `20/N` acuity string.
///
/// Only the leading digits of the denominator count, so letter-error suffixes
/// such as `20/200-1` or `20/40+2` read as 200 and 40.
pub fn snellen_denominator(acuity: &str) -> Option<u32> {
    let (numerator, denominator) = acuity.trim().split_once('/')?;
    if numerator.trim() != "20" {
        return None;
    }
    let denominator = denominator.trim_start();
    let digits = denominator
        .find(|ch: char| !ch.is_ascii_digit())
        .map_or(denominator, |end| &denominator[..end]);
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HearingCriteria {
    pub left_ear_db: f32,
    pub right_ear_db: f32,
}

impl HearingCriteria {
    pub fn worst_ear_db(&self) -> f32 {
        self.left_ear_db.max(self.right_ear_db)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LungFunctionCriteria {
    pub fev1_percent: f32,
    pub fvc_percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugScreenStatus {
    #[default]
    NotDone,
    Negative,
    Positive,
    Inconclusive,
}

impl From<DrugScreenOutcome> for DrugScreenStatus {
    fn from(outcome: DrugScreenOutcome) -> Self {
        match outcome {
            DrugScreenOutcome::Negative => Self::Negative,
            DrugScreenOutcome::Positive => Self::Positive,
            DrugScreenOutcome::Inconclusive => Self::Inconclusive,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistoryCriteria {
    pub diabetes: bool,
    pub hypertension: bool,
    pub heart_disease: bool,
    pub asthma: bool,
}

impl MedicalHistoryCriteria {
    pub fn from_history(history: Option<&MedicalHistory>) -> Self {
        let Some(history) = history else {
            return Self::default();
        };
        Self {
            diabetes: answered_yes(history.diabetes),
            hypertension: answered_yes(history.high_blood_pressure),
            heart_disease: answered_yes(history.heart_disease),
            asthma: answered_yes(history.asthma),
        }
    }

    pub fn on_chronic_treatment(&self) -> bool {
        self.diabetes || self.hypertension || self.heart_disease
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightsCriteria {
    pub fear_of_heights: bool,
    pub substance_abuse: bool,
    pub seizures_or_blackouts: bool,
    pub suicidal_ideation: bool,
    pub thoughts_not_own: bool,
}

impl From<&HeightsSafety> for HeightsCriteria {
    fn from(section: &HeightsSafety) -> Self {
        Self {
            fear_of_heights: answered_yes(section.fear_of_heights_or_enclosed_spaces),
            substance_abuse: answered_yes(section.substance_abuse),
            seizures_or_blackouts: answered_yes(section.fits_seizures_or_blackouts),
            suicidal_ideation: answered_yes(section.suicidal_thoughts),
            thoughts_not_own: answered_yes(section.thoughts_not_own),
        }
    }
}

impl FitnessAssessmentCriteria {
    /// Criteria with every domain marked as not done.
    pub fn baseline(examination_type: ExaminationType) -> Self {
        Self {
            examination_type,
            vitals: VitalsCriteria::default(),
            vision: None,
            hearing: None,
            lung_function: None,
            drug_screen: DrugScreenStatus::NotDone,
            medical_history: MedicalHistoryCriteria::default(),
            heights: None,
        }
    }

    /// Builds criteria from station records, using the latest vitals and test per domain.
    pub fn from_records(
        patient: &PatientRecord,
        questionnaire: Option<&QuestionnaireResponse>,
        vitals: Option<&VitalSigns>,
        tests: &LatestTests,
    ) -> Self {
        let vitals = vitals
            .map(|reading| VitalsCriteria {
                systolic: reading.systolic,
                diastolic: reading.diastolic,
                pulse: reading.pulse,
                temperature_celsius: reading.temperature_celsius,
                bmi: reading.body_mass_index(),
            })
            .unwrap_or_default();

        Self {
            examination_type: patient.examination_type,
            vitals,
            vision: tests.vision.as_ref().map(|test| VisionCriteria {
                left_eye: test.left_eye.clone(),
                right_eye: test.right_eye.clone(),
            }),
            hearing: tests.hearing.as_ref().map(|test| HearingCriteria {
                left_ear_db: test.left_ear_db,
                right_ear_db: test.right_ear_db,
            }),
            lung_function: tests.lung_function.as_ref().map(|test| LungFunctionCriteria {
                fev1_percent: test.fev1_percent,
                fvc_percent: test.fvc_percent,
            }),
            drug_screen: tests
                .drug_screen
                .as_ref()
                .map(|test| DrugScreenStatus::from(test.result))
                .unwrap_or_default(),
            medical_history: MedicalHistoryCriteria::from_history(
                questionnaire.and_then(|q| q.medical_history.as_ref()),
            ),
            heights: questionnaire
                .and_then(|q| q.heights_safety.as_ref())
                .map(HeightsCriteria::from),
        }
    }
}

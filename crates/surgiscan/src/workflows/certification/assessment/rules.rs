use super::config::CriticalFindingMode;
use super::criteria::{DrugScreenStatus, FitnessAssessmentCriteria};
use super::FitnessStatus;

const SEVERE_VISION_DELTA: u32 = 60;
const CORRECTION_VISION_DELTA: u32 = 30;
const SEVERE_HEARING_DB: f32 = 60.0;
const MILD_HEARING_DB: f32 = 25.0;
const SEVERE_LUNG_PERCENT: f32 = 50.0;
const MODERATE_LUNG_BAND: std::ops::Range<f32> = 60.0..70.0;
const OBESITY_BMI: f32 = 35.0;
const TACHYCARDIA_BPM: u16 = 120;
const BRADYCARDIA_BPM: u16 = 40;
const FEVER_CELSIUS: f32 = 38.0;
const ESCALATION_RESTRICTION_COUNT: usize = 3;

/// Blood pressure banding shared by the rule passes and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum BloodPressureBand {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl BloodPressureBand {
    pub(crate) fn classify(systolic: Option<u16>, diastolic: Option<u16>) -> Self {
        let systolic = systolic.unwrap_or(0);
        let diastolic = diastolic.unwrap_or(0);
        if systolic >= 180 || diastolic >= 110 {
            Self::Severe
        } else if systolic >= 160 || diastolic >= 100 {
            Self::Moderate
        } else if systolic >= 140 || diastolic >= 90 {
            Self::Mild
        } else {
            Self::Normal
        }
    }
}

fn blood_pressure_reading(criteria: &FitnessAssessmentCriteria) -> String {
    let show = |value: Option<u16>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
    format!(
        "{}/{} mmHg",
        show(criteria.vitals.systolic),
        show(criteria.vitals.diastolic)
    )
}

/// Mutable decision state threaded through the passes.
#[derive(Debug)]
pub(crate) struct Evaluation {
    pub status: FitnessStatus,
    pub restrictions: Vec<String>,
    pub reasoning: Vec<String>,
    pub urgent_flags: Vec<String>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self {
            status: FitnessStatus::Fit,
            restrictions: Vec::new(),
            reasoning: Vec::new(),
            urgent_flags: Vec::new(),
        }
    }

    pub fn is_unfit(&self) -> bool {
        self.status == FitnessStatus::Unfit
    }

    /// Raises the status to at least `floor`; never lowers it.
    fn raise_to(&mut self, floor: FitnessStatus) {
        if self.status < floor {
            self.status = floor;
        }
    }

    fn restrict(&mut self, restriction: &str) {
        if !self.restrictions.iter().any(|existing| existing == restriction) {
            self.restrictions.push(restriction.to_string());
        }
    }

    fn reason(&mut self, reason: String) {
        self.reasoning.push(reason);
    }

    /// Minor findings restrict a fit worker but never change a stronger status.
    fn minor(&mut self, restriction: &str, reason: String) {
        if self.status == FitnessStatus::Fit {
            self.status = FitnessStatus::FitWithRestriction;
        }
        self.restrict(restriction);
        self.reason(reason);
    }
}

/// Every critical disqualifier present, in rule order.
fn critical_findings(criteria: &FitnessAssessmentCriteria) -> Vec<String> {
    let mut findings = Vec::new();

    if criteria.drug_screen == DrugScreenStatus::Positive {
        findings.push("Positive drug screen result".to_string());
    }

    if let Some(vision) = &criteria.vision {
        if let Some(worst) = vision.worst_denominator() {
            if worst.saturating_sub(20) > SEVERE_VISION_DELTA {
                findings.push(format!(
                    "Severe visual impairment (L: {}, R: {})",
                    vision.left_eye, vision.right_eye
                ));
            }
        }
    }

    if let Some(hearing) = &criteria.hearing {
        if hearing.worst_ear_db() > SEVERE_HEARING_DB {
            findings.push(format!(
                "Severe hearing loss ({:.0} dB worst ear)",
                hearing.worst_ear_db()
            ));
        }
    }

    let band = BloodPressureBand::classify(criteria.vitals.systolic, criteria.vitals.diastolic);
    if band == BloodPressureBand::Severe {
        findings.push(format!(
            "Severe hypertension ({})",
            blood_pressure_reading(criteria)
        ));
    }

    if let Some(lungs) = &criteria.lung_function {
        if lungs.fev1_percent < SEVERE_LUNG_PERCENT || lungs.fvc_percent < SEVERE_LUNG_PERCENT {
            findings.push(format!(
                "Severely impaired lung function (FEV1 {:.0}%, FVC {:.0}%)",
                lungs.fev1_percent, lungs.fvc_percent
            ));
        }
    }

    if let Some(heights) = &criteria.heights {
        if heights.seizures_or_blackouts {
            findings.push("Seizures or blackouts reported for working at heights".to_string());
        }
        if heights.suicidal_ideation {
            findings.push("Suicidal ideation reported".to_string());
        }
    }

    findings
}

pub(crate) fn apply_critical(
    evaluation: &mut Evaluation,
    criteria: &FitnessAssessmentCriteria,
    mode: CriticalFindingMode,
) {
    let findings = critical_findings(criteria);
    if findings.is_empty() {
        return;
    }

    evaluation.status = FitnessStatus::Unfit;
    match mode {
        CriticalFindingMode::FirstMatch => {
            if let Some(first) = findings.into_iter().next() {
                evaluation.reason(first);
            }
        }
        CriticalFindingMode::CollectAll => evaluation.reasoning.extend(findings),
    }
}

pub(crate) fn apply_urgent(
    evaluation: &mut Evaluation,
    criteria: &FitnessAssessmentCriteria,
    extended: bool,
) {
    if criteria.heights.map(|h| h.thoughts_not_own).unwrap_or(false) {
        evaluation.urgent_flags.push(
            "Reports thoughts or messages not their own: psychiatric evaluation required"
                .to_string(),
        );
    }

    if !extended {
        return;
    }

    if let Some(pulse) = criteria.vitals.pulse {
        if pulse > TACHYCARDIA_BPM {
            evaluation
                .urgent_flags
                .push(format!("Tachycardia: pulse {pulse} bpm"));
        } else if pulse < BRADYCARDIA_BPM {
            evaluation
                .urgent_flags
                .push(format!("Bradycardia: pulse {pulse} bpm"));
        }
    }

    if let Some(temperature) = criteria.vitals.temperature_celsius {
        if temperature >= FEVER_CELSIUS {
            evaluation
                .urgent_flags
                .push(format!("Fever: temperature {temperature:.1} °C"));
        }
    }

    if criteria.drug_screen == DrugScreenStatus::Inconclusive {
        evaluation
            .urgent_flags
            .push("Inconclusive drug screen: repeat test required".to_string());
    }
}

pub(crate) fn apply_major(evaluation: &mut Evaluation, criteria: &FitnessAssessmentCriteria) {
    let band = BloodPressureBand::classify(criteria.vitals.systolic, criteria.vitals.diastolic);
    if band == BloodPressureBand::Moderate {
        evaluation.raise_to(FitnessStatus::FitWithCondition);
        evaluation.restrict("Blood pressure monitoring required");
        evaluation.reason(format!(
            "Moderate hypertension ({})",
            blood_pressure_reading(criteria)
        ));
    }

    if criteria.medical_history.diabetes {
        evaluation.raise_to(FitnessStatus::FitWithCondition);
        evaluation.restrict("Diabetes management and regular glucose monitoring required");
        evaluation.reason("Diabetes on record".to_string());
    }

    if criteria.medical_history.heart_disease {
        evaluation.raise_to(FitnessStatus::FitWithCondition);
        evaluation.restrict("Cardiology follow-up required");
        evaluation.restrict("No heavy lifting");
        evaluation.reason("History of heart disease".to_string());
    }

    if let Some(lungs) = &criteria.lung_function {
        if MODERATE_LUNG_BAND.contains(&lungs.fev1_percent)
            || MODERATE_LUNG_BAND.contains(&lungs.fvc_percent)
        {
            evaluation.raise_to(FitnessStatus::FitWithCondition);
            evaluation.restrict("Avoid dusty environments");
            evaluation.restrict("Respiratory protective equipment required");
            evaluation.reason(format!(
                "Moderately reduced lung function (FEV1 {:.0}%, FVC {:.0}%)",
                lungs.fev1_percent, lungs.fvc_percent
            ));
        }
    }
}

pub(crate) fn apply_minor(evaluation: &mut Evaluation, criteria: &FitnessAssessmentCriteria) {
    let band = BloodPressureBand::classify(criteria.vitals.systolic, criteria.vitals.diastolic);
    if band == BloodPressureBand::Mild {
        evaluation.minor(
            "Blood pressure monitoring recommended",
            format!("Mild hypertension ({})", blood_pressure_reading(criteria)),
        );
    }

    if let Some(vision) = &criteria.vision {
        if vision.has_unreadable_eye() {
            evaluation.reason(format!(
                "Visual acuity could not be read as 20/N (L: {}, R: {}); repeat vision test",
                vision.left_eye, vision.right_eye
            ));
        }
        if let Some(worst) = vision.worst_denominator() {
            if worst.saturating_sub(20) > CORRECTION_VISION_DELTA {
                evaluation.minor(
                    "Corrective lenses required",
                    format!(
                        "Visual acuity requires correction (L: {}, R: {})",
                        vision.left_eye, vision.right_eye
                    ),
                );
            }
        }
    }

    if let Some(hearing) = &criteria.hearing {
        if hearing.worst_ear_db() > MILD_HEARING_DB {
            evaluation.minor(
                "Hearing protection required in noise zones",
                format!(
                    "Mild hearing loss ({:.0} dB worst ear)",
                    hearing.worst_ear_db()
                ),
            );
        }
    }

    if let Some(bmi) = criteria.vitals.bmi {
        if bmi >= OBESITY_BMI {
            evaluation.minor(
                "Weight management programme recommended",
                format!("Obesity (BMI {bmi:.1})"),
            );
        }
    }

    if criteria.medical_history.asthma {
        evaluation.minor(
            "Avoid respiratory irritants and carry prescribed inhaler",
            "History of asthma".to_string(),
        );
    }
}

pub(crate) fn apply_heights(evaluation: &mut Evaluation, criteria: &FitnessAssessmentCriteria) {
    let Some(heights) = &criteria.heights else {
        return;
    };

    if heights.fear_of_heights {
        evaluation.status = FitnessStatus::Unfit;
        evaluation.reason("Fear of heights reported".to_string());
    }
    if heights.substance_abuse {
        evaluation.status = FitnessStatus::Unfit;
        evaluation.reason("Substance abuse reported".to_string());
    }
}

pub(crate) fn resolve(evaluation: &mut Evaluation) {
    if !evaluation.urgent_flags.is_empty() && !evaluation.is_unfit() {
        evaluation.status = FitnessStatus::TemporaryUnfit;
        evaluation
            .reasoning
            .push("Urgent findings require resolution before clearance".to_string());
    }

    if evaluation.restrictions.len() >= ESCALATION_RESTRICTION_COUNT
        && evaluation.status == FitnessStatus::FitWithRestriction
    {
        evaluation.status = FitnessStatus::FitWithCondition;
        evaluation.reasoning.push(format!(
            "{} restrictions apply; fitness is conditional",
            evaluation.restrictions.len()
        ));
    }

    if evaluation.reasoning.is_empty() {
        evaluation
            .reasoning
            .push("All assessed parameters within normal limits".to_string());
    }
}

use super::super::domain::{
    answered_yes, Declarations, Demographics, Employment, ExaminationType, HeightsSafety,
    IntakeSection, MedicalHistory, OccupationalExposure, PeriodicUpdate, QuestionnaireResponse,
    RespiratorySection, ReturnToWork,
};
use super::super::identity::{birth_date_matches, verify_checksum};
use super::SectionStatus;

/// Findings for a single intake section.
#[derive(Debug, Default)]
pub(crate) struct SectionReport {
    pub incomplete: bool,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub urgent_issues: Vec<String>,
    pub requires_review: bool,
}

impl SectionReport {
    fn incomplete() -> Self {
        Self {
            incomplete: true,
            ..Self::default()
        }
    }

    fn block(&mut self, issue: impl Into<String>) {
        self.incomplete = true;
        self.critical_issues.push(issue.into());
    }

    fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    fn escalate(&mut self, warning: impl Into<String>) {
        self.requires_review = true;
        self.warnings.push(warning.into());
    }

    fn urgent(&mut self, issue: impl Into<String>) {
        self.requires_review = true;
        self.urgent_issues.push(issue.into());
    }

    pub fn status(&self) -> SectionStatus {
        if self.incomplete {
            SectionStatus::Incomplete
        } else if !self.warnings.is_empty() || !self.urgent_issues.is_empty() {
            SectionStatus::Warning
        } else {
            SectionStatus::Complete
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_blank_opt(value: Option<&str>) -> bool {
    value.map(is_blank).unwrap_or(true)
}

pub(crate) fn demographics(
    demographics: Option<&Demographics>,
    employment: Option<&Employment>,
) -> SectionReport {
    let mut report = SectionReport::default();

    match demographics {
        Some(details) => {
            if let Err(err) = verify_checksum(&details.id_number) {
                report.block(format!("ID number is invalid: {err}"));
            } else if let Some(dob) = details.date_of_birth {
                if !birth_date_matches(&details.id_number, dob) {
                    report.warn("Date of birth does not match the ID number");
                }
            }
            if is_blank(&details.first_name) {
                report.block("First name is required");
            }
            if is_blank(&details.surname) {
                report.block("Surname is required");
            }
        }
        None => report.block("Patient demographics have not been captured"),
    }

    match employment {
        Some(employment) => {
            if is_blank(&employment.position) {
                report.block("Employment position is required");
            }
            if is_blank(&employment.company_name) {
                report.block("Company name is required");
            }
        }
        None => report.block("Employment details have not been captured"),
    }

    report
}

pub(crate) fn medical_history(
    history: Option<&MedicalHistory>,
    examination_type: ExaminationType,
) -> SectionReport {
    let history = match history {
        Some(history) if !history.is_empty() => history,
        _ => return SectionReport::incomplete(),
    };

    let heights = examination_type == ExaminationType::WorkingAtHeights;
    let mut report = SectionReport::default();

    if answered_yes(history.heart_disease) || answered_yes(history.high_blood_pressure) {
        let warning =
            "History of heart disease or high blood pressure: cardiovascular review recommended";
        if answered_yes(history.heart_disease) {
            report.escalate(warning);
        } else {
            report.warn(warning);
        }
    }

    if answered_yes(history.epilepsy_or_convulsions) {
        if heights {
            report.escalate("Epilepsy or convulsions reported for a working at heights candidate");
        } else {
            report.warn("History of epilepsy or convulsions: confirm seizure control and medication");
        }
    }

    if answered_yes(history.diabetes) {
        report.warn("Diabetes reported: confirm glucose control and treatment compliance");
    }

    if answered_yes(history.mental_health_condition) {
        let warning = "Mental health condition reported: assess fitness for safety-sensitive duties";
        if heights {
            report.escalate(warning);
        } else {
            report.warn(warning);
        }
    }

    if answered_yes(history.tuberculosis) || answered_yes(history.pneumonia) {
        report.warn("History of tuberculosis or pneumonia: chest X-ray recommended");
    }
    if answered_yes(history.tuberculosis_treatment_current) {
        report.escalate("Currently on tuberculosis treatment: confirm infectivity status");
    }

    if answered_yes(history.asthma) || answered_yes(history.allergies) {
        report.warn("Asthma or allergies reported: review respiratory exposure controls");
    }

    report
}

pub(crate) fn type_specific(
    questionnaire: &QuestionnaireResponse,
    examination_type: ExaminationType,
) -> Option<(IntakeSection, SectionReport)> {
    let section = examination_type.type_specific_section()?;
    let report = match section {
        IntakeSection::HeightsSafety => heights_safety(questionnaire.heights_safety.as_ref()),
        IntakeSection::PeriodicUpdate => periodic_update(questionnaire.periodic_update.as_ref()),
        IntakeSection::ReturnToWork => return_to_work(questionnaire.return_to_work.as_ref()),
        _ => return None,
    };
    Some((section, report))
}

fn heights_safety(section: Option<&HeightsSafety>) -> SectionReport {
    let Some(answers) = section else {
        return SectionReport::incomplete();
    };

    let mut report = SectionReport {
        incomplete: answers.unanswered() > 0,
        ..SectionReport::default()
    };

    if answered_yes(answers.advised_not_to_work_at_height) {
        report.escalate("Previously advised not to work at heights");
    }
    if answered_yes(answers.fear_of_heights_or_enclosed_spaces) {
        report.escalate("Fear of heights or enclosed spaces reported");
    }
    if answered_yes(answers.fits_seizures_or_blackouts) {
        report.urgent("Fits, seizures or blackouts reported");
    }
    if answered_yes(answers.suicidal_thoughts) {
        report.urgent("Suicidal thoughts or attempts reported");
    }
    if answered_yes(answers.mental_health_professional) {
        report.escalate("Currently under the care of a mental health professional");
    }
    if answered_yes(answers.thoughts_not_own) {
        report.urgent("Reports hearing thoughts or messages that are not their own");
    }
    if answered_yes(answers.substance_abuse) {
        report.escalate("Substance abuse problem reported");
    }
    if answered_yes(answers.other_problems) {
        report.escalate("Other problems affecting ability to work at heights reported");
    }
    if answered_yes(answers.serious_occupational_accident) {
        report.warn("Previous serious occupational accident or disease");
    }
    if answered_yes(answers.dizziness_or_balance_problems) {
        report.warn("Dizziness or balance problems reported");
    }
    if answers.informed_of_safety_requirements == Some(false) {
        report.warn("Employee has not been informed of working at heights safety requirements");
    }

    report
}

fn periodic_update(section: Option<&PeriodicUpdate>) -> SectionReport {
    let Some(update) = section else {
        return SectionReport::incomplete();
    };

    let answers = [
        update.new_conditions,
        update.new_medication,
        update.injuries_since_last,
    ];
    let mut report = SectionReport {
        incomplete: answers.iter().any(Option::is_none),
        ..SectionReport::default()
    };

    if answered_yes(update.new_conditions) {
        report.warn("New medical conditions since the last examination");
    }
    if answered_yes(update.new_medication) {
        report.warn("New medication since the last examination");
    }
    if answered_yes(update.injuries_since_last) {
        report.warn("Injuries reported since the last examination");
    }

    report
}

fn return_to_work(section: Option<&ReturnToWork>) -> SectionReport {
    let Some(details) = section else {
        return SectionReport::incomplete();
    };

    let mut report = SectionReport {
        incomplete: is_blank_opt(details.absence_reason.as_deref())
            || details.cleared_by_treating_doctor.is_none(),
        ..SectionReport::default()
    };

    if details.cleared_by_treating_doctor == Some(false) {
        report.escalate("Not yet cleared for work by the treating doctor");
    }
    if answered_yes(details.ongoing_treatment) {
        report.warn("Ongoing treatment for the condition that caused the absence");
    }
    if answered_yes(details.restrictions_advised) {
        report.warn("Treating doctor advised work restrictions");
    }

    report
}

pub(crate) fn declarations(section: Option<&Declarations>) -> SectionReport {
    let Some(declarations) = section else {
        let mut report = SectionReport::default();
        report.block("Declarations have not been completed");
        return report;
    };

    let mut report = SectionReport::default();
    if !answered_yes(declarations.information_correct) {
        report.block("Employee must declare that the information provided is correct");
    }
    if !answered_yes(declarations.no_misleading_information) {
        report.block("Employee must declare that no misleading information was given");
    }
    if !answered_yes(declarations.consent_to_examination) {
        report.block("Consent to the medical examination is required");
    }
    if is_blank_opt(declarations.employee_name.as_deref()) {
        report.block("Employee name is required on the declaration");
    }
    if is_blank_opt(declarations.employee_signature.as_deref()) {
        report.block("Employee signature is required on the declaration");
    }

    report
}

pub(crate) fn respiratory(section: Option<&RespiratorySection>) -> Option<SectionReport> {
    let section = section?;
    let mut report = SectionReport::default();

    if answered_yes(section.shortness_of_breath)
        || answered_yes(section.chronic_cough)
        || answered_yes(section.wheezing)
    {
        report.warn("Respiratory symptoms reported: spirometry recommended");
    }
    if answered_yes(section.current_smoker) {
        report.warn("Current smoker: smoking cessation counselling advised");
    }

    Some(report)
}

pub(crate) fn occupational_exposure(section: Option<&OccupationalExposure>) -> Option<SectionReport> {
    let section = section?;
    let mut report = SectionReport::default();

    if answered_yes(section.noise) {
        report.warn("Noise exposure reported: audiometry advised");
    }
    if answered_yes(section.dust) || answered_yes(section.chemicals) || answered_yes(section.fumes)
    {
        report.warn("Airborne hazard exposure reported: spirometry advised");
    }

    Some(report)
}

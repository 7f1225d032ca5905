use super::criteria::FitnessAssessmentCriteria;
use super::rules::BloodPressureBand;
use super::FitnessStatus;

const OVERWEIGHT_BMI: f32 = 30.0;
const REDUCED_LUNG_PERCENT: f32 = 80.0;

fn status_line(status: FitnessStatus) -> &'static str {
    match status {
        FitnessStatus::Fit => "Fit for duty without restriction",
        FitnessStatus::FitWithRestriction => "Fit for duty subject to the listed restrictions",
        FitnessStatus::FitWithCondition => {
            "Fit for duty on condition that the listed requirements are met"
        }
        FitnessStatus::TemporaryUnfit => {
            "Temporarily unfit for duty until urgent findings are resolved"
        }
        FitnessStatus::Unfit => "Unfit for duty in the applied-for role",
    }
}

/// Recommendation paragraph: status line, finding lines, follow-up interval.
pub(crate) fn compose(status: FitnessStatus, criteria: &FitnessAssessmentCriteria) -> String {
    let mut lines = vec![status_line(status).to_string()];

    let band = BloodPressureBand::classify(criteria.vitals.systolic, criteria.vitals.diastolic);
    if band >= BloodPressureBand::Mild {
        lines.push("Blood pressure review with a general practitioner advised".to_string());
    }

    if criteria.vitals.bmi.is_some_and(|bmi| bmi >= OVERWEIGHT_BMI) {
        lines.push("Lifestyle and weight management counselling advised".to_string());
    }

    if criteria.lung_function.is_some_and(|lungs| {
        lungs.fev1_percent < REDUCED_LUNG_PERCENT || lungs.fvc_percent < REDUCED_LUNG_PERCENT
    }) {
        lines.push("Repeat spirometry and respiratory review advised".to_string());
    }

    let months = status.follow_up_months();
    let follow_up = if months == 3 {
        format!("Follow-up examination in {months} months or sooner as clinically indicated")
    } else {
        format!("Follow-up examination in {months} months")
    };
    lines.push(follow_up);

    lines.join(". ")
}

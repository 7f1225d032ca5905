use super::common::*;
use crate::workflows::certification::assessment::{
    AssessmentConfig, CriticalFindingMode, DrugScreenStatus, FitnessAssessmentCriteria,
    FitnessAssessmentEngine, FitnessStatus, HearingCriteria, HeightsCriteria, LungFunctionCriteria,
    MedicalHistoryCriteria, VisionCriteria,
};
use crate::workflows::certification::domain::ExaminationType;

fn vision(left: &str, right: &str) -> Option<VisionCriteria> {
    Some(VisionCriteria {
        left_eye: left.to_string(),
        right_eye: right.to_string(),
    })
}

#[test]
fn healthy_worker_is_fit() {
    let decision = engine().assess(&healthy_criteria(ExaminationType::Periodic));

    assert_eq!(decision.status, FitnessStatus::Fit);
    assert!(decision.restrictions.is_empty());
    assert!(decision.urgent_flags.is_empty());
    assert_eq!(
        decision.reasoning,
        vec!["All assessed parameters within normal limits".to_string()]
    );
    assert!(decision.recommendations.starts_with("Fit for duty"));
    assert!(decision.recommendations.ends_with("in 12 months"));
}

#[test]
fn domains_not_done_never_fire_rules() {
    let criteria = FitnessAssessmentCriteria::baseline(ExaminationType::PreEmployment);
    assert_eq!(criteria.drug_screen, DrugScreenStatus::NotDone);

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Fit);
    assert!(decision.restrictions.is_empty());
}

#[test]
fn positive_drug_screen_is_unfit_without_restrictions() {
    let mut criteria = healthy_criteria(ExaminationType::PreEmployment);
    criteria.drug_screen = DrugScreenStatus::Positive;

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Unfit);
    assert!(decision
        .reasoning
        .iter()
        .any(|reason| reason.contains("Positive drug screen result")));
    assert!(decision.restrictions.is_empty());
    assert!(decision
        .recommendations
        .ends_with("or sooner as clinically indicated"));
}

#[test]
fn mild_hypertension_restricts_a_fit_worker() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vitals.systolic = Some(145);
    criteria.vitals.diastolic = Some(92);
    criteria.vitals.bmi = Some(22.0);

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::FitWithRestriction);
    assert_eq!(
        decision.restrictions,
        vec!["Blood pressure monitoring recommended".to_string()]
    );
    assert!(decision.recommendations.contains("Follow-up examination in 6 months"));
}

#[test]
fn fear_of_heights_is_unfit() {
    let mut criteria = healthy_criteria(ExaminationType::WorkingAtHeights);
    criteria.heights = Some(HeightsCriteria {
        fear_of_heights: true,
        ..HeightsCriteria::default()
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Unfit);
    assert!(decision
        .reasoning
        .iter()
        .any(|reason| reason.contains("Fear of heights")));
}

#[test]
fn assessment_is_deterministic() {
    let mut criteria = healthy_criteria(ExaminationType::WorkingAtHeights);
    criteria.vitals.systolic = Some(165);
    criteria.vitals.pulse = Some(130);
    criteria.medical_history.asthma = true;

    let engine = engine();
    assert_eq!(engine.assess(&criteria), engine.assess(&criteria));
}

#[test]
fn critical_unfit_is_never_downgraded() {
    let mut criteria = healthy_criteria(ExaminationType::WorkingAtHeights);
    criteria.hearing = Some(HearingCriteria {
        left_ear_db: 70.0,
        right_ear_db: 20.0,
    });
    criteria.vitals.systolic = Some(165);
    criteria.vitals.pulse = Some(135);
    criteria.medical_history = MedicalHistoryCriteria {
        diabetes: true,
        ..MedicalHistoryCriteria::default()
    };
    criteria.heights = Some(HeightsCriteria {
        thoughts_not_own: true,
        substance_abuse: true,
        ..HeightsCriteria::default()
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Unfit);
    assert!(decision.restrictions.is_empty());
    assert!(decision.urgent_flags.is_empty());
    assert!(decision.reasoning[0].contains("Severe hearing loss"));
    assert!(decision
        .reasoning
        .iter()
        .any(|reason| reason.contains("Substance abuse")));
}

#[test]
fn first_match_records_a_single_critical_finding() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.drug_screen = DrugScreenStatus::Positive;
    criteria.vision = vision("20/200", "20/20");
    criteria.vitals.systolic = Some(190);

    let decision = engine().assess(&criteria);

    assert_eq!(decision.reasoning.len(), 1);
    assert_eq!(decision.reasoning[0], "Positive drug screen result");
}

#[test]
fn collect_all_records_every_critical_finding() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.drug_screen = DrugScreenStatus::Positive;
    criteria.vision = vision("20/200", "20/20");
    criteria.vitals.systolic = Some(190);

    let engine = FitnessAssessmentEngine::new(AssessmentConfig {
        critical_findings: CriticalFindingMode::CollectAll,
        ..AssessmentConfig::default()
    });
    let decision = engine.assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Unfit);
    assert_eq!(decision.reasoning.len(), 3);
    assert!(decision.reasoning[1].contains("Severe visual impairment"));
    assert!(decision.reasoning[2].contains("Severe hypertension"));
}

#[test]
fn vision_thresholds_split_critical_and_correctable() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vision = vision("20/80", "20/40");
    let decision = engine().assess(&criteria);
    assert_eq!(decision.status, FitnessStatus::FitWithRestriction);
    assert_eq!(decision.restrictions, vec!["Corrective lenses required".to_string()]);

    criteria.vision = vision("20/100", "20/20");
    assert_eq!(engine().assess(&criteria).status, FitnessStatus::Unfit);
}

#[test]
fn letter_error_suffix_still_disqualifies() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vision = vision("20/200-1", "20/20");

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Unfit);
    assert_eq!(
        decision.reasoning,
        vec!["Severe visual impairment (L: 20/200-1, R: 20/20)".to_string()]
    );

    criteria.vision = vision("20/60+2", "20/20");
    let decision = engine().assess(&criteria);
    assert_eq!(decision.status, FitnessStatus::FitWithRestriction);
    assert_eq!(decision.restrictions, vec!["Corrective lenses required".to_string()]);
}

#[test]
fn unreadable_acuity_is_never_reported_as_normal() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vision = vision("CF 1m", "20/20");

    let decision = engine().assess(&criteria);

    assert_ne!(
        decision.reasoning,
        vec!["All assessed parameters within normal limits".to_string()]
    );
    assert!(decision.reasoning[0].starts_with("Visual acuity could not be read"));
}

#[test]
fn vital_signs_are_not_urgent_by_default() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vitals.pulse = Some(125);
    criteria.vitals.temperature_celsius = Some(38.4);
    criteria.drug_screen = DrugScreenStatus::Inconclusive;

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Fit);
    assert!(decision.urgent_flags.is_empty());
}

#[test]
fn extended_urgent_checks_force_temporary_unfit() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vitals.temperature_celsius = Some(38.4);
    criteria.drug_screen = DrugScreenStatus::Inconclusive;

    let engine = FitnessAssessmentEngine::new(AssessmentConfig {
        extended_urgent_checks: true,
        ..AssessmentConfig::default()
    });
    let decision = engine.assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::TemporaryUnfit);
    assert_eq!(decision.urgent_flags.len(), 2);
    assert!(decision.urgent_flags[0].starts_with("Fever"));
}

#[test]
fn thoughts_not_own_is_urgent_for_heights() {
    let mut criteria = healthy_criteria(ExaminationType::WorkingAtHeights);
    criteria.heights = Some(HeightsCriteria {
        thoughts_not_own: true,
        ..HeightsCriteria::default()
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::TemporaryUnfit);
    assert_eq!(decision.urgent_flags.len(), 1);
}

#[test]
fn major_concerns_make_fitness_conditional() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.medical_history.heart_disease = true;
    criteria.lung_function = Some(LungFunctionCriteria {
        fev1_percent: 65.0,
        fvc_percent: 85.0,
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::FitWithCondition);
    assert_eq!(
        decision.restrictions,
        vec![
            "Cardiology follow-up required".to_string(),
            "No heavy lifting".to_string(),
            "Avoid dusty environments".to_string(),
            "Respiratory protective equipment required".to_string(),
        ]
    );
}

#[test]
fn moderate_hypertension_skips_the_mild_band() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vitals.systolic = Some(170);
    criteria.vitals.diastolic = Some(95);

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::FitWithCondition);
    assert_eq!(
        decision.restrictions,
        vec!["Blood pressure monitoring required".to_string()]
    );
}

#[test]
fn three_minor_restrictions_escalate_to_conditional() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.vitals.systolic = Some(142);
    criteria.vision = vision("20/60", "20/20");
    criteria.hearing = Some(HearingCriteria {
        left_ear_db: 30.0,
        right_ear_db: 20.0,
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.restrictions.len(), 3);
    assert_eq!(decision.status, FitnessStatus::FitWithCondition);
}

#[test]
fn minor_findings_do_not_soften_a_major_status() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.medical_history.diabetes = true;
    criteria.vitals.bmi = Some(36.5);

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::FitWithCondition);
    assert!(decision
        .restrictions
        .contains(&"Weight management programme recommended".to_string()));
    assert!(decision
        .recommendations
        .contains("Lifestyle and weight management counselling advised"));
}

#[test]
fn lung_function_between_severe_and_moderate_bands_adds_no_restriction() {
    let mut criteria = healthy_criteria(ExaminationType::Periodic);
    criteria.lung_function = Some(LungFunctionCriteria {
        fev1_percent: 55.0,
        fvc_percent: 82.0,
    });

    let decision = engine().assess(&criteria);

    assert_eq!(decision.status, FitnessStatus::Fit);
    assert!(decision.recommendations.contains("Repeat spirometry"));
}

#[test]
fn statuses_serialize_in_kebab_case_and_order_by_severity() {
    let names: Vec<String> = FitnessStatus::ordered()
        .into_iter()
        .map(|status| serde_json::to_value(status).expect("serializes"))
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec![
            "fit",
            "fit-with-restriction",
            "fit-with-condition",
            "temporary-unfit",
            "unfit"
        ]
    );
    assert!(FitnessStatus::FitWithCondition < FitnessStatus::TemporaryUnfit);
}

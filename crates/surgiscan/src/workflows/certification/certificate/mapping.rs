use chrono::{Months, NaiveDate};

use super::super::assessment::{BloodPressureBand, FitnessStatus, MedicalHistoryCriteria};
use super::super::domain::{
    answered_yes, DrugScreenOutcome, HearingTest, HeightsSafety, LatestTests, LungFunctionTest,
    PatientRecord, QuestionnaireResponse, VisionTest, VitalSigns,
};
use super::data::{
    CertificateData, CertificateTest, CompanyIdentity, PatientBlock, PractitionerIdentity,
    ReferralActions, SignatureBlock, TestResultLine,
};

const NORMAL_HEARING_DB: f32 = 25.0;
const MILD_HEARING_DB: f32 = 40.0;
const NORMAL_LUNG_PERCENT: f32 = 80.0;
const MILD_LUNG_PERCENT: f32 = 60.0;
const NORMAL_ACUITY: &str = "20/20";

/// Station records feeding one certificate.
#[derive(Debug, Clone, Copy)]
pub struct CertificateSource<'a> {
    pub patient: &'a PatientRecord,
    pub questionnaire: Option<&'a QuestionnaireResponse>,
    pub vitals: Option<&'a VitalSigns>,
    pub tests: &'a LatestTests,
}

/// Status, restrictions and comments that will be printed on the certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateDeclaration {
    pub status: Option<FitnessStatus>,
    pub restrictions: Vec<String>,
    pub comments: String,
}

/// Canonicalizes station records into the certificate schema.
pub fn map_to_certificate_data(
    company: &CompanyIdentity,
    practitioner: &PractitionerIdentity,
    source: CertificateSource<'_>,
    declaration: CertificateDeclaration,
) -> CertificateData {
    let patient = source.patient;
    let (initials, surname) = split_name(&patient.demographics.full_name());
    let heights = source.questionnaire.and_then(|q| q.heights_safety.as_ref());
    let history = MedicalHistoryCriteria::from_history(
        source
            .questionnaire
            .and_then(|q| q.medical_history.as_ref()),
    );

    let review_date = declaration
        .status
        .and_then(|status| add_months(patient.examination_date, status.follow_up_months()));

    CertificateData {
        company: company.clone(),
        practitioner: practitioner.clone(),
        patient: PatientBlock {
            initials,
            surname,
            id_number: patient.demographics.id_number.trim().to_string(),
            company_name: patient.employment.company_name.trim().to_string(),
            job_title: patient.employment.position.trim().to_string(),
            examination_type: patient.examination_type,
            examination_date: patient.examination_date,
            expiry_date: patient.certificate_expiry(),
        },
        tests: test_lines(source.vitals, source.tests),
        referral_actions: referral_actions(source.vitals, source.tests, &history, heights),
        restrictions: declaration.restrictions,
        fitness_status: declaration.status,
        comments: declaration.comments,
        review_date,
        signature: SignatureBlock {
            practitioner_name: practitioner.name.clone(),
            practice_number: practitioner.practice_number.clone(),
            qualification: practitioner.qualification.clone(),
            signed_on: patient.examination_date,
            stamp: practitioner.stamp.clone(),
        },
    }
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Splits a full name into `(initials, surname)`; the surname is the last token.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
    let Some(surname) = tokens.pop() else {
        return (String::new(), String::new());
    };
    let initials: String = tokens
        .iter()
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    (initials, surname.to_string())
}

pub fn classify_hearing(test: &HearingTest) -> &'static str {
    let worst = test.left_ear_db.max(test.right_ear_db);
    if worst <= NORMAL_HEARING_DB {
        "Normal"
    } else if worst <= MILD_HEARING_DB {
        "Mild Loss"
    } else {
        "Significant Loss"
    }
}

pub fn classify_lung_function(test: &LungFunctionTest) -> &'static str {
    let lowest = test.fev1_percent.min(test.fvc_percent);
    if lowest >= NORMAL_LUNG_PERCENT {
        "Normal"
    } else if lowest >= MILD_LUNG_PERCENT {
        "Mild Restriction"
    } else {
        "Significant Restriction"
    }
}

fn vision_result(test: &VisionTest) -> String {
    format!("L: {}, R: {}", test.left_eye, test.right_eye)
}

fn drug_screen_result(outcome: DrugScreenOutcome) -> &'static str {
    match outcome {
        DrugScreenOutcome::Negative => "Negative",
        DrugScreenOutcome::Positive => "Positive",
        DrugScreenOutcome::Inconclusive => "Inconclusive",
    }
}

fn test_lines(vitals: Option<&VitalSigns>, tests: &LatestTests) -> Vec<TestResultLine> {
    CertificateTest::ordered()
        .into_iter()
        .map(|test| {
            let result = match test {
                CertificateTest::Vision => tests.vision.as_ref().map(vision_result),
                CertificateTest::Hearing => tests
                    .hearing
                    .as_ref()
                    .map(|t| classify_hearing(t).to_string()),
                CertificateTest::LungFunction => tests
                    .lung_function
                    .as_ref()
                    .map(|t| classify_lung_function(t).to_string()),
                CertificateTest::DrugScreen => tests
                    .drug_screen
                    .as_ref()
                    .map(|t| drug_screen_result(t.result).to_string()),
                CertificateTest::BloodPressure => vitals.and_then(|v| {
                    Some(format!("{}/{} mmHg", v.systolic?, v.diastolic?))
                }),
                CertificateTest::BodyMassIndex => vitals
                    .and_then(VitalSigns::body_mass_index)
                    .map(|bmi| format!("{bmi:.1}")),
            };
            match result {
                Some(result) => TestResultLine::done(test, result),
                None => TestResultLine::not_done(test),
            }
        })
        .collect()
}

fn referral_actions(
    vitals: Option<&VitalSigns>,
    tests: &LatestTests,
    history: &MedicalHistoryCriteria,
    heights: Option<&HeightsSafety>,
) -> ReferralActions {
    let heights = heights.cloned().unwrap_or_default();

    let blood_pressure = vitals
        .map(|v| BloodPressureBand::classify(v.systolic, v.diastolic))
        .unwrap_or(BloodPressureBand::Normal);

    ReferralActions {
        wear_spectacles: tests.vision.as_ref().is_some_and(|vision| {
            vision.left_eye != NORMAL_ACUITY || vision.right_eye != NORMAL_ACUITY
        }),
        wear_hearing_protection: tests.hearing.as_ref().is_some_and(|hearing| {
            hearing.left_ear_db > NORMAL_HEARING_DB || hearing.right_ear_db > NORMAL_HEARING_DB
        }),
        remain_on_treatment: history.on_chronic_treatment(),
        use_respiratory_protection: tests.lung_function.as_ref().is_some_and(|lungs| {
            lungs.fev1_percent < NORMAL_LUNG_PERCENT || lungs.fvc_percent < NORMAL_LUNG_PERCENT
        }),
        refer_to_physician: blood_pressure >= BloodPressureBand::Mild,
        no_work_at_heights: answered_yes(heights.advised_not_to_work_at_height)
            || answered_yes(heights.fear_of_heights_or_enclosed_spaces)
            || answered_yes(heights.fits_seizures_or_blackouts),
        no_confined_spaces: answered_yes(heights.fear_of_heights_or_enclosed_spaces),
        mental_health_referral: answered_yes(heights.suicidal_thoughts)
            || answered_yes(heights.thoughts_not_own)
            || answered_yes(heights.mental_health_professional),
    }
}

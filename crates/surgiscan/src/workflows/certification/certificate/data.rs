use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::assessment::FitnessStatus;
use super::super::domain::ExaminationType;

/// Practice details printed in the certificate header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// The signing occupational health practitioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PractitionerIdentity {
    pub name: String,
    pub practice_number: String,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub stamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientBlock {
    pub initials: String,
    pub surname: String,
    pub id_number: String,
    pub company_name: String,
    pub job_title: String,
    pub examination_type: ExaminationType,
    pub examination_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Rows of the test-results table, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateTest {
    Vision,
    Hearing,
    LungFunction,
    DrugScreen,
    BloodPressure,
    BodyMassIndex,
}

impl CertificateTest {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Vision,
            Self::Hearing,
            Self::LungFunction,
            Self::DrugScreen,
            Self::BloodPressure,
            Self::BodyMassIndex,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Vision => "Vision",
            Self::Hearing => "Hearing",
            Self::LungFunction => "Lung Function",
            Self::DrugScreen => "Drug Screen",
            Self::BloodPressure => "Blood Pressure",
            Self::BodyMassIndex => "BMI",
        }
    }
}

pub const NOT_DONE: &str = "Not done";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultLine {
    pub test: CertificateTest,
    pub done: bool,
    pub result: String,
}

impl TestResultLine {
    pub fn done(test: CertificateTest, result: impl Into<String>) -> Self {
        Self {
            test,
            done: true,
            result: result.into(),
        }
    }

    pub fn not_done(test: CertificateTest) -> Self {
        Self {
            test,
            done: false,
            result: NOT_DONE.to_string(),
        }
    }
}

/// Referral checklist printed below the test results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralActions {
    pub wear_spectacles: bool,
    pub wear_hearing_protection: bool,
    pub remain_on_treatment: bool,
    pub use_respiratory_protection: bool,
    pub refer_to_physician: bool,
    pub no_work_at_heights: bool,
    pub no_confined_spaces: bool,
    pub mental_health_referral: bool,
}

impl ReferralActions {
    pub fn entries(&self) -> [(&'static str, bool); 8] {
        [
            ("Wear spectacles", self.wear_spectacles),
            ("Wear hearing protection", self.wear_hearing_protection),
            ("Remain on treatment for chronic conditions", self.remain_on_treatment),
            ("Use respiratory protection", self.use_respiratory_protection),
            ("Refer to physician", self.refer_to_physician),
            ("No work at heights", self.no_work_at_heights),
            ("No work in confined spaces", self.no_confined_spaces),
            ("Mental health referral", self.mental_health_referral),
        ]
    }

    pub fn any(&self) -> bool {
        self.entries().iter().any(|(_, checked)| *checked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub practitioner_name: String,
    pub practice_number: String,
    pub qualification: Option<String>,
    pub signed_on: NaiveDate,
    pub stamp: Option<String>,
}

/// Canonical render-ready certificate, editable until finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    pub company: CompanyIdentity,
    pub practitioner: PractitionerIdentity,
    pub patient: PatientBlock,
    pub tests: Vec<TestResultLine>,
    pub referral_actions: ReferralActions,
    pub restrictions: Vec<String>,
    pub fitness_status: Option<FitnessStatus>,
    pub comments: String,
    pub review_date: Option<NaiveDate>,
    pub signature: SignatureBlock,
}

impl CertificateData {
    pub fn test_line(&self, test: CertificateTest) -> Option<&TestResultLine> {
        self.tests.iter().find(|line| line.test == test)
    }

    /// Checks the approval gate and freezes the certificate.
    pub fn finalize(self) -> Result<FinalizedCertificate, AssemblyError> {
        let status = self.fitness_status.ok_or(AssemblyError::MissingFitnessStatus)?;

        if self.practitioner.name.trim().is_empty() {
            return Err(AssemblyError::MissingPractitionerName);
        }
        if self.practitioner.practice_number.trim().is_empty() {
            return Err(AssemblyError::MissingPracticeNumber);
        }

        let has_restriction = self.restrictions.iter().any(|r| !r.trim().is_empty());
        if status != FitnessStatus::Fit && !has_restriction && self.comments.trim().is_empty() {
            return Err(AssemblyError::MissingJustification { status });
        }

        Ok(FinalizedCertificate { status, data: self })
    }
}

/// Approved certificate snapshot. Corrections require a new certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedCertificate {
    status: FitnessStatus,
    #[serde(flatten)]
    data: CertificateData,
}

impl FinalizedCertificate {
    pub fn status(&self) -> FitnessStatus {
        self.status
    }

    pub fn data(&self) -> &CertificateData {
        &self.data
    }

    pub fn patient(&self) -> &PatientBlock {
        &self.data.patient
    }

    pub fn restrictions(&self) -> &[String] {
        &self.data.restrictions
    }

    pub fn referral_actions(&self) -> &ReferralActions {
        &self.data.referral_actions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("fitness status has not been declared")]
    MissingFitnessStatus,
    #[error("practitioner name is required")]
    MissingPractitionerName,
    #[error("practice number is required")]
    MissingPracticeNumber,
    #[error("a {} certificate needs at least one restriction or a comment", .status.as_str())]
    MissingJustification { status: FitnessStatus },
}

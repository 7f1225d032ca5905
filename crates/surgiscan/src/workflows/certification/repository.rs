use super::domain::{PatientId, PatientRecord, QuestionnaireResponse, TestResult, VitalSigns};

/// Examination records opened at intake.
pub trait PatientStore: Send + Sync {
    fn patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError>;
}

pub trait QuestionnaireStore: Send + Sync {
    fn questionnaire(&self, id: &PatientId) -> Result<Option<QuestionnaireResponse>, StoreError>;
}

/// Every vitals reading captured for the examination, in any order.
pub trait VitalsStore: Send + Sync {
    fn vitals(&self, id: &PatientId) -> Result<Vec<VitalSigns>, StoreError>;
}

/// Every station test result captured for the examination, in any order.
pub trait TestStore: Send + Sync {
    fn tests(&self, id: &PatientId) -> Result<Vec<TestResult>, StoreError>;
}

/// Everything the review pipeline reads, usually backed by one storage adapter.
pub trait ExaminationStore: PatientStore + QuestionnaireStore + VitalsStore + TestStore {}

impl<T> ExaminationStore for T where T: PatientStore + QuestionnaireStore + VitalsStore + TestStore {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

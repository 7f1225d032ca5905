//! Fitness-for-duty determination and certificate assembly.
//!
//! Station records flow through intake validation (advisory), the tiered
//! fitness assessment, an optional practitioner override and finally the
//! certificate assembler. Every stage is synchronous and free of I/O apart
//! from the store reads performed by [`CertificateReviewService`].

pub mod assessment;
pub mod certificate;
pub mod domain;
pub mod identity;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use assessment::{
    AssessmentConfig, CriticalFindingMode, DrugScreenStatus, FitnessAssessmentCriteria,
    FitnessAssessmentEngine, FitnessDecision, FitnessStatus,
};
pub use certificate::{
    AssemblyError, CertificateAssembler, CertificateData, CertificateDocument, CertificateError,
    CompanyIdentity, DocumentRenderer, FinalizedCertificate, JsonRenderer, PlainTextRenderer,
    PractitionerIdentity, RenderError, RenderedDocument,
};
pub use domain::{
    Demographics, Employment, ExaminationType, IntakeRecord, IntakeSection, PatientId,
    PatientRecord, QuestionnaireResponse, TestResult, VitalSigns,
};
pub use identity::{is_valid_id_number, IdNumberError, SaIdNumber};
pub use repository::{
    ExaminationStore, PatientStore, QuestionnaireStore, StoreError, TestStore, VitalsStore,
};
pub use router::certification_router;
pub use service::{
    CertificateGenerationResult, CertificateReview, CertificateReviewService, DecisionSource,
    PractitionerOverride, ReviewError,
};
pub use validation::{
    SectionStatus, ValidationDebouncer, ValidationEngine, ValidationResult, ValidationTicket,
};

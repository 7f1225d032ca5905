use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::assessment::{
    AssessmentConfig, FitnessAssessmentCriteria, FitnessAssessmentEngine, FitnessDecision,
    FitnessStatus,
};
use super::certificate::{
    CertificateAssembler, CertificateDeclaration, CertificateError, CertificateSource,
    DocumentRenderer, FinalizedCertificate, PractitionerIdentity, RenderedDocument,
};
use super::domain::{ExaminationType, IntakeRecord, LatestTests, PatientId, VitalSigns};
use super::repository::{ExaminationStore, StoreError};
use super::validation::{ValidationEngine, ValidationResult};

/// Practitioner decision that replaces the computed status, restrictions and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PractitionerOverride {
    pub status: FitnessStatus,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Where the certificate's decision came from. The computed decision is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DecisionSource {
    Computed {
        decision: FitnessDecision,
    },
    Overridden {
        computed: FitnessDecision,
        applied: PractitionerOverride,
    },
}

impl DecisionSource {
    pub fn computed(&self) -> &FitnessDecision {
        match self {
            DecisionSource::Computed { decision } => decision,
            DecisionSource::Overridden { computed, .. } => computed,
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, DecisionSource::Overridden { .. })
    }

    /// Status printed on the certificate.
    pub fn status(&self) -> FitnessStatus {
        match self {
            DecisionSource::Computed { decision } => decision.status,
            DecisionSource::Overridden { applied, .. } => applied.status,
        }
    }

    pub fn restrictions(&self) -> &[String] {
        match self {
            DecisionSource::Computed { decision } => &decision.restrictions,
            DecisionSource::Overridden { applied, .. } => &applied.restrictions,
        }
    }

    pub fn comments(&self) -> &str {
        match self {
            DecisionSource::Computed { decision } => &decision.recommendations,
            DecisionSource::Overridden { applied, .. } => &applied.comments,
        }
    }

    fn declaration(&self) -> CertificateDeclaration {
        CertificateDeclaration {
            status: Some(self.status()),
            restrictions: self.restrictions().to_vec(),
            comments: self.comments().to_string(),
        }
    }

    fn audit_line(&self) -> Option<String> {
        let DecisionSource::Overridden { computed, applied } = self else {
            return None;
        };
        if computed.status == applied.status {
            return None;
        }
        let mut line = format!(
            "Practitioner override changed status from {} to {}",
            computed.status.as_str(),
            applied.status.as_str()
        );
        if let Some(reason) = applied.reason.as_deref().map(str::trim) {
            if !reason.is_empty() {
                line.push_str(": ");
                line.push_str(reason);
            }
        }
        Some(line)
    }
}

/// Successful review: the frozen certificate, its document and the audit trail.
#[derive(Debug, Clone)]
pub struct CertificateReview {
    pub certificate: FinalizedCertificate,
    pub document: RenderedDocument,
    pub decision: DecisionSource,
    pub validation: ValidationResult,
    pub warnings: Vec<String>,
}

/// Flat result shape returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateGenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<FinalizedCertificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<RenderedDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_assessment: Option<DecisionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CertificateGenerationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            certificate: None,
            document: None,
            fitness_assessment: None,
            validation: None,
            warnings: Vec::new(),
            errors: vec![message.into()],
        }
    }
}

impl From<Result<CertificateReview, ReviewError>> for CertificateGenerationResult {
    fn from(outcome: Result<CertificateReview, ReviewError>) -> Self {
        match outcome {
            Ok(review) => Self {
                success: true,
                certificate: Some(review.certificate),
                document: Some(review.document),
                fitness_assessment: Some(review.decision),
                validation: Some(review.validation),
                warnings: review.warnings,
                errors: Vec::new(),
            },
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Patient data not found")]
    PatientNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

/// Runs validation, assessment, override and certificate assembly for one patient.
pub struct CertificateReviewService<S, D> {
    store: Arc<S>,
    assembler: Arc<CertificateAssembler<D>>,
    engine: Arc<FitnessAssessmentEngine>,
    validator: ValidationEngine,
}

impl<S, D> CertificateReviewService<S, D>
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    pub fn new(store: Arc<S>, assembler: CertificateAssembler<D>, config: AssessmentConfig) -> Self {
        Self {
            store,
            assembler: Arc::new(assembler),
            engine: Arc::new(FitnessAssessmentEngine::new(config)),
            validator: ValidationEngine::new(),
        }
    }

    pub fn validate(
        &self,
        record: &IntakeRecord,
        examination_type: ExaminationType,
    ) -> ValidationResult {
        self.validator.validate(record, examination_type)
    }

    pub fn assess(&self, criteria: &FitnessAssessmentCriteria) -> FitnessDecision {
        self.engine.assess(criteria)
    }

    /// Review a patient's examination and issue the certificate.
    pub fn review(
        &self,
        patient_id: &PatientId,
        practitioner: &PractitionerIdentity,
        practitioner_override: Option<PractitionerOverride>,
    ) -> Result<CertificateReview, ReviewError> {
        info!(patient_id = %patient_id.0, "certificate review requested");

        let patient = self
            .store
            .patient(patient_id)?
            .ok_or(ReviewError::PatientNotFound)?;
        let questionnaire = self.store.questionnaire(patient_id)?;
        let readings = self.store.vitals(patient_id)?;
        let results = self.store.tests(patient_id)?;

        let vitals = VitalSigns::latest(&readings);
        let tests = LatestTests::from_results(&results);

        let validation = self.validator.validate(
            &IntakeRecord::for_patient(&patient, questionnaire.clone().unwrap_or_default()),
            patient.examination_type,
        );
        debug!(
            patient_id = %patient_id.0,
            completion = validation.completion_percentage,
            requires_review = validation.requires_review,
            "intake validated"
        );

        let criteria = FitnessAssessmentCriteria::from_records(
            &patient,
            questionnaire.as_ref(),
            vitals,
            &tests,
        );
        let computed = self.engine.assess(&criteria);
        info!(
            patient_id = %patient_id.0,
            status = computed.status.as_str(),
            urgent_flags = computed.urgent_flags.len(),
            "fitness assessed"
        );

        let decision = match practitioner_override {
            Some(applied) => {
                info!(
                    patient_id = %patient_id.0,
                    computed = computed.status.as_str(),
                    applied = applied.status.as_str(),
                    "practitioner override applied"
                );
                DecisionSource::Overridden { computed, applied }
            }
            None => DecisionSource::Computed { decision: computed },
        };

        let source = CertificateSource {
            patient: &patient,
            questionnaire: questionnaire.as_ref(),
            vitals,
            tests: &tests,
        };
        let data = self
            .assembler
            .map(practitioner, source, decision.declaration());
        let issued = self.assembler.issue(data).map_err(|err| {
            warn!(patient_id = %patient_id.0, error = %err, "certificate not issued");
            err
        })?;

        let warnings = review_warnings(vitals, &tests, &decision);

        Ok(CertificateReview {
            certificate: issued.certificate,
            document: issued.document,
            decision,
            validation,
            warnings,
        })
    }

    /// Same as [`review`](Self::review), folded into the flat result shape.
    pub fn generate_certificate(
        &self,
        patient_id: &PatientId,
        practitioner: &PractitionerIdentity,
        practitioner_override: Option<PractitionerOverride>,
    ) -> CertificateGenerationResult {
        let outcome = self.review(patient_id, practitioner, practitioner_override);
        if let Err(err) = &outcome {
            warn!(patient_id = %patient_id.0, error = %err, "certificate generation failed");
        }
        CertificateGenerationResult::from(outcome)
    }
}

fn review_warnings(
    vitals: Option<&VitalSigns>,
    tests: &LatestTests,
    decision: &DecisionSource,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if tests.vision.is_none() {
        warnings.push("Vision test not completed".to_string());
    }
    if tests.hearing.is_none() {
        warnings.push("Hearing test not completed".to_string());
    }
    if tests.drug_screen.is_none() {
        warnings.push("Drug screen not completed".to_string());
    }
    if vitals.is_none() {
        warnings.push("Vital signs not recorded".to_string());
    }
    warnings.extend(decision.computed().urgent_flags.iter().cloned());
    warnings.extend(decision.audit_line());
    warnings
}

mod config;
mod criteria;
mod recommendations;
mod rules;

pub use config::{AssessmentConfig, CriticalFindingMode};
pub use criteria::{
    snellen_denominator, DrugScreenStatus, FitnessAssessmentCriteria, HearingCriteria,
    HeightsCriteria, LungFunctionCriteria, MedicalHistoryCriteria, VisionCriteria,
    VitalsCriteria,
};

pub(crate) use rules::BloodPressureBand;

use serde::{Deserialize, Serialize};

use rules::Evaluation;

/// Fitness tiers, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessStatus {
    Fit,
    FitWithRestriction,
    FitWithCondition,
    TemporaryUnfit,
    Unfit,
}

impl FitnessStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Fit,
            Self::FitWithRestriction,
            Self::FitWithCondition,
            Self::TemporaryUnfit,
            Self::Unfit,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::FitWithRestriction => "fit-with-restriction",
            Self::FitWithCondition => "fit-with-condition",
            Self::TemporaryUnfit => "temporary-unfit",
            Self::Unfit => "unfit",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::FitWithRestriction => "Fit with Restriction",
            Self::FitWithCondition => "Fit with Condition",
            Self::TemporaryUnfit => "Temporary Unfit",
            Self::Unfit => "Unfit",
        }
    }

    /// Months until the next examination is due.
    pub const fn follow_up_months(self) -> u32 {
        match self {
            Self::Fit => 12,
            Self::FitWithRestriction => 6,
            Self::FitWithCondition | Self::TemporaryUnfit | Self::Unfit => 3,
        }
    }
}

/// Output of a single assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessDecision {
    pub status: FitnessStatus,
    pub restrictions: Vec<String>,
    pub recommendations: String,
    pub reasoning: Vec<String>,
    pub urgent_flags: Vec<String>,
}

/// Stateless rule engine mapping normalized criteria to a fitness decision.
#[derive(Debug, Clone, Default)]
pub struct FitnessAssessmentEngine {
    config: AssessmentConfig,
}

impl FitnessAssessmentEngine {
    pub fn new(config: AssessmentConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, criteria: &FitnessAssessmentCriteria) -> FitnessDecision {
        let mut evaluation = Evaluation::new();

        rules::apply_critical(&mut evaluation, criteria, self.config.critical_findings);
        if !evaluation.is_unfit() {
            rules::apply_urgent(
                &mut evaluation,
                criteria,
                self.config.extended_urgent_checks,
            );
            rules::apply_major(&mut evaluation, criteria);
            rules::apply_minor(&mut evaluation, criteria);
        }
        rules::apply_heights(&mut evaluation, criteria);
        rules::resolve(&mut evaluation);

        let recommendations = recommendations::compose(evaluation.status, criteria);

        FitnessDecision {
            status: evaluation.status,
            restrictions: evaluation.restrictions,
            recommendations,
            reasoning: evaluation.reasoning,
            urgent_flags: evaluation.urgent_flags,
        }
    }
}

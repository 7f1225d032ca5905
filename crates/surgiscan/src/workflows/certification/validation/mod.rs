//! Section-by-section completeness and validity scoring for intake records.
//!
//! Validation never fails: missing sections are reported as incomplete, blocking
//! problems land in `critical_issues` and advisory findings in `warnings`.

mod debounce;
mod sections;

pub use debounce::{ValidationDebouncer, ValidationTicket};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ExaminationType, IntakeRecord, IntakeSection};
use sections::SectionReport;

/// Points contributed by each all-or-nothing completion bucket.
const BUCKET_POINTS: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Complete,
    Incomplete,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub section_status: BTreeMap<IntakeSection, SectionStatus>,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub urgent_issues: Vec<String>,
    pub completion_percentage: u8,
    pub requires_review: bool,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.critical_issues.is_empty() && self.completion_percentage == 100
    }

    /// Progress flags suitable for storing back on the questionnaire.
    pub fn section_progress(&self) -> BTreeMap<IntakeSection, bool> {
        self.section_status
            .iter()
            .map(|(section, status)| (*section, *status != SectionStatus::Incomplete))
            .collect()
    }

    fn absorb(&mut self, section: IntakeSection, report: SectionReport) -> bool {
        let status = report.status();
        self.section_status.insert(section, status);
        self.critical_issues.extend(report.critical_issues);
        self.warnings.extend(report.warnings);
        self.urgent_issues.extend(report.urgent_issues);
        self.requires_review |= report.requires_review;
        status != SectionStatus::Incomplete
    }
}

/// Stateless validator; every call reads only the record it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        record: &IntakeRecord,
        examination_type: ExaminationType,
    ) -> ValidationResult {
        let questionnaire = &record.questionnaire;
        let mut result = ValidationResult {
            section_status: BTreeMap::new(),
            critical_issues: Vec::new(),
            warnings: Vec::new(),
            urgent_issues: Vec::new(),
            completion_percentage: 0,
            requires_review: false,
        };

        let mut buckets = 0u8;

        let demographics =
            sections::demographics(record.demographics.as_ref(), record.employment.as_ref());
        if result.absorb(IntakeSection::Demographics, demographics) {
            buckets += 1;
        }

        let history =
            sections::medical_history(questionnaire.medical_history.as_ref(), examination_type);
        if result.absorb(IntakeSection::MedicalHistory, history) {
            buckets += 1;
        }

        match sections::type_specific(questionnaire, examination_type) {
            Some((section, report)) => {
                if result.absorb(section, report) {
                    buckets += 1;
                }
            }
            None => buckets += 1,
        }

        let declarations = sections::declarations(questionnaire.declarations.as_ref());
        if result.absorb(IntakeSection::Declarations, declarations) {
            buckets += 1;
        }

        if let Some(report) = sections::respiratory(questionnaire.respiratory.as_ref()) {
            result.absorb(IntakeSection::Respiratory, report);
        }
        if let Some(report) =
            sections::occupational_exposure(questionnaire.occupational_exposure.as_ref())
        {
            result.absorb(IntakeSection::OccupationalExposure, report);
        }

        result.completion_percentage = buckets * BUCKET_POINTS;
        result
    }
}

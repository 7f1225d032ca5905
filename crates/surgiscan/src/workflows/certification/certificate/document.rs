//! Fixed-layout certificate document and the renderers that turn it into bytes.
//!
//! Block order is part of the document contract: header, title, practitioner
//! line, patient table, examination type row, test results, referral checklist,
//! restrictions, fitness declaration, comments, signature.

use std::fmt::Write as _;

use serde::{Serialize, Serializer};

use super::super::assessment::FitnessStatus;
use super::super::domain::ExaminationType;
use super::data::{FinalizedCertificate, TestResultLine};

pub const CERTIFICATE_TITLE: &str = "CERTIFICATE OF FITNESS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
}

impl Checkbox {
    fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum DocumentBlock {
    Header {
        company_name: String,
        address: String,
        phone: String,
        email: String,
    },
    Title {
        text: String,
    },
    PractitionerLine {
        text: String,
    },
    PatientTable {
        rows: Vec<(String, String)>,
    },
    CheckboxRow {
        heading: String,
        options: Vec<Checkbox>,
    },
    TestResults {
        rows: Vec<TestResultLine>,
    },
    Checklist {
        heading: String,
        items: Vec<Checkbox>,
    },
    Paragraph {
        heading: String,
        text: String,
    },
    Signature {
        practitioner_name: String,
        practice_number: String,
        qualification: Option<String>,
        signed_on: String,
        stamp: Option<String>,
    },
}

/// Layout of a finalized certificate, independent of the output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateDocument {
    blocks: Vec<DocumentBlock>,
}

impl CertificateDocument {
    pub fn from_certificate(certificate: &FinalizedCertificate) -> Self {
        let data = certificate.data();
        let patient = &data.patient;
        let date = |value: chrono::NaiveDate| value.format("%Y-%m-%d").to_string();

        let practitioner_line = match &data.practitioner.qualification {
            Some(qualification) => format!(
                "Examined by {} ({}), practice number {}",
                data.practitioner.name, qualification, data.practitioner.practice_number
            ),
            None => format!(
                "Examined by {}, practice number {}",
                data.practitioner.name, data.practitioner.practice_number
            ),
        };

        let mut patient_rows = vec![
            ("Initials".to_string(), patient.initials.clone()),
            ("Surname".to_string(), patient.surname.clone()),
            ("ID Number".to_string(), patient.id_number.clone()),
            ("Company".to_string(), patient.company_name.clone()),
            ("Job Title".to_string(), patient.job_title.clone()),
            ("Examination Date".to_string(), date(patient.examination_date)),
            ("Expiry Date".to_string(), date(patient.expiry_date)),
        ];
        if let Some(review) = data.review_date {
            patient_rows.push(("Review Date".to_string(), date(review)));
        }

        let restrictions = if data.restrictions.is_empty() {
            "None".to_string()
        } else {
            data.restrictions.join("; ")
        };

        let blocks = vec![
            DocumentBlock::Header {
                company_name: data.company.name.clone(),
                address: data.company.address.clone(),
                phone: data.company.phone.clone(),
                email: data.company.email.clone(),
            },
            DocumentBlock::Title {
                text: CERTIFICATE_TITLE.to_string(),
            },
            DocumentBlock::PractitionerLine {
                text: practitioner_line,
            },
            DocumentBlock::PatientTable { rows: patient_rows },
            DocumentBlock::CheckboxRow {
                heading: "Examination Type".to_string(),
                options: ExaminationType::ordered()
                    .into_iter()
                    .map(|kind| Checkbox::new(kind.label(), kind == patient.examination_type))
                    .collect(),
            },
            DocumentBlock::TestResults {
                rows: data.tests.clone(),
            },
            DocumentBlock::Checklist {
                heading: "Referral Actions".to_string(),
                items: data
                    .referral_actions
                    .entries()
                    .into_iter()
                    .map(|(label, checked)| Checkbox::new(label, checked))
                    .collect(),
            },
            DocumentBlock::Paragraph {
                heading: "Restrictions".to_string(),
                text: restrictions,
            },
            DocumentBlock::CheckboxRow {
                heading: "Medical Fitness Declaration".to_string(),
                options: FitnessStatus::ordered()
                    .into_iter()
                    .map(|status| Checkbox::new(status.label(), status == certificate.status()))
                    .collect(),
            },
            DocumentBlock::Paragraph {
                heading: "Comments".to_string(),
                text: data.comments.clone(),
            },
            DocumentBlock::Signature {
                practitioner_name: data.signature.practitioner_name.clone(),
                practice_number: data.signature.practice_number.clone(),
                qualification: data.signature.qualification.clone(),
                signed_on: date(data.signature.signed_on),
                stamp: data.signature.stamp.clone(),
            },
        ];

        Self { blocks }
    }

    pub fn blocks(&self) -> &[DocumentBlock] {
        &self.blocks
    }
}

/// Rendered output handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub content_type: String,
    #[serde(rename = "body", serialize_with = "serialize_body")]
    pub bytes: Vec<u8>,
}

fn serialize_body<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("failed to encode certificate document: {0}")]
    Encoding(String),
    #[error("document backend failed: {0}")]
    Backend(String),
}

/// Output backend for certificate documents.
pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self, document: &CertificateDocument) -> Result<RenderedDocument, RenderError>;
}

/// Deterministic plain-text layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

fn checkbox(item: &Checkbox) -> String {
    let mark = if item.checked { 'x' } else { ' ' };
    format!("[{mark}] {}", item.label)
}

impl PlainTextRenderer {
    fn write_block(out: &mut String, block: &DocumentBlock) -> std::fmt::Result {
        match block {
            DocumentBlock::Header {
                company_name,
                address,
                phone,
                email,
            } => {
                writeln!(out, "{company_name}")?;
                writeln!(out, "{address}")?;
                writeln!(out, "Tel: {phone} | Email: {email}")?;
            }
            DocumentBlock::Title { text } => {
                writeln!(out)?;
                writeln!(out, "{text}")?;
                writeln!(out, "{}", "=".repeat(text.len()))?;
            }
            DocumentBlock::PractitionerLine { text } => writeln!(out, "{text}")?,
            DocumentBlock::PatientTable { rows } => {
                writeln!(out)?;
                for (label, value) in rows {
                    writeln!(out, "{label:<18}{value}")?;
                }
            }
            DocumentBlock::CheckboxRow { heading, options } => {
                writeln!(out)?;
                writeln!(out, "{heading}:")?;
                let row: Vec<String> = options.iter().map(checkbox).collect();
                writeln!(out, "  {}", row.join("  "))?;
            }
            DocumentBlock::TestResults { rows } => {
                writeln!(out)?;
                writeln!(out, "{:<16}{:<6}{}", "Test", "Done", "Result")?;
                for line in rows {
                    let done = if line.done { "Yes" } else { "No" };
                    writeln!(out, "{:<16}{:<6}{}", line.test.label(), done, line.result)?;
                }
            }
            DocumentBlock::Checklist { heading, items } => {
                writeln!(out)?;
                writeln!(out, "{heading}:")?;
                for item in items {
                    writeln!(out, "  {}", checkbox(item))?;
                }
            }
            DocumentBlock::Paragraph { heading, text } => {
                writeln!(out)?;
                writeln!(out, "{heading}:")?;
                let text = if text.trim().is_empty() { "-" } else { text.as_str() };
                writeln!(out, "  {text}")?;
            }
            DocumentBlock::Signature {
                practitioner_name,
                practice_number,
                qualification,
                signed_on,
                stamp,
            } => {
                writeln!(out)?;
                writeln!(out, "Signed: {practitioner_name}")?;
                if let Some(qualification) = qualification {
                    writeln!(out, "Qualification: {qualification}")?;
                }
                writeln!(out, "Practice Number: {practice_number}")?;
                writeln!(out, "Date: {signed_on}")?;
                if let Some(stamp) = stamp {
                    writeln!(out, "Stamp: {stamp}")?;
                }
            }
        }
        Ok(())
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, document: &CertificateDocument) -> Result<RenderedDocument, RenderError> {
        let mut out = String::new();
        for block in document.blocks() {
            Self::write_block(&mut out, block)
                .map_err(|err| RenderError::Encoding(err.to_string()))?;
        }
        Ok(RenderedDocument {
            content_type: self.content_type().to_string(),
            bytes: out.into_bytes(),
        })
    }
}

/// Structured layout for downstream document backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, document: &CertificateDocument) -> Result<RenderedDocument, RenderError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|err| RenderError::Encoding(err.to_string()))?;
        Ok(RenderedDocument {
            content_type: self.content_type().to_string(),
            bytes,
        })
    }
}

use crate::infra::{demo_practitioner, parse_date, ExaminationBundle, InMemoryExaminationStore};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use surgiscan::config::AppConfig;
use surgiscan::error::AppError;
use surgiscan::workflows::certification::{
    AssessmentConfig, CertificateAssembler, CertificateReview, CertificateReviewService,
    CriticalFindingMode, DocumentRenderer, ExaminationStore, FitnessStatus, IntakeRecord,
    JsonRenderer, PatientId, PlainTextRenderer, ReviewError, SaIdNumber, ValidationDebouncer,
    ValidationResult,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Examination date for the cohort (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Record every critical finding instead of stopping at the first.
    #[arg(long)]
    pub(crate) collect_all: bool,
    /// Also treat abnormal pulse, fever and inconclusive drug screens as urgent.
    #[arg(long)]
    pub(crate) extended_urgent_checks: bool,
    /// Print each rendered certificate after its summary.
    #[arg(long)]
    pub(crate) show_documents: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum DocumentFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct CertificateArgs {
    /// Demo patient to certify (demo-001 .. demo-004)
    #[arg(long, default_value = "demo-001")]
    pub(crate) patient: String,
    /// Examination date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Output format of the rendered certificate
    #[arg(long, value_enum, default_value_t = DocumentFormat::Text)]
    pub(crate) format: DocumentFormat,
}

pub(crate) fn run_certificate(args: CertificateArgs) -> Result<(), AppError> {
    let CertificateArgs {
        patient,
        date,
        format,
    } = args;

    let config = AppConfig::load()?;
    let examined_on = date.unwrap_or_else(|| Local::now().date_naive());
    let store = InMemoryExaminationStore::seeded(examined_on).map_err(ReviewError::from)?;
    let patient_id = PatientId(patient);

    let review = match format {
        DocumentFormat::Text => review_with(
            &store,
            CertificateAssembler::new(config.practice, PlainTextRenderer),
            config.assessment,
            &patient_id,
        )?,
        DocumentFormat::Json => review_with(
            &store,
            CertificateAssembler::new(config.practice, JsonRenderer),
            config.assessment,
            &patient_id,
        )?,
    };

    println!("{}", String::from_utf8_lossy(&review.document.bytes));
    for warning in &review.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn review_with<D>(
    store: &InMemoryExaminationStore,
    assembler: CertificateAssembler<D>,
    assessment: AssessmentConfig,
    patient_id: &PatientId,
) -> Result<CertificateReview, ReviewError>
where
    D: DocumentRenderer + 'static,
{
    let service = CertificateReviewService::new(Arc::new(store.clone()), assembler, assessment);
    service.review(patient_id, &demo_practitioner(), None)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        collect_all,
        extended_urgent_checks,
        show_documents,
    } = args;

    let config = AppConfig::load()?;
    let examined_on = date.unwrap_or_else(|| Local::now().date_naive());
    let mut assessment = config.assessment;
    if collect_all {
        assessment.critical_findings = CriticalFindingMode::CollectAll;
    }
    if extended_urgent_checks {
        assessment.extended_urgent_checks = true;
    }

    let store = InMemoryExaminationStore::seeded(examined_on).map_err(ReviewError::from)?;
    let service = CertificateReviewService::new(
        Arc::new(store.clone()),
        CertificateAssembler::new(config.practice.clone(), PlainTextRenderer),
        assessment,
    );
    let practitioner = demo_practitioner();

    println!("Fitness-for-duty demo: {}", config.practice.name);
    println!(
        "Examination date {} | critical findings: {:?} | validation quiet period {} ms",
        examined_on,
        assessment.critical_findings,
        config.validation.debounce.as_millis()
    );

    let mut outcomes: BTreeMap<FitnessStatus, usize> = BTreeMap::new();
    let patient_ids = store.patient_ids().map_err(ReviewError::from)?;

    for patient_id in &patient_ids {
        let Some(bundle) = store.bundle(patient_id).map_err(ReviewError::from)? else {
            continue;
        };
        let name = bundle.patient.demographics.full_name();
        println!(
            "\n{} | {} | {}",
            patient_id.0,
            name,
            bundle.patient.examination_type.label()
        );
        if let Ok(id) = SaIdNumber::parse(&bundle.patient.demographics.id_number, examined_on) {
            println!(
                "  identity: born {} | age {} | {:?} | {:?}",
                id.date_of_birth(),
                id.age_on(examined_on),
                id.gender(),
                id.citizenship()
            );
        }

        let intake = simulate_intake(&service, &bundle, config.validation.debounce);
        print_intake(&intake);

        match service.review(patient_id, &practitioner, None) {
            Ok(review) => {
                *outcomes.entry(review.certificate.status()).or_default() += 1;
                print_review(&review);
                if show_documents {
                    println!("{}", String::from_utf8_lossy(&review.document.bytes));
                }
            }
            Err(err) => println!("  certificate not issued: {err}"),
        }
    }

    println!("\nCohort outcome");
    for status in FitnessStatus::ordered() {
        let count = outcomes.get(&status).copied().unwrap_or(0);
        if count > 0 {
            println!("- {}: {}", status.label(), count);
        }
    }

    Ok(())
}

/// Replays reception editing: a partial record, then the full one. Only the
/// validation for the final edit is kept.
fn simulate_intake<S, D>(
    service: &CertificateReviewService<S, D>,
    bundle: &ExaminationBundle,
    quiet_period: Duration,
) -> Option<ValidationResult>
where
    S: ExaminationStore + 'static,
    D: DocumentRenderer + 'static,
{
    let examination_type = bundle.patient.examination_type;
    let full = IntakeRecord::for_patient(
        &bundle.patient,
        bundle.questionnaire.clone().unwrap_or_default(),
    );
    let partial = IntakeRecord {
        questionnaire: Default::default(),
        ..full.clone()
    };

    let mut debouncer = ValidationDebouncer::new(quiet_period);
    let started = Instant::now();
    let stale = debouncer.record_edit(started);
    let current = debouncer.record_edit(started + quiet_period / 2);

    let settled = started + quiet_period / 2 + quiet_period;
    if debouncer.is_due(settled) {
        debouncer.accept(stale, service.validate(&partial, examination_type));
        debouncer.accept(current, service.validate(&full, examination_type));
    }
    debouncer.latest().cloned()
}

fn print_intake(intake: &Option<ValidationResult>) {
    let Some(result) = intake else {
        println!("  intake: validation pending");
        return;
    };
    println!(
        "  intake: {}% complete | {} blocking | {} warnings | {} urgent{}",
        result.completion_percentage,
        result.critical_issues.len(),
        result.warnings.len(),
        result.urgent_issues.len(),
        if result.requires_review {
            " | review required"
        } else {
            ""
        }
    );
    for issue in &result.critical_issues {
        println!("    ! {issue}");
    }
}

fn print_review(review: &CertificateReview) {
    let computed = review.decision.computed();
    println!("  status: {}", review.certificate.status().label());
    for reason in &computed.reasoning {
        println!("    - {reason}");
    }
    if !review.certificate.restrictions().is_empty() {
        println!("  restrictions: {}", review.certificate.restrictions().join("; "));
    }
    if let Some(review_date) = review.certificate.data().review_date {
        println!("  next review: {review_date}");
    }
    for warning in &review.warnings {
        println!("  warning: {warning}");
    }
}

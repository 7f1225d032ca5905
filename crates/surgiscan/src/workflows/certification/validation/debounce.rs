use std::time::{Duration, Instant};

use super::ValidationResult;

/// Generation stamp handed out for each edit; results carrying an older stamp are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationTicket(u64);

/// Caller-owned debounce state for re-validating a record while it is edited.
///
/// Each edit bumps the generation. Validation is due once the quiet period has
/// passed since the last edit, and only the result for the newest generation is
/// kept; anything older is discarded.
#[derive(Debug, Clone)]
pub struct ValidationDebouncer {
    quiet_period: Duration,
    generation: u64,
    last_edit: Option<Instant>,
    latest: Option<(ValidationTicket, ValidationResult)>,
}

impl ValidationDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            generation: 0,
            last_edit: None,
            latest: None,
        }
    }

    pub fn record_edit(&mut self, at: Instant) -> ValidationTicket {
        self.generation += 1;
        self.last_edit = Some(at);
        ValidationTicket(self.generation)
    }

    pub fn current_ticket(&self) -> ValidationTicket {
        ValidationTicket(self.generation)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_edit
            .map(|edited| now.saturating_duration_since(edited) >= self.quiet_period)
            .unwrap_or(false)
    }

    /// Stores `result` if `ticket` is still current. Returns whether it was kept.
    pub fn accept(&mut self, ticket: ValidationTicket, result: ValidationResult) -> bool {
        if ticket != self.current_ticket() {
            return false;
        }
        self.last_edit = None;
        self.latest = Some((ticket, result));
        true
    }

    pub fn latest(&self) -> Option<&ValidationResult> {
        self.latest.as_ref().map(|(_, result)| result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::certification::domain::{ExaminationType, IntakeRecord};
    use crate::workflows::certification::validation::ValidationEngine;

    fn result() -> ValidationResult {
        ValidationEngine::new().validate(&IntakeRecord::default(), ExaminationType::Exit)
    }

    #[test]
    fn validation_is_due_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = ValidationDebouncer::new(Duration::from_millis(400));
        assert!(!debouncer.is_due(start));

        debouncer.record_edit(start);
        assert!(!debouncer.is_due(start + Duration::from_millis(100)));
        assert!(debouncer.is_due(start + Duration::from_millis(400)));
    }

    #[test]
    fn superseded_results_are_dropped() {
        let start = Instant::now();
        let mut debouncer = ValidationDebouncer::new(Duration::from_millis(400));

        let stale = debouncer.record_edit(start);
        let fresh = debouncer.record_edit(start + Duration::from_millis(50));

        assert!(!debouncer.accept(stale, result()));
        assert!(debouncer.latest().is_none());

        assert!(debouncer.accept(fresh, result()));
        assert_eq!(debouncer.latest(), Some(&result()));
        assert!(!debouncer.is_due(start + Duration::from_secs(5)));
    }
}

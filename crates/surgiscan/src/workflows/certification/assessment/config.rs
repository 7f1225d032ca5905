use serde::{Deserialize, Serialize};

/// How many simultaneously-true critical disqualifiers are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalFindingMode {
    /// Stop at the first disqualifier in rule order.
    #[default]
    FirstMatch,
    /// Record every disqualifier; the status is `unfit` either way.
    CollectAll,
}

impl CriticalFindingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_match" | "first-match" | "first" => Some(Self::FirstMatch),
            "collect_all" | "collect-all" | "all" => Some(Self::CollectAll),
            _ => None,
        }
    }
}

/// Tunables for the fitness assessment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentConfig {
    pub critical_findings: CriticalFindingMode,
    /// Also raise urgent flags for abnormal pulse, fever and an inconclusive
    /// drug screen. Off unless a practice opts in.
    #[serde(default)]
    pub extended_urgent_checks: bool,
}

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::certification::{AssessmentConfig, CompanyIdentity, CriticalFindingMode};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub assessment: AssessmentConfig,
    pub validation: ValidationConfig,
    pub practice: CompanyIdentity,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let critical_raw = var_or("APP_CRITICAL_FINDINGS", "first_match");
        let critical_findings = CriticalFindingMode::parse(&critical_raw)
            .ok_or(ConfigError::InvalidCriticalFindings { value: critical_raw })?;

        let extended_raw = var_or("APP_EXTENDED_URGENT_CHECKS", "false");
        let extended_urgent_checks = parse_flag(&extended_raw)
            .ok_or(ConfigError::InvalidFlag {
                key: "APP_EXTENDED_URGENT_CHECKS",
                value: extended_raw,
            })?;

        let debounce_ms = var_or("APP_VALIDATION_DEBOUNCE_MS", "400")
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidDebounce)?;

        let practice = CompanyIdentity {
            name: var_or("APP_PRACTICE_NAME", "Occupational Health Clinic"),
            address: var_or("APP_PRACTICE_ADDRESS", ""),
            phone: var_or("APP_PRACTICE_PHONE", ""),
            email: var_or("APP_PRACTICE_EMAIL", ""),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentConfig {
                critical_findings,
                extended_urgent_checks,
            },
            validation: ValidationConfig {
                debounce: Duration::from_millis(debounce_ms),
            },
            practice,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Quiet period applied by intake forms before re-validating an edited record.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    pub debounce: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCriticalFindings { value: String },
    InvalidFlag { key: &'static str, value: String },
    InvalidDebounce,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCriticalFindings { value } => write!(
                f,
                "APP_CRITICAL_FINDINGS must be first_match or collect_all (found '{value}')"
            ),
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false (found '{value}')")
            }
            ConfigError::InvalidDebounce => {
                write!(f, "APP_VALIDATION_DEBOUNCE_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCriticalFindings { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidDebounce => None,
        }
    }
}

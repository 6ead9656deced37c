//! Tracing bootstrap for the feedback service. Filter directives come from
//! `RUST_LOG` when set, otherwise from `PULSE_LOG_LEVEL` via the loaded
//! config, so operators can tighten filters without a config change.

use std::env;
use std::fmt;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::{AppEnvironment, TelemetryConfig};

const FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    AlreadyInstalled,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "log filter '{directives}' does not parse")
            }
            TelemetryError::AlreadyInstalled => {
                write!(f, "a global tracing subscriber is already installed")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled => None,
        }
    }
}

fn resolve_directives(config: &TelemetryConfig) -> String {
    env::var(FILTER_ENV).unwrap_or_else(|_| config.log_level.clone())
}

fn build_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::Filter {
        directives: directives.to_string(),
        source,
    })
}

/// Install the global tracing subscriber. ANSI color stays off outside of
/// development so aggregated logs remain grep-friendly.
pub fn init(
    config: &TelemetryConfig,
    environment: AppEnvironment,
) -> Result<(), TelemetryError> {
    let filter = build_filter(&resolve_directives(config))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(environment == AppEnvironment::Development)
        .compact()
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInstalled)
}

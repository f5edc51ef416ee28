//! Tracer setup and management

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global tracer provider holder
static TRACER_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {filter:?}: {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Settings for `init_telemetry`
#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    pub service_name: String,
    /// Default filter directive, overridden by `RUST_LOG`
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            service_name: "game-master".to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Initialize structured logging with OpenTelemetry support.
///
/// This sets up:
/// - A tracer provider and the `tracing-opentelemetry` layer
/// - An `EnvFilter` (`RUST_LOG` wins over `options.log_level`)
/// - Pretty or JSON formatted output
///
/// # Example
///
/// ```rust,no_run
/// use gm_telemetry::{TelemetryOptions, init_telemetry};
///
/// init_telemetry(&TelemetryOptions::default()).unwrap();
/// ```
pub fn init_telemetry(options: &TelemetryOptions) -> Result<(), TelemetryError> {
    let filter = build_filter(options)?;

    let tracer_provider = TracerProvider::builder().build();
    let tracer = tracer_provider.tracer(options.service_name.clone());
    let _ = TRACER_PROVIDER.set(tracer_provider);

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(telemetry_layer);

    let result = if options.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_line_number(true),
            )
            .try_init()
    };

    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

fn build_filter(options: &TelemetryOptions) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&options.log_level).map_err(|e| TelemetryError::InvalidFilter {
        filter: options.log_level.clone(),
        message: e.to_string(),
    })
}

/// Flush and shut down the tracer provider, if one was installed
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let options = TelemetryOptions {
            log_level: "gm_core=notalevel".to_string(),
            ..TelemetryOptions::default()
        };
        assert!(matches!(
            build_filter(&options),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_default_options() {
        let options = TelemetryOptions::default();
        assert_eq!(options.log_level, "info");
        assert!(!options.json);
        assert!(build_filter(&options).is_ok());
    }
}

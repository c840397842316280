use thiserror::Error;

/// Errors raised while wiring up the telemetry pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialize telemetry: {0}")]
    InitFailed(String),
}

//! Tracing and OpenTelemetry OTLP export with an explicit lifecycle.
//!
//! Composes a `tracing` subscriber from an env filter, a console layer, and
//! an optional OTLP span-export layer. The tracer provider is kept for
//! explicit `flush()` (best-effort, per response cycle) and `shutdown()`
//! (process exit). When no collector endpoint is configured, or the exporter
//! cannot be built, the service runs console-only; telemetry is never a
//! reason to refuse requests.

mod config;
mod error;
mod telemetry;

pub use config::TelemetryConfig;
pub use error::TelemetryError;
pub use telemetry::{flush, init, shutdown};

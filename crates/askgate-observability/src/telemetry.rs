use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::config::TelemetryConfig;
use crate::error::TelemetryError;

// Kept for flush() and shutdown().
static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Initialize the tracing subscriber and, when a collector endpoint is
/// configured, OTLP span export. A failing exporter downgrades to
/// console-only with a warning; a telemetry problem never stops the service.
pub fn init(config: TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = config
        .log_level
        .as_ref()
        .map(|level| tracing_subscriber::EnvFilter::new(level.as_str()))
        .unwrap_or_else(|| {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        });

    let fmt_layer = config
        .enable_console
        .then_some(tracing_subscriber::fmt::layer());

    let otel_layer = if let Some(endpoint) = &config.otlp_endpoint {
        match build_otlp_tracer_provider(&config.service_name, endpoint) {
            Ok((tracer, provider)) => {
                global::set_tracer_provider(provider.clone());
                let _ = TRACER_PROVIDER.set(provider);
                Some(OpenTelemetryLayer::new(tracer))
            }
            Err(e) => {
                eprintln!(
                    "warning: OTLP export unavailable, continuing console-only: {e}"
                );
                None
            }
        }
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed(e.to_string()))?;

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(
            service.name = %config.service_name,
            otlp.endpoint = %endpoint,
            "telemetry initialized"
        );
    } else {
        tracing::info!(
            service.name = %config.service_name,
            "telemetry initialized (console only, no OTLP endpoint configured)"
        );
    }

    Ok(())
}

fn build_otlp_tracer_provider(
    service_name: &str,
    endpoint: &str,
) -> Result<(opentelemetry_sdk::trace::SdkTracer, SdkTracerProvider), TelemetryError> {
    let resource = Resource::builder()
        .with_attributes(vec![KeyValue::new(
            "service.name",
            service_name.to_string(),
        )])
        .build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.to_string())
        .build()
        .map_err(|e| TelemetryError::InitFailed(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(service_name.to_string());

    Ok((tracer, provider))
}

/// Best-effort export of buffered spans. Called once per response cycle; a
/// flush failure is logged and never propagated to the caller.
pub fn flush() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.force_flush() {
            tracing::debug!(error = %e, "telemetry flush failed");
        }
    }
}

/// Drain the tracer provider during graceful shutdown so buffered spans are
/// exported before exit.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        let _ = provider.shutdown();
        tracing::debug!("telemetry shut down");
    }
}

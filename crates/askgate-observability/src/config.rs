// Telemetry configuration, environment-sourced or built programmatically.

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to exported spans.
    pub service_name: String,

    /// OTLP collector endpoint (e.g., "http://localhost:4317"). When absent
    /// the service logs to the console only.
    pub otlp_endpoint: Option<String>,

    /// Log level filter ("info", "debug", ...). Falls back to `RUST_LOG`
    /// and then "info".
    pub log_level: Option<String>,

    /// Emit formatted logs to the console in addition to OTLP export.
    pub enable_console: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "askgate".to_string(),
            otlp_endpoint: None,
            log_level: None,
            enable_console: true,
        }
    }
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    /// Build from environment variables.
    ///
    /// Reads `OTEL_SERVICE_NAME`, `OTEL_EXPORTER_OTLP_ENDPOINT`, and
    /// `RUST_LOG`. OTLP export is only enabled when the endpoint is
    /// explicitly set.
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "askgate".to_string());
        let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
        let log_level = std::env::var("RUST_LOG").ok();

        Self {
            service_name,
            otlp_endpoint,
            log_level,
            enable_console: true,
        }
    }
}

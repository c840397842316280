use std::sync::Arc;

use clap::Parser;

use askgate_dispatch::Dispatcher;
use askgate_flags::FlagClient;
use askgate_llm::{AnthropicAdapter, OpenAiAdapter, ProviderRegistry};
use askgate_observability::TelemetryConfig;
use askgate_server::{config, routes, state};
use askgate_types::EvaluationContext;

#[derive(Parser)]
#[command(name = "askgate", version, about = "Flag-routed LLM question answering service")]
struct Cli {
    /// Listen port (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Startup order matters: telemetry first, then the flag-service readiness
/// probe (fatal on failure), then provider registration, and only then the
/// request-accepting listener.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let mut telemetry = TelemetryConfig::from_env();
    if cli.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    askgate_observability::init(telemetry)?;

    let mut config = config::Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let context = EvaluationContext::new(config.targeting_key.clone());

    // Fatal when the flag service is unreachable: without it every request
    // would route blind, so the listener must never come up.
    let flags = FlagClient::connect(config.flag_client_config(), &context).await?;

    let registry = build_registry()?;
    tracing::info!(providers = ?registry.ids(), "providers registered");

    let dispatcher = Dispatcher::new(Box::new(flags), registry, context);
    let app_state = state::AppState {
        dispatcher: Arc::new(dispatcher),
    };

    let app = routes::routes().with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!(addr = %config.addr(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    askgate_observability::shutdown();
    Ok(())
}

/// Register every provider whose credentials are present. Serving with a
/// partial set is fine (the flag may never route to the missing one); serving
/// with none is not.
fn build_registry() -> anyhow::Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    match OpenAiAdapter::from_env() {
        Ok(adapter) => registry.register(adapter),
        Err(_) => tracing::warn!("OPENAI_API_KEY not set, openai provider disabled"),
    }

    match AnthropicAdapter::from_env() {
        Ok(adapter) => registry.register(adapter),
        Err(_) => tracing::warn!("ANTHROPIC_API_KEY not set, anthropic provider disabled"),
    }

    if registry.is_empty() {
        anyhow::bail!("no provider API keys configured; set OPENAI_API_KEY and/or ANTHROPIC_API_KEY");
    }

    Ok(registry)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

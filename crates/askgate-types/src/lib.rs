//! Shared types, errors, and failure events for the askgate dispatch layer.
//!
//! This crate provides the foundational types used across all other askgate crates:
//! - `AskError` — unified error taxonomy
//! - `FailureStage` / `FailureEvent` — structured records for the observability sink
//! - `AnswerEnvelope` — the sole successful result of a dispatched question
//! - `EvaluationContext` — the identity passed to the flag-evaluation service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unified error type for all askgate subsystems.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The flag-evaluation service cannot be reached or rejected our credentials.
    /// Fatal at startup; per request it surfaces as a provider-resolution failure.
    #[error("Flag service unavailable: {message}")]
    FlagService { message: String },

    /// The resolved provider identifier matches no registered adapter.
    #[error("No provider adapter registered for '{provider}'")]
    UnknownProvider { provider: String },

    /// Normalized wrapper around any upstream provider failure. The raw upstream
    /// error never crosses the adapter boundary; `message` is synthesized from
    /// the HTTP status class and the upstream error envelope.
    #[error("Provider {provider} failed: {message}")]
    ProviderInvocation {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl AskError {
    /// Maps the error to the pipeline stage it originated from.
    pub fn stage(&self) -> FailureStage {
        match self {
            AskError::FlagService { .. } => FailureStage::FlagEvaluation,
            AskError::UnknownProvider { .. } => FailureStage::UnknownProvider,
            AskError::ProviderInvocation { .. } => FailureStage::ProviderInvocation,
            _ => FailureStage::Internal,
        }
    }
}

/// A convenience alias for `Result<T, AskError>`.
pub type Result<T> = std::result::Result<T, AskError>;

// ---------------------------------------------------------------------------
// FailureStage / FailureEvent
// ---------------------------------------------------------------------------

/// Which stage of the request pipeline a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    FlagEvaluation,
    UnknownProvider,
    ProviderInvocation,
    Internal,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::FlagEvaluation => "flag-evaluation",
            FailureStage::UnknownProvider => "unknown-provider",
            FailureStage::ProviderInvocation => "provider-invocation",
            FailureStage::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured record emitted to the observability sink on every failure path.
/// The stage distinction is preserved here even though the HTTP response
/// collapses all failures into a single 500.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEvent {
    pub stage: FailureStage,
    pub message: String,
}

impl FailureEvent {
    pub fn from_error(err: &AskError) -> Self {
        Self {
            stage: err.stage(),
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnswerEnvelope
// ---------------------------------------------------------------------------

/// The sole successful result of a dispatched question. `provider_id` is the
/// identifier of the adapter that actually produced the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub answer: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
}

// ---------------------------------------------------------------------------
// EvaluationContext
// ---------------------------------------------------------------------------

/// Identity and attributes passed to the flag-evaluation service for targeted
/// flag values. Built once at startup and shared, read-only, across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationContext {
    #[serde(rename = "targetingKey")]
    pub targeting_key: String,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl EvaluationContext {
    pub fn new(targeting_key: impl Into<String>) -> Self {
        Self {
            targeting_key: targeting_key.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

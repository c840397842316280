//! Flag-driven provider dispatch.
//!
//! The `Dispatcher` resolves a provider identifier through the flag
//! evaluator, looks up the matching adapter in the registry, invokes it, and
//! assembles the `AnswerEnvelope`. A provider failure is never redirected to
//! a different provider: the caller is told unambiguously which provider
//! served or failed the request.

use askgate_flags::FlagEvaluator;
use askgate_llm::ProviderRegistry;
use askgate_types::{AnswerEnvelope, AskError, EvaluationContext, FailureEvent};

/// Flag key the provider identifier is read from.
pub const PROVIDER_FLAG_KEY: &str = "llm-flag";

/// Provider used when flag evaluation is inconclusive.
pub const DEFAULT_PROVIDER: &str = "openai";

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    flags: Box<dyn FlagEvaluator>,
    providers: ProviderRegistry,
    context: EvaluationContext,
    flag_key: String,
    default_provider: String,
}

impl Dispatcher {
    pub fn new(
        flags: Box<dyn FlagEvaluator>,
        providers: ProviderRegistry,
        context: EvaluationContext,
    ) -> Self {
        Self {
            flags,
            providers,
            context,
            flag_key: PROVIDER_FLAG_KEY.to_string(),
            default_provider: DEFAULT_PROVIDER.to_string(),
        }
    }

    pub fn with_flag_key(mut self, flag_key: impl Into<String>) -> Self {
        self.flag_key = flag_key.into();
        self
    }

    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    /// Resolve the provider, invoke it, and wrap the answer. Fails with
    /// `UnknownProvider` (before any provider network call) when the
    /// resolved identifier has no registered adapter, or with the adapter's
    /// `ProviderInvocation` error, propagated unchanged.
    pub async fn handle_question(&self, question: &str) -> Result<AnswerEnvelope, AskError> {
        tracing::info!(question_len = question.len(), "question received");

        let provider_id = self
            .flags
            .string_value(&self.flag_key, &self.default_provider, &self.context)
            .await
            .map_err(|e| self.emit_failure(e))?;

        let adapter = match self.providers.get(&provider_id) {
            Some(adapter) => adapter,
            None => {
                return Err(self.emit_failure(AskError::UnknownProvider {
                    provider: provider_id,
                }));
            }
        };

        let answer = adapter
            .generate(question)
            .await
            .map_err(|e| self.emit_failure(e))?;

        tracing::info!(provider = %provider_id, answer_len = answer.len(), "answer produced");
        Ok(AnswerEnvelope {
            answer,
            provider_id,
        })
    }

    /// Emit the structured failure event and hand the error back for
    /// propagation. The stage distinction only survives here; the HTTP
    /// boundary collapses everything into one 500.
    fn emit_failure(&self, err: AskError) -> AskError {
        let event = FailureEvent::from_error(&err);
        tracing::error!(stage = %event.stage, message = %event.message, "request failed");
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

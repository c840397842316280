use async_trait::async_trait;

use askgate_types::{AskError, EvaluationContext};

// ---------------------------------------------------------------------------
// FlagEvaluator
// ---------------------------------------------------------------------------

/// String-valued flag evaluation against a remote flag service.
///
/// Implementations must fall back to `default` when the flag is absent,
/// disabled, or carries no value; only an unreachable or misconfigured
/// evaluation service is an error (`AskError::FlagService`).
#[async_trait]
pub trait FlagEvaluator: Send + Sync {
    async fn string_value(
        &self,
        flag_key: &str,
        default: &str,
        context: &EvaluationContext,
    ) -> Result<String, AskError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticEvaluator {
        value: Option<String>,
    }

    #[async_trait]
    impl FlagEvaluator for StaticEvaluator {
        async fn string_value(
            &self,
            _flag_key: &str,
            default: &str,
            _context: &EvaluationContext,
        ) -> Result<String, AskError> {
            Ok(self.value.clone().unwrap_or_else(|| default.to_string()))
        }
    }

    #[tokio::test]
    async fn evaluator_returns_configured_value() {
        let evaluator = StaticEvaluator {
            value: Some("anthropic".into()),
        };
        let ctx = EvaluationContext::new("user-1");
        let value = evaluator.string_value("llm-flag", "openai", &ctx).await.unwrap();
        assert_eq!(value, "anthropic");
    }

    #[tokio::test]
    async fn evaluator_falls_back_to_default() {
        let evaluator = StaticEvaluator { value: None };
        let ctx = EvaluationContext::new("user-1");
        let value = evaluator.string_value("llm-flag", "openai", &ctx).await.unwrap();
        assert_eq!(value, "openai");
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use async_trait::async_trait;

use crate::FlagEvaluator;
use askgate_types::{AskError, EvaluationContext};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    environment: &'a str,
    context: &'a EvaluationContext,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    flags: HashMap<String, FlagState>,
}

#[derive(Debug, Deserialize)]
struct FlagState {
    enabled: bool,
    #[serde(default)]
    value: Option<String>,
}

// ---------------------------------------------------------------------------
// FlagClientConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FlagClientConfig {
    pub base_url: String,
    pub sdk_key: String,
    pub environment: String,
}

// ---------------------------------------------------------------------------
// FlagClient
// ---------------------------------------------------------------------------

/// Client for the flag service's SDK evaluate endpoint. One instance is
/// shared process-wide; request logic never mutates it.
#[derive(Debug)]
pub struct FlagClient {
    http: reqwest::Client,
    config: FlagClientConfig,
}

impl FlagClient {
    /// Construct a client and verify the flag service is reachable with a
    /// readiness evaluation round trip. A failure here is fatal to startup;
    /// the process must not begin accepting requests without a working flag
    /// service.
    pub async fn connect(
        config: FlagClientConfig,
        context: &EvaluationContext,
    ) -> Result<Self, AskError> {
        let client = Self {
            http: reqwest::Client::new(),
            config,
        };
        client.evaluate(context).await?;
        tracing::info!(
            base_url = %client.config.base_url,
            environment = %client.config.environment,
            "flag service connected"
        );
        Ok(client)
    }

    /// Construct without the readiness probe. Used by tests that exercise
    /// per-request failure handling.
    pub fn new_unchecked(config: FlagClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn evaluate(&self, context: &EvaluationContext) -> Result<EvaluateResponse, AskError> {
        let request = EvaluateRequest {
            environment: &self.config.environment,
            context,
        };

        let resp = self
            .http
            .post(format!("{}/api/sdk/evaluate", self.config.base_url))
            .header("X-SDK-Key", &self.config.sdk_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AskError::FlagService {
                message: format!("flag service unreachable: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AskError::FlagService {
                message: format!("flag service returned HTTP {}", status.as_u16()),
            });
        }

        resp.json::<EvaluateResponse>()
            .await
            .map_err(|e| AskError::FlagService {
                message: format!("flag service returned a malformed response: {e}"),
            })
    }
}

#[async_trait]
impl FlagEvaluator for FlagClient {
    /// Resolve a string flag. Evaluation failures from the service transport
    /// propagate; a flag that is absent, disabled, or valueless resolves to
    /// `default`.
    #[tracing::instrument(skip(self, context), fields(targeting_key = %context.targeting_key))]
    async fn string_value(
        &self,
        flag_key: &str,
        default: &str,
        context: &EvaluationContext,
    ) -> Result<String, AskError> {
        let response = self.evaluate(context).await?;

        let value = match response.flags.get(flag_key) {
            Some(state) if state.enabled => state
                .value
                .clone()
                .unwrap_or_else(|| default.to_string()),
            _ => default.to_string(),
        };

        tracing::debug!(flag_key, value = %value, "flag evaluated");
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: String) -> FlagClientConfig {
        FlagClientConfig {
            base_url,
            sdk_key: "sdk-test-key".into(),
            environment: "production".into(),
        }
    }

    fn context() -> EvaluationContext {
        EvaluationContext::new("user-key-123abc")
    }

    #[test]
    fn evaluate_request_serializes_environment_and_context() {
        let ctx = context();
        let request = EvaluateRequest {
            environment: "production",
            context: &ctx,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["environment"], "production");
        assert_eq!(json["context"]["targetingKey"], "user-key-123abc");
    }

    #[test]
    fn flag_state_deserializes_without_value() {
        let state: FlagState =
            serde_json::from_str(r#"{"enabled": true, "reason": "rollout"}"#).unwrap();
        assert!(state.enabled);
        assert!(state.value.is_none());
    }

    #[tokio::test]
    async fn string_value_returns_flag_value() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sdk/evaluate")
            .match_header("x-sdk-key", "sdk-test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"flags": {"llm-flag": {"enabled": true, "value": "anthropic"}}}"#)
            .create_async()
            .await;

        let client = FlagClient::new_unchecked(config(server.url()));
        let value = client
            .string_value("llm-flag", "openai", &context())
            .await
            .unwrap();

        assert_eq!(value, "anthropic");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn string_value_falls_back_when_flag_missing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(200)
            .with_body(r#"{"flags": {}}"#)
            .create_async()
            .await;

        let client = FlagClient::new_unchecked(config(server.url()));
        let value = client
            .string_value("llm-flag", "openai", &context())
            .await
            .unwrap();

        assert_eq!(value, "openai");
    }

    #[tokio::test]
    async fn string_value_falls_back_when_flag_disabled() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(200)
            .with_body(r#"{"flags": {"llm-flag": {"enabled": false, "value": "anthropic"}}}"#)
            .create_async()
            .await;

        let client = FlagClient::new_unchecked(config(server.url()));
        let value = client
            .string_value("llm-flag", "openai", &context())
            .await
            .unwrap();

        assert_eq!(value, "openai");
    }

    #[tokio::test]
    async fn string_value_falls_back_when_value_null() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(200)
            .with_body(r#"{"flags": {"llm-flag": {"enabled": true, "value": null}}}"#)
            .create_async()
            .await;

        let client = FlagClient::new_unchecked(config(server.url()));
        let value = client
            .string_value("llm-flag", "openai", &context())
            .await
            .unwrap();

        assert_eq!(value, "openai");
    }

    #[tokio::test]
    async fn string_value_rejected_credentials_is_flag_service_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(401)
            .with_body(r#"{"error": "invalid sdk key"}"#)
            .create_async()
            .await;

        let client = FlagClient::new_unchecked(config(server.url()));
        let err = client
            .string_value("llm-flag", "openai", &context())
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::FlagService { .. }));
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[tokio::test]
    async fn connect_succeeds_against_healthy_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(200)
            .with_body(r#"{"flags": {}}"#)
            .create_async()
            .await;

        let result = FlagClient::connect(config(server.url()), &context()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_fails_against_broken_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/sdk/evaluate")
            .with_status(500)
            .create_async()
            .await;

        let err = FlagClient::connect(config(server.url()), &context())
            .await
            .err()
            .expect("connect should fail");
        assert!(matches!(err, AskError::FlagService { .. }));
    }

    #[tokio::test]
    async fn connect_fails_when_unreachable() {
        // Nothing listens on this port.
        let err = FlagClient::connect(config("http://127.0.0.1:9".into()), &context())
            .await
            .err()
            .expect("connect should fail");
        assert!(matches!(err, AskError::FlagService { .. }));
        assert!(err.to_string().contains("unreachable"));
    }
}

use async_trait::async_trait;
use serde_json::json;

use crate::ProviderAdapter;
use askgate_types::AskError;

const PROVIDER_ID: &str = "anthropic";

// ---------------------------------------------------------------------------
// AnthropicAdapter
// ---------------------------------------------------------------------------

/// Single-turn text completion against the Anthropic API using the
/// human/assistant-delimited prompt template. The completion text is returned
/// as-is, without trimming.
#[derive(Debug)]
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens_to_sample: u32,
}

impl AnthropicAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-2.1".to_string(),
            max_tokens_to_sample: 1000,
        }
    }

    pub fn from_env() -> Result<Self, AskError> {
        let key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AskError::Other("ANTHROPIC_API_KEY is not set".into()))?;
        Ok(Self::new(key))
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

// ---------------------------------------------------------------------------
// Request translation
// ---------------------------------------------------------------------------

fn build_request_body(model: &str, max_tokens_to_sample: u32, question: &str) -> serde_json::Value {
    json!({
        "model": model,
        "max_tokens_to_sample": max_tokens_to_sample,
        "prompt": format!("Human: {question}\n\nAssistant:"),
    })
}

fn parse_response(body: &serde_json::Value) -> Result<String, AskError> {
    let completion =
        body["completion"]
            .as_str()
            .ok_or_else(|| AskError::ProviderInvocation {
                provider: PROVIDER_ID.into(),
                status: None,
                message: "response contained no completion text".into(),
            })?;
    // Returned verbatim; only the OpenAI adapter trims.
    Ok(completion.to_string())
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn map_error(status: reqwest::StatusCode, body: &str) -> AskError {
    let status_u16 = status.as_u16();
    let message = match status_u16 {
        401 | 403 => "authentication rejected by the Anthropic API".to_string(),
        429 => "rate limited by the Anthropic API".to_string(),
        _ => extract_error_message(body)
            .unwrap_or_else(|| format!("Anthropic API returned HTTP {status_u16}")),
    };
    AskError::ProviderInvocation {
        provider: PROVIDER_ID.into(),
        status: Some(status_u16),
        message,
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
}

// ---------------------------------------------------------------------------
// ProviderAdapter implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn generate(&self, question: &str) -> Result<String, AskError> {
        let body = build_request_body(&self.model, self.max_tokens_to_sample, question);

        let resp = self
            .client
            .post(format!("{}/v1/complete", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AskError::ProviderInvocation {
                provider: PROVIDER_ID.into(),
                status: None,
                message: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        let response_body = resp.text().await.map_err(|e| AskError::ProviderInvocation {
            provider: PROVIDER_ID.into(),
            status: None,
            message: format!("request failed: {e}"),
        })?;

        if !status.is_success() {
            return Err(map_error(status, &response_body));
        }

        let json: serde_json::Value =
            serde_json::from_str(&response_body).map_err(|e| AskError::ProviderInvocation {
                provider: PROVIDER_ID.into(),
                status: Some(status.as_u16()),
                message: format!("failed to parse response JSON: {e}"),
            })?;

        parse_response(&json)
    }

    fn id(&self) -> &str {
        PROVIDER_ID
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_with_key_returns_ok_and_without_key_returns_err() {
        std::env::set_var("ANTHROPIC_API_KEY", "test-key-12345");
        let result = AnthropicAdapter::from_env();
        assert!(result.is_ok());
        let adapter = result.unwrap();
        assert_eq!(adapter.id(), "anthropic");
        assert_eq!(adapter.model, "claude-2.1");

        std::env::remove_var("ANTHROPIC_API_KEY");
        let result = AnthropicAdapter::from_env();
        assert!(result.is_err());
    }

    #[test]
    fn build_request_body_uses_prompt_template() {
        let body = build_request_body("claude-2.1", 1000, "What is 2+2?");

        assert_eq!(body["model"], "claude-2.1");
        assert_eq!(body["max_tokens_to_sample"], 1000);
        assert_eq!(body["prompt"], "Human: What is 2+2?\n\nAssistant:");
    }

    #[test]
    fn parse_response_returns_completion_untrimmed() {
        let body = json!({ "completion": " The answer is 4." });
        let answer = parse_response(&body).unwrap();
        assert_eq!(answer, " The answer is 4.");
    }

    #[test]
    fn parse_response_without_completion_is_invocation_error() {
        let body = json!({ "stop_reason": "stop_sequence" });
        let err = parse_response(&body).unwrap_err();
        assert!(
            matches!(err, AskError::ProviderInvocation { ref provider, .. } if provider == "anthropic")
        );
    }

    #[test]
    fn error_mapping_401_auth() {
        let err = map_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "invalid x-api-key"}}"#,
        );
        match err {
            AskError::ProviderInvocation {
                status, message, ..
            } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "authentication rejected by the Anthropic API");
            }
            _ => panic!("expected ProviderInvocation"),
        }
    }

    #[test]
    fn error_mapping_529_overloaded_uses_envelope_message() {
        let err = map_error(
            reqwest::StatusCode::from_u16(529).unwrap(),
            r#"{"error": {"message": "overloaded"}}"#,
        );
        match err {
            AskError::ProviderInvocation {
                status, message, ..
            } => {
                assert_eq!(status, Some(529));
                assert_eq!(message, "overloaded");
            }
            _ => panic!("expected ProviderInvocation"),
        }
    }

    #[test]
    fn error_mapping_never_leaks_raw_body() {
        let raw = "upstream stack: panic at src/worker.rs:42";
        let err = map_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, raw);
        let message = err.to_string();
        assert!(!message.contains("panic at"));
        assert!(message.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn generate_round_trip_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/complete")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"completion": " The answer is 4.", "stop_reason": "stop_sequence"}"#)
            .create_async()
            .await;

        let adapter = AnthropicAdapter::new("test-key".into()).with_base_url(server.url());
        let answer = adapter.generate("What is 2+2?").await.unwrap();

        assert_eq!(answer, " The answer is 4.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn generate_maps_upstream_failure_without_leaking_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/complete")
            .with_status(500)
            .with_body("internal worker crash dump: 0xdeadbeef")
            .create_async()
            .await;

        let adapter = AnthropicAdapter::new("test-key".into()).with_base_url(server.url());
        let err = adapter.generate("What is 2+2?").await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Provider anthropic failed"));
        assert!(!message.contains("0xdeadbeef"));
    }
}

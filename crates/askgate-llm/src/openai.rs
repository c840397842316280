use async_trait::async_trait;
use serde_json::json;

use crate::ProviderAdapter;
use askgate_types::AskError;

const PROVIDER_ID: &str = "openai";

// ---------------------------------------------------------------------------
// OpenAiAdapter
// ---------------------------------------------------------------------------

/// Single-turn chat completion against the OpenAI API. The response length is
/// constrained by a token cap and the extracted text is trimmed of
/// surrounding whitespace.
#[derive(Debug)]
pub struct OpenAiAdapter {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 100,
        }
    }

    pub fn from_env() -> Result<Self, AskError> {
        let key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AskError::Other("OPENAI_API_KEY is not set".into()))?;
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

    fn build_request_body(&self, question: &str) -> serde_json::Value {
        json!({
            "messages": [{ "role": "user", "content": question }],
            "model": self.model,
            "max_tokens": self.max_tokens,
        })
    }

    fn parse_response(&self, body: serde_json::Value) -> Result<String, AskError> {
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AskError::ProviderInvocation {
                provider: PROVIDER_ID.into(),
                status: None,
                message: "response contained no completion text".into(),
            })?;
        Ok(content.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn map_error(status: reqwest::StatusCode, body: &str) -> AskError {
    let status_u16 = status.as_u16();
    let message = match status_u16 {
        401 | 403 => "authentication rejected by the OpenAI API".to_string(),
        429 => "rate limited by the OpenAI API".to_string(),
        _ => extract_error_message(body)
            .unwrap_or_else(|| format!("OpenAI API returned HTTP {status_u16}")),
    };
    AskError::ProviderInvocation {
        provider: PROVIDER_ID.into(),
        status: Some(status_u16),
        message,
    }
}

/// Pulls the human-readable message out of OpenAI's error envelope. Anything
/// that is not a well-formed envelope yields `None` so raw upstream bodies
/// never reach the caller.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
}

// ---------------------------------------------------------------------------
// ProviderAdapter implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn generate(&self, question: &str) -> Result<String, AskError> {
        let body = self.build_request_body(question);

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
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

        self.parse_response(json)
    }

    fn id(&self) -> &str {
        PROVIDER_ID
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

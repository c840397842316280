use async_trait::async_trait;

use askgate_types::AskError;

// ---------------------------------------------------------------------------
// ProviderAdapter
// ---------------------------------------------------------------------------

/// Uniform generation contract over a specific LLM vendor API.
///
/// Implementations must catch every upstream failure and return a single
/// normalized `AskError::ProviderInvocation`; the upstream error never
/// crosses this boundary.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn generate(&self, question: &str) -> Result<String, AskError>;
    fn id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// DynProvider
// ---------------------------------------------------------------------------

pub struct DynProvider(Box<dyn ProviderAdapter>);

impl DynProvider {
    pub fn new(provider: impl ProviderAdapter + 'static) -> Self {
        Self(Box::new(provider))
    }

    pub async fn generate(&self, question: &str) -> Result<String, AskError> {
        self.0.generate(question).await
    }

    pub fn id(&self) -> &str {
        self.0.id()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockProvider;

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        async fn generate(&self, question: &str) -> Result<String, AskError> {
            Ok(format!("echo: {question}"))
        }

        fn id(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn dyn_provider_generate() {
        let provider = DynProvider::new(MockProvider);
        let answer = provider.generate("hi").await.unwrap();
        assert_eq!(answer, "echo: hi");
    }

    #[test]
    fn dyn_provider_id() {
        let provider = DynProvider::new(MockProvider);
        assert_eq!(provider.id(), "mock");
    }

    #[tokio::test]
    async fn dyn_provider_in_hashmap() {
        let mut providers: HashMap<String, DynProvider> = HashMap::new();
        providers.insert("mock".into(), DynProvider::new(MockProvider));

        let provider = providers.get("mock").unwrap();
        assert_eq!(provider.id(), "mock");

        let answer = provider.generate("hello").await.unwrap();
        assert_eq!(answer, "echo: hello");
    }
}

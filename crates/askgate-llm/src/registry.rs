use std::collections::HashMap;

use crate::{DynProvider, ProviderAdapter};

// ---------------------------------------------------------------------------
// ProviderRegistry
// ---------------------------------------------------------------------------

/// Lookup table mapping provider identifiers to adapter instances.
///
/// Adding a provider is one `register` call; the dispatcher resolves by
/// identifier and never branches on concrete adapter types.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, DynProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register an adapter under its own identifier. A later registration
    /// with the same identifier replaces the earlier one.
    pub fn register(&mut self, provider: impl ProviderAdapter + 'static) {
        let id = provider.id().to_string();
        self.providers.insert(id, DynProvider::new(provider));
    }

    pub fn get(&self, id: &str) -> Option<&DynProvider> {
        self.providers.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

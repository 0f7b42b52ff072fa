// src/core/frameworks/registry.rs
//! Registry of the supported framework adapters.

use super::{FrameworkAdapter, JaxRsAdapter, SpringAdapter};
use crate::config::DiscoveryConfig;

/// Owns the adapter set. Populated at construction time and read-only
/// afterwards, so no locking is needed.
pub struct FrameworkRegistry {
    adapters: Vec<Box<dyn FrameworkAdapter>>,
}

impl FrameworkRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Registry with every built-in adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SpringAdapter::new()));
        registry.register(Box::new(JaxRsAdapter::javax()));
        registry.register(Box::new(JaxRsAdapter::jakarta()));
        registry
    }

    /// Built-in adapters filtered down to the configured set. An empty
    /// configuration enables all of them.
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        let mut registry = Self::with_defaults();
        if !config.frameworks.is_empty() {
            registry
                .adapters
                .retain(|a| config.frameworks.iter().any(|name| name == a.name()));
        }
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn FrameworkAdapter>) {
        self.adapters.push(adapter);
    }

    /// All adapters in registration order.
    pub fn all(&self) -> &[Box<dyn FrameworkAdapter>] {
        &self.adapters
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn FrameworkAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }
}

impl Default for FrameworkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// src/core/chains/cache.rs
//! Process-lifetime caches for built chains and discovered endpoints.
//!
//! Shared between the foreground trigger and the background pre-warm pass,
//! so every container here tolerates concurrent readers and writers.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::core::code_model::MethodId;
use crate::core::discovery::ApiEndpoint;

use super::builder::CallChain;

pub struct ChainCache {
    chains: DashMap<MethodId, Arc<CallChain>>,
    endpoints: RwLock<Vec<ApiEndpoint>>,
}

impl ChainCache {
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
            endpoints: RwLock::new(Vec::new()),
        }
    }

    /// Cached chain for an entry point, if any. The cache is authoritative:
    /// no staleness check is performed against current code state.
    pub fn chain(&self, entry_point: &MethodId) -> Option<Arc<CallChain>> {
        self.chains.get(entry_point).map(|entry| entry.value().clone())
    }

    /// Store a freshly built chain, returning the chain it replaced.
    pub fn store_chain(&self, chain: Arc<CallChain>) -> Option<Arc<CallChain>> {
        self.chains.insert(chain.entry_point.clone(), chain)
    }

    /// Remove one entry; true when something was removed.
    pub fn invalidate(&self, entry_point: &MethodId) -> bool {
        self.chains.remove(entry_point).is_some()
    }

    /// Drop every cached chain. Used on refresh; chains are never
    /// selectively invalidated there.
    pub fn clear_chains(&self) {
        self.chains.clear();
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn endpoints(&self) -> Vec<ApiEndpoint> {
        self.endpoints
            .read()
            .expect("endpoint list lock poisoned")
            .clone()
    }

    pub fn endpoint_by_id(&self, endpoint_id: &str) -> Option<ApiEndpoint> {
        self.endpoints
            .read()
            .expect("endpoint list lock poisoned")
            .iter()
            .find(|e| e.id == endpoint_id)
            .cloned()
    }

    pub fn replace_endpoints(&self, endpoints: Vec<ApiEndpoint>) {
        *self
            .endpoints
            .write()
            .expect("endpoint list lock poisoned") = endpoints;
    }

    /// One-shot chain attachment on the endpoint record that triggered the
    /// build. True when the endpoint was found.
    pub fn attach_chain(&self, endpoint_id: &str, chain: Arc<CallChain>) -> bool {
        let mut endpoints = self
            .endpoints
            .write()
            .expect("endpoint list lock poisoned");

        match endpoints.iter_mut().find(|e| e.id == endpoint_id) {
            Some(endpoint) => {
                endpoint.call_chain = Some(chain);
                true
            }
            None => false,
        }
    }
}

impl Default for ChainCache {
    fn default() -> Self {
        Self::new()
    }
}

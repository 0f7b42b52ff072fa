// src/core/chains/service.rs
//! Get-or-build chain access, endpoint refresh and listener notification.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::core::code_model::{CodeModel, MethodId};
use crate::core::discovery::{ApiEndpoint, EndpointDiscoverer};
use crate::core::frameworks::FrameworkRegistry;
use crate::error::{ApiscopeError, Result};

use super::builder::{CallChain, CallGraphBuilder};
use super::cache::ChainCache;

/// Notified after every chain build, with the chain that was replaced in
/// the cache, if any.
pub trait ChainListener: Send + Sync {
    fn on_chain_built(&self, chain: &Arc<CallChain>, previous: Option<&Arc<CallChain>>)
        -> Result<()>;
}

/// Owns the discovery + build subsystem state: the endpoint list, the chain
/// cache and the listener registry.
pub struct CallChainService {
    model: Arc<dyn CodeModel>,
    discoverer: EndpointDiscoverer,
    builder: CallGraphBuilder,
    cache: Arc<ChainCache>,
    listeners: RwLock<Vec<Box<dyn ChainListener>>>,
}

impl CallChainService {
    pub fn new(
        model: Arc<dyn CodeModel>,
        registry: Arc<FrameworkRegistry>,
        config: &AnalysisConfig,
    ) -> Self {
        let discoverer = EndpointDiscoverer::new(model.clone(), registry);
        let builder =
            CallGraphBuilder::new(config.max_call_depth, config.platform_prefixes.clone());

        Self {
            model,
            discoverer,
            builder,
            cache: Arc::new(ChainCache::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &Arc<ChainCache> {
        &self.cache
    }

    /// Cached chain for the entry point, building it on first request. The
    /// cache is authoritative until the next `refresh`.
    pub fn build_call_chain(&self, entry_point: &MethodId) -> Result<Arc<CallChain>> {
        if let Some(cached) = self.cache.chain(entry_point) {
            debug!("Found call chain in cache for: {}", entry_point);
            return Ok(cached);
        }

        info!("Building call chain for: {}", entry_point);
        let chain = {
            let snapshot = self.model.snapshot()?;
            Arc::new(self.builder.build(snapshot.as_ref(), entry_point))
        };

        let previous = self.cache.store_chain(chain.clone());
        self.notify_listeners(&chain, previous.as_ref());

        Ok(chain)
    }

    /// Build (or fetch) the chain for a discovered endpoint and attach it
    /// to the endpoint record.
    pub fn build_chain_for_endpoint(&self, endpoint_id: &str) -> Result<Arc<CallChain>> {
        let endpoint = self
            .cache
            .endpoint_by_id(endpoint_id)
            .ok_or_else(|| ApiscopeError::EndpointNotFound(endpoint_id.to_string()))?;

        let chain = self.build_call_chain(&endpoint.handler)?;
        self.cache.attach_chain(endpoint_id, chain.clone());
        Ok(chain)
    }

    /// The discovered endpoint list, running discovery first if it has
    /// never run.
    pub fn endpoints(&self) -> Result<Vec<ApiEndpoint>> {
        let endpoints = self.cache.endpoints();
        if endpoints.is_empty() {
            self.refresh()?;
            return Ok(self.cache.endpoints());
        }
        Ok(endpoints)
    }

    /// Endpoints for one framework, without touching the cached list.
    pub fn discover_for(&self, framework_name: &str) -> Result<Vec<ApiEndpoint>> {
        self.discoverer.discover_for(framework_name)
    }

    /// Re-run discovery, replace the endpoint list and clear the whole
    /// chain cache. Returns the number of endpoints found.
    pub fn refresh(&self) -> Result<usize> {
        info!("Refreshing API endpoints");
        let endpoints = self.discoverer.discover()?;
        let count = endpoints.len();

        self.cache.replace_endpoints(endpoints);
        self.cache.clear_chains();

        info!("Refreshed {} API endpoints", count);
        Ok(count)
    }

    pub fn invalidate(&self, entry_point: &MethodId) -> bool {
        self.cache.invalidate(entry_point)
    }

    pub fn add_listener(&self, listener: Box<dyn ChainListener>) {
        self.listeners
            .write()
            .expect("listener registry lock poisoned")
            .push(listener);
        debug!("Registered call chain listener");
    }

    /// Peripheral lookup: all methods calling the given one.
    pub fn callers_of(&self, method: &MethodId) -> Result<Vec<MethodId>> {
        let snapshot = self.model.snapshot()?;
        Ok(snapshot.callers_of(method))
    }

    /// Peripheral lookup: direct and transitive subtypes of a type.
    pub fn subtypes_of(&self, type_name: &str) -> Result<Vec<String>> {
        let snapshot = self.model.snapshot()?;
        Ok(snapshot.subtypes_of(type_name))
    }

    /// Listeners are notified in registration order; one failure is logged
    /// and never blocks the rest or the build that triggered it.
    fn notify_listeners(&self, chain: &Arc<CallChain>, previous: Option<&Arc<CallChain>>) {
        let listeners = self
            .listeners
            .read()
            .expect("listener registry lock poisoned");

        for listener in listeners.iter() {
            if let Err(error) = listener.on_chain_built(chain, previous) {
                warn!("Call chain listener failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code_model::{Annotation, MethodDecl, TypeDecl};
    use crate::core::source_model::InMemorySourceModel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spring_model() -> InMemorySourceModel {
        let mut model = InMemorySourceModel::new();
        model.add_type(TypeDecl {
            qualified_name: "com.example.UserController".to_string(),
            annotations: vec![
                Annotation::new("org.springframework.web.bind.annotation.RestController"),
                Annotation::new("org.springframework.web.bind.annotation.RequestMapping")
                    .with_attribute("value", "\"users\""),
            ],
            methods: vec![MethodDecl {
                name: "getUser".to_string(),
                annotations: vec![Annotation::new(
                    "org.springframework.web.bind.annotation.GetMapping",
                )],
                return_type: "User".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });
        model.add_calls(
            MethodId::new("com.example.UserController", "getUser"),
            vec![MethodId::new("com.example.UserService", "findUser")],
        );
        model
    }

    fn service(model: InMemorySourceModel) -> CallChainService {
        CallChainService::new(
            Arc::new(model),
            Arc::new(FrameworkRegistry::with_defaults()),
            &AnalysisConfig::default(),
        )
    }

    struct CountingListener {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ChainListener for CountingListener {
        fn on_chain_built(
            &self,
            _chain: &Arc<CallChain>,
            _previous: Option<&Arc<CallChain>>,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiscopeError::Model("listener exploded".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_repeated_build_returns_identical_cached_chain() {
        let service = service(spring_model());
        let entry = MethodId::new("com.example.UserController", "getUser");

        let first = service.build_call_chain(&entry).unwrap();
        let second = service.build_call_chain(&entry).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_refresh_clears_chain_cache() {
        let service = service(spring_model());
        let entry = MethodId::new("com.example.UserController", "getUser");

        let before = service.build_call_chain(&entry).unwrap();
        service.refresh().unwrap();
        let after = service.build_call_chain(&entry).unwrap();

        // A fresh traversal produced a new chain object.
        assert!(!Arc::ptr_eq(&before, &after));
        assert_ne!(before.id, after.id);
    }

    #[test]
    fn test_failing_listener_does_not_block_the_next_one() {
        let service = service(spring_model());
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));

        service.add_listener(Box::new(CountingListener {
            calls: first_calls.clone(),
            fail: true,
        }));
        service.add_listener(Box::new(CountingListener {
            calls: second_calls.clone(),
            fail: false,
        }));

        let entry = MethodId::new("com.example.UserController", "getUser");
        service.build_call_chain(&entry).unwrap();

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_chain_for_endpoint_attaches_chain() {
        let service = service(spring_model());
        let endpoints = service.endpoints().unwrap();
        assert_eq!(endpoints.len(), 1);

        let chain = service.build_chain_for_endpoint(&endpoints[0].id).unwrap();

        let attached = service.cache().endpoint_by_id(&endpoints[0].id).unwrap();
        assert_eq!(attached.call_chain.unwrap().id, chain.id);
    }

    #[test]
    fn test_not_ready_model_defers_build() {
        let model = spring_model();
        model.set_ready(false);
        let service = service(model);

        let entry = MethodId::new("com.example.UserController", "getUser");
        let result = service.build_call_chain(&entry);
        assert!(matches!(result, Err(ApiscopeError::ModelNotReady)));

        // Nothing was cached by the failed attempt.
        assert_eq!(service.cache().chain_count(), 0);
    }
}

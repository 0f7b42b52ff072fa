// src/core/chains/context.rs
//! Per-element analysis context derived from call chains.
//!
//! Two caches: element contexts keyed by method identity, and aggregate
//! contexts keyed by chain id. Updating one element cross-invalidates every
//! aggregate that referenced it, plus the chain cache entry for that method.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::core::code_model::{CodeModel, CodeSnapshot, MethodId};
use crate::error::Result;

use super::builder::CallChain;
use super::cache::ChainCache;
use super::service::ChainListener;

/// Descriptive context for one method.
#[derive(Debug, Clone, Serialize)]
pub struct ElementContext {
    pub id: MethodId,
    pub element_type: String,
    pub parameter_types: Vec<String>,
    pub return_type: String,
    /// Qualified names of the method's declared annotations
    pub annotations: Vec<String>,
    /// Reserved for data-flow analysis: variable name -> methods it reaches
    pub variable_dependencies: HashMap<String, Vec<String>>,
}

/// Aggregate context for every method reachable in one chain, keyed by the
/// chain's id in the assembler cache.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisContext {
    pub id: String,
    pub chain_id: String,
    pub entry_point: MethodId,
    /// Element contexts keyed by method identity display form
    pub element_contexts: HashMap<String, ElementContext>,
}

pub struct ContextAssembler {
    model: Arc<dyn CodeModel>,
    chain_cache: Arc<ChainCache>,
    elements: DashMap<MethodId, ElementContext>,
    aggregates: DashMap<String, AnalysisContext>,
}

impl ContextAssembler {
    pub fn new(model: Arc<dyn CodeModel>, chain_cache: Arc<ChainCache>) -> Self {
        Self {
            model,
            chain_cache,
            elements: DashMap::new(),
            aggregates: DashMap::new(),
        }
    }

    /// Materialize (or fetch) the aggregate context for a chain.
    pub fn build_context(&self, chain: &CallChain) -> Result<AnalysisContext> {
        if let Some(cached) = self.aggregates.get(&chain.id) {
            debug!("Using cached context for call chain: {}", chain.id);
            return Ok(cached.value().clone());
        }

        let snapshot = self.model.snapshot()?;
        let mut element_contexts = HashMap::new();

        // The entry point is covered even when the chain has no root.
        let entry_context = self.element_context(snapshot.as_ref(), &chain.entry_point);
        element_contexts.insert(chain.entry_point.to_string(), entry_context);

        for method in chain.all_methods() {
            element_contexts
                .entry(method.to_string())
                .or_insert_with(|| self.element_context(snapshot.as_ref(), method));
        }

        let context = AnalysisContext {
            id: Uuid::new_v4().to_string(),
            chain_id: chain.id.clone(),
            entry_point: chain.entry_point.clone(),
            element_contexts,
        };

        self.aggregates.insert(chain.id.clone(), context.clone());
        Ok(context)
    }

    /// Cached context for one method, created from the snapshot on a miss.
    /// Methods the model cannot resolve get an empty context rather than an
    /// error.
    pub fn element_context(&self, snapshot: &dyn CodeSnapshot, id: &MethodId) -> ElementContext {
        if let Some(cached) = self.elements.get(id) {
            return cached.value().clone();
        }

        let context = match snapshot.method(id) {
            Some(decl) => ElementContext {
                id: id.clone(),
                element_type: "METHOD".to_string(),
                parameter_types: decl.parameters.iter().map(|p| p.type_name.clone()).collect(),
                return_type: decl.return_type.clone(),
                annotations: decl
                    .annotations
                    .iter()
                    .map(|a| a.qualified_name.clone())
                    .collect(),
                variable_dependencies: HashMap::new(),
            },
            None => ElementContext {
                id: id.clone(),
                element_type: "METHOD".to_string(),
                parameter_types: Vec::new(),
                return_type: "void".to_string(),
                annotations: Vec::new(),
                variable_dependencies: HashMap::new(),
            },
        };

        self.elements.insert(id.clone(), context.clone());
        context
    }

    /// Evict the element's own context, every aggregate that referenced it
    /// and the chain cache entry keyed by it.
    pub fn update_context(&self, id: &MethodId) {
        debug!("Updating context for element: {}", id);
        self.elements.remove(id);

        let key = id.to_string();
        self.aggregates
            .retain(|_, context| !context.element_contexts.contains_key(&key));

        self.chain_cache.invalidate(id);
    }

    pub fn clear(&self) {
        self.elements.clear();
        self.aggregates.clear();
    }

    #[cfg(test)]
    fn aggregate_count(&self) -> usize {
        self.aggregates.len()
    }
}

/// A rebuilt chain supersedes the aggregate context cached for the chain it
/// replaced.
impl ChainListener for Arc<ContextAssembler> {
    fn on_chain_built(
        &self,
        _chain: &Arc<CallChain>,
        previous: Option<&Arc<CallChain>>,
    ) -> Result<()> {
        if let Some(previous) = previous {
            self.aggregates.remove(&previous.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chains::CallGraphBuilder;
    use crate::core::code_model::{Annotation, MethodDecl, ParamDecl, TypeDecl};
    use crate::core::source_model::InMemorySourceModel;

    fn model() -> InMemorySourceModel {
        let mut model = InMemorySourceModel::new();
        model.add_type(TypeDecl {
            qualified_name: "com.example.UserService".to_string(),
            methods: vec![MethodDecl {
                name: "findUser".to_string(),
                annotations: vec![Annotation::new("org.springframework.stereotype.Service")],
                parameters: vec![ParamDecl {
                    name: "id".to_string(),
                    type_name: "long".to_string(),
                    annotations: vec![],
                }],
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

    fn build_chain(model: &InMemorySourceModel) -> CallChain {
        let snapshot = crate::core::code_model::CodeModel::snapshot(model).unwrap();
        let builder = CallGraphBuilder::new(5, vec![]);
        builder.build(
            snapshot.as_ref(),
            &MethodId::new("com.example.UserController", "getUser"),
        )
    }

    #[test]
    fn test_build_context_covers_all_chain_methods() {
        let model = model();
        let chain = build_chain(&model);
        let assembler = ContextAssembler::new(Arc::new(model), Arc::new(ChainCache::new()));

        let context = assembler.build_context(&chain).unwrap();
        assert_eq!(context.chain_id, chain.id);
        assert_eq!(context.element_contexts.len(), 2);

        let service_ctx = &context.element_contexts["com.example.UserService.findUser"];
        assert_eq!(service_ctx.parameter_types, vec!["long"]);
        assert_eq!(service_ctx.return_type, "User");
        assert_eq!(
            service_ctx.annotations,
            vec!["org.springframework.stereotype.Service"]
        );
    }

    #[test]
    fn test_aggregate_context_is_cached_by_chain_id() {
        let model = model();
        let chain = build_chain(&model);
        let assembler = ContextAssembler::new(Arc::new(model), Arc::new(ChainCache::new()));

        let first = assembler.build_context(&chain).unwrap();
        let second = assembler.build_context(&chain).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_update_context_cross_invalidates() {
        let model = model();
        let chain = build_chain(&model);
        let chain_cache = Arc::new(ChainCache::new());
        let entry = chain.entry_point.clone();
        chain_cache.store_chain(Arc::new(chain.clone()));

        let assembler = ContextAssembler::new(Arc::new(model), chain_cache.clone());
        assembler.build_context(&chain).unwrap();
        assert_eq!(assembler.aggregate_count(), 1);

        // The service method is referenced by the aggregate: updating it
        // evicts the aggregate, and the entry's chain cache entry stays.
        assembler.update_context(&MethodId::new("com.example.UserService", "findUser"));
        assert_eq!(assembler.aggregate_count(), 0);
        assert!(chain_cache.chain(&entry).is_some());

        // Updating the entry point itself also drops its cached chain.
        assembler.update_context(&entry);
        assert!(chain_cache.chain(&entry).is_none());
    }

    #[test]
    fn test_listener_evicts_superseded_aggregate() {
        let model = model();
        let chain = build_chain(&model);
        let assembler = Arc::new(ContextAssembler::new(
            Arc::new(model),
            Arc::new(ChainCache::new()),
        ));

        assembler.build_context(&chain).unwrap();
        assert_eq!(assembler.aggregate_count(), 1);

        let replacement = Arc::new(CallChain {
            id: Uuid::new_v4().to_string(),
            entry_point: chain.entry_point.clone(),
            root: None,
            built_at: chrono::Utc::now(),
        });
        let previous = Arc::new(chain);
        assembler
            .on_chain_built(&replacement, Some(&previous))
            .unwrap();

        assert_eq!(assembler.aggregate_count(), 0);
    }
}

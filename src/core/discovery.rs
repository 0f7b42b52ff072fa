// src/core/discovery.rs
//! Endpoint discovery over the code model.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::chains::CallChain;
use super::code_model::{CodeModel, CodeSnapshot, MethodDecl, TypeDecl};
use super::frameworks::{ApiParameter, FrameworkAdapter, FrameworkRegistry, HttpMethod};
use crate::error::{ApiscopeError, Result};

/// One discovered HTTP endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiEndpoint {
    pub id: String,
    /// Normalized URL path, base path and method path combined
    pub path: String,
    pub http_method: HttpMethod,
    /// Identity of the handler method (reference, not owned)
    pub handler: super::code_model::MethodId,
    /// Qualified name of the controller type
    pub controller_name: String,
    pub method_name: String,
    pub parameters: Vec<ApiParameter>,
    pub return_type: String,
    /// Lazily attached once the first chain build for this endpoint runs
    #[serde(skip)]
    pub call_chain: Option<Arc<CallChain>>,
}

/// Enumerates controller types and extracts endpoint descriptors using the
/// registered framework adapters.
pub struct EndpointDiscoverer {
    model: Arc<dyn CodeModel>,
    registry: Arc<FrameworkRegistry>,
}

impl EndpointDiscoverer {
    pub fn new(model: Arc<dyn CodeModel>, registry: Arc<FrameworkRegistry>) -> Self {
        Self { model, registry }
    }

    /// Discover endpoints across all registered frameworks. Endpoints are
    /// concatenated per adapter with no cross-adapter de-duplication: a
    /// handler matched by two adapters yields two records.
    pub fn discover(&self) -> Result<Vec<ApiEndpoint>> {
        info!("Discovering API endpoints");
        let snapshot = self.model.snapshot()?;

        let mut endpoints = Vec::new();
        for adapter in self.registry.all() {
            let found = self.scan(snapshot.as_ref(), adapter.as_ref());
            debug!("Found {} endpoints for {}", found.len(), adapter.name());
            endpoints.extend(found);
        }

        info!("Discovered {} API endpoints", endpoints.len());
        Ok(endpoints)
    }

    /// Discover endpoints for a single framework by name.
    pub fn discover_for(&self, framework_name: &str) -> Result<Vec<ApiEndpoint>> {
        let adapter = self
            .registry
            .by_name(framework_name)
            .ok_or_else(|| ApiscopeError::UnknownFramework(framework_name.to_string()))?;

        let snapshot = self.model.snapshot()?;
        Ok(self.scan(snapshot.as_ref(), adapter))
    }

    /// Whole-codebase type scan: a type is a controller when any of its
    /// direct annotations satisfies the adapter's controller predicate.
    fn scan(&self, snapshot: &dyn CodeSnapshot, adapter: &dyn FrameworkAdapter) -> Vec<ApiEndpoint> {
        let mut endpoints = Vec::new();

        for type_decl in snapshot.types() {
            let is_controller = type_decl
                .annotations
                .iter()
                .any(|a| adapter.is_controller_annotation(&a.qualified_name));
            if !is_controller {
                continue;
            }

            let base_path = adapter.base_path(type_decl);
            for method in &type_decl.methods {
                if let Some(endpoint) = self.extract_endpoint(adapter, type_decl, method, &base_path)
                {
                    endpoints.push(endpoint);
                }
            }
        }

        endpoints
    }

    fn extract_endpoint(
        &self,
        adapter: &dyn FrameworkAdapter,
        type_decl: &TypeDecl,
        method: &MethodDecl,
        base_path: &str,
    ) -> Option<ApiEndpoint> {
        let (http_method, path) = adapter.endpoint_info(method, base_path)?;

        let parameters = method
            .parameters
            .iter()
            .map(|parameter| {
                adapter.parameter_info(parameter).unwrap_or_else(|| {
                    // No framework annotation: a plain required positional
                    // parameter with no description.
                    ApiParameter {
                        name: parameter.name.clone(),
                        param_type: parameter.type_name.clone(),
                        required: true,
                        default_value: None,
                        description: None,
                    }
                })
            })
            .collect();

        Some(ApiEndpoint {
            id: Uuid::new_v4().to_string(),
            path,
            http_method,
            handler: type_decl.method_id(method),
            controller_name: type_decl.qualified_name.clone(),
            method_name: method.name.clone(),
            parameters,
            return_type: method.return_type.clone(),
            call_chain: None,
        })
    }
}

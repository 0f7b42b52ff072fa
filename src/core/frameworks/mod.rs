// src/core/frameworks/mod.rs
//! Pluggable framework adapters.
//!
//! Each adapter translates one web framework's annotation vocabulary into
//! the generic endpoint model. Adapters are immutable, constructed once at
//! startup and shared read-only through the [`FrameworkRegistry`].

pub mod path_utils;

mod jaxrs;
mod registry;
mod spring;

pub use jaxrs::JaxRsAdapter;
pub use registry::FrameworkRegistry;
pub use spring::SpringAdapter;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::code_model::{Annotation, MethodDecl, ParamDecl, TypeDecl};

/// HTTP verb of a discovered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

/// One parameter of a discovered endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiParameter {
    pub name: String,
    pub param_type: String,
    pub required: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// Strategy contract implemented per supported framework.
pub trait FrameworkAdapter: Send + Sync {
    /// Display name, unique within the registry.
    fn name(&self) -> &str;

    /// Annotation qualified names this framework is recognized by.
    fn annotations(&self) -> &[String];

    /// Heuristic predicate classifying a type-level annotation as marking a
    /// controller. Matches on name suffix so meta-annotated variants are
    /// picked up without a registry of every exact name.
    fn is_controller_annotation(&self, annotation_name: &str) -> bool;

    /// Base path declared on the controller type, normalized. A controller
    /// without a routing annotation contributes `""`.
    fn base_path(&self, controller: &TypeDecl) -> String;

    /// Verb and full path of a handler method, or `None` when the method is
    /// not an endpoint. `None` is the sole "not an endpoint" signal, never
    /// an error.
    fn endpoint_info(&self, method: &MethodDecl, base_path: &str) -> Option<(HttpMethod, String)>;

    /// Framework-specific parameter descriptor, or `None` when no
    /// framework annotation is present. The discoverer synthesizes a
    /// default descriptor in that case.
    fn parameter_info(&self, parameter: &ParamDecl) -> Option<ApiParameter>;
}

/// Read an annotation attribute as display text: the raw source text with
/// array braces and string-literal quotes stripped.
pub(crate) fn attribute_text(annotation: &Annotation, attribute: &str) -> Option<String> {
    let raw = annotation.raw_attribute(attribute)?;
    let stripped = raw
        .trim()
        .trim_matches(|c| c == '{' || c == '}')
        .trim()
        .trim_matches('"');
    Some(stripped.to_string())
}

// src/core/frameworks/jaxrs.rs
//! JAX-RS adapter, covering both the `javax.ws.rs` and `jakarta.ws.rs`
//! namespaces from one implementation parameterized over its annotation
//! names.

use super::path_utils;
use super::{attribute_text, ApiParameter, FrameworkAdapter, HttpMethod};
use crate::core::code_model::{MethodDecl, ParamDecl, TypeDecl};

pub struct JaxRsAdapter {
    name: String,
    path_annotation: String,
    get_annotation: String,
    post_annotation: String,
    put_annotation: String,
    delete_annotation: String,
    query_param_annotation: String,
    path_param_annotation: String,
    annotations: Vec<String>,
}

impl JaxRsAdapter {
    fn with_namespace(name: &str, namespace: &str) -> Self {
        let path_annotation = format!("{}.Path", namespace);
        let get_annotation = format!("{}.GET", namespace);
        let post_annotation = format!("{}.POST", namespace);
        let put_annotation = format!("{}.PUT", namespace);
        let delete_annotation = format!("{}.DELETE", namespace);

        let annotations = vec![
            path_annotation.clone(),
            get_annotation.clone(),
            post_annotation.clone(),
            put_annotation.clone(),
            delete_annotation.clone(),
        ];

        Self {
            name: name.to_string(),
            path_annotation,
            get_annotation,
            post_annotation,
            put_annotation,
            delete_annotation,
            query_param_annotation: format!("{}.QueryParam", namespace),
            path_param_annotation: format!("{}.PathParam", namespace),
            annotations,
        }
    }

    /// The `javax.ws.rs` variant.
    pub fn javax() -> Self {
        Self::with_namespace("JAX-RS (javax)", "javax.ws.rs")
    }

    /// The `jakarta.ws.rs` variant.
    pub fn jakarta() -> Self {
        Self::with_namespace("JAX-RS (jakarta)", "jakarta.ws.rs")
    }

    fn path_value(&self, method: &MethodDecl) -> String {
        method
            .annotation(&self.path_annotation)
            .and_then(|a| attribute_text(a, "value"))
            .unwrap_or_default()
    }
}

impl FrameworkAdapter for JaxRsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> &[String] {
        &self.annotations
    }

    fn is_controller_annotation(&self, annotation_name: &str) -> bool {
        annotation_name.ends_with("Path") || annotation_name.ends_with("Resource")
    }

    fn base_path(&self, controller: &TypeDecl) -> String {
        let base = controller
            .annotation(&self.path_annotation)
            .and_then(|a| attribute_text(a, "value"))
            .unwrap_or_default();

        path_utils::normalize(&base)
    }

    fn endpoint_info(&self, method: &MethodDecl, base_path: &str) -> Option<(HttpMethod, String)> {
        let verb = if method.has_annotation(&self.get_annotation) {
            HttpMethod::Get
        } else if method.has_annotation(&self.post_annotation) {
            HttpMethod::Post
        } else if method.has_annotation(&self.put_annotation) {
            HttpMethod::Put
        } else if method.has_annotation(&self.delete_annotation) {
            HttpMethod::Delete
        } else {
            return None;
        };

        let path = path_utils::normalize(&self.path_value(method));
        Some((verb, path_utils::combine(base_path, &path)))
    }

    fn parameter_info(&self, parameter: &ParamDecl) -> Option<ApiParameter> {
        if let Some(annotation) = parameter.annotation(&self.query_param_annotation) {
            let name = attribute_text(annotation, "value")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| parameter.name.clone());

            return Some(ApiParameter {
                name,
                param_type: parameter.type_name.clone(),
                // JAX-RS has no required attribute on query parameters
                required: false,
                default_value: None,
                description: Some("Query parameter".to_string()),
            });
        }

        if let Some(annotation) = parameter.annotation(&self.path_param_annotation) {
            let name = attribute_text(annotation, "value")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| parameter.name.clone());

            return Some(ApiParameter {
                name,
                param_type: parameter.type_name.clone(),
                // Path parameters are always required
                required: true,
                default_value: None,
                description: Some("Path parameter".to_string()),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code_model::Annotation;

    fn resource(namespace: &str) -> TypeDecl {
        TypeDecl {
            qualified_name: "com.example.OrderResource".to_string(),
            annotations: vec![Annotation::new(format!("{}.Path", namespace))
                .with_attribute("value", "\"orders\"")],
            methods: vec![MethodDecl {
                name: "getOrder".to_string(),
                annotations: vec![
                    Annotation::new(format!("{}.GET", namespace)),
                    Annotation::new(format!("{}.Path", namespace))
                        .with_attribute("value", "\"{id}\""),
                ],
                return_type: "Order".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_both_variants_extract_endpoints() {
        for (adapter, namespace) in [
            (JaxRsAdapter::javax(), "javax.ws.rs"),
            (JaxRsAdapter::jakarta(), "jakarta.ws.rs"),
        ] {
            let resource = resource(namespace);
            assert!(resource
                .annotations
                .iter()
                .any(|a| adapter.is_controller_annotation(&a.qualified_name)));

            let base = adapter.base_path(&resource);
            assert_eq!(base, "/orders");

            let (verb, path) = adapter.endpoint_info(&resource.methods[0], &base).unwrap();
            assert_eq!(verb, HttpMethod::Get);
            assert_eq!(path, "/orders/{id}");
        }
    }

    #[test]
    fn test_method_without_verb_annotation_is_skipped() {
        let adapter = JaxRsAdapter::javax();
        let method = MethodDecl {
            name: "toString".to_string(),
            ..Default::default()
        };
        assert!(adapter.endpoint_info(&method, "/orders").is_none());
    }

    #[test]
    fn test_query_param_is_optional() {
        let adapter = JaxRsAdapter::jakarta();
        let parameter = ParamDecl {
            name: "limit".to_string(),
            type_name: "int".to_string(),
            annotations: vec![Annotation::new("jakarta.ws.rs.QueryParam")
                .with_attribute("value", "\"limit\"")],
        };

        let info = adapter.parameter_info(&parameter).unwrap();
        assert_eq!(info.name, "limit");
        assert!(!info.required);
        assert_eq!(info.description.as_deref(), Some("Query parameter"));
    }

    #[test]
    fn test_path_param_is_required() {
        let adapter = JaxRsAdapter::javax();
        let parameter = ParamDecl {
            name: "id".to_string(),
            type_name: "String".to_string(),
            annotations: vec![Annotation::new("javax.ws.rs.PathParam")],
        };

        let info = adapter.parameter_info(&parameter).unwrap();
        // Missing value attribute falls back to the declared name
        assert_eq!(info.name, "id");
        assert!(info.required);
    }
}

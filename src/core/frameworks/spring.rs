// src/core/frameworks/spring.rs
//! Spring Web MVC adapter.

use super::path_utils;
use super::{attribute_text, ApiParameter, FrameworkAdapter, HttpMethod};
use crate::core::code_model::{Annotation, MethodDecl, ParamDecl, TypeDecl};

const REQUEST_MAPPING: &str = "org.springframework.web.bind.annotation.RequestMapping";
const GET_MAPPING: &str = "org.springframework.web.bind.annotation.GetMapping";
const POST_MAPPING: &str = "org.springframework.web.bind.annotation.PostMapping";
const PUT_MAPPING: &str = "org.springframework.web.bind.annotation.PutMapping";
const DELETE_MAPPING: &str = "org.springframework.web.bind.annotation.DeleteMapping";
const PATCH_MAPPING: &str = "org.springframework.web.bind.annotation.PatchMapping";
const REQUEST_PARAM: &str = "org.springframework.web.bind.annotation.RequestParam";
const PATH_VARIABLE: &str = "org.springframework.web.bind.annotation.PathVariable";
const REQUEST_BODY: &str = "org.springframework.web.bind.annotation.RequestBody";

/// Verb-specific mapping annotations, checked before the generic
/// `RequestMapping`.
const VERB_MAPPINGS: [(&str, HttpMethod); 5] = [
    (GET_MAPPING, HttpMethod::Get),
    (POST_MAPPING, HttpMethod::Post),
    (PUT_MAPPING, HttpMethod::Put),
    (DELETE_MAPPING, HttpMethod::Delete),
    (PATCH_MAPPING, HttpMethod::Patch),
];

pub struct SpringAdapter {
    annotations: Vec<String>,
}

impl SpringAdapter {
    pub fn new() -> Self {
        Self {
            annotations: vec![
                "org.springframework.web.bind.annotation.RestController".to_string(),
                "org.springframework.stereotype.Controller".to_string(),
                REQUEST_MAPPING.to_string(),
                GET_MAPPING.to_string(),
                POST_MAPPING.to_string(),
                PUT_MAPPING.to_string(),
                DELETE_MAPPING.to_string(),
                PATCH_MAPPING.to_string(),
            ],
        }
    }

    /// Path of a mapping annotation: `value` takes precedence over `path`.
    fn mapping_path(annotation: &Annotation) -> String {
        attribute_text(annotation, "value")
            .or_else(|| attribute_text(annotation, "path"))
            .unwrap_or_default()
    }

    /// Recover the verb from a `RequestMapping` `method` attribute,
    /// defaulting to GET when it cannot be determined.
    fn request_mapping_verb(annotation: &Annotation) -> HttpMethod {
        let method_attr = attribute_text(annotation, "method").unwrap_or_default();
        if method_attr.contains("GET") {
            HttpMethod::Get
        } else if method_attr.contains("POST") {
            HttpMethod::Post
        } else if method_attr.contains("PUT") {
            HttpMethod::Put
        } else if method_attr.contains("DELETE") {
            HttpMethod::Delete
        } else if method_attr.contains("PATCH") {
            HttpMethod::Patch
        } else {
            HttpMethod::Get
        }
    }

    fn required_flag(annotation: &Annotation) -> bool {
        match attribute_text(annotation, "required") {
            Some(value) => value.eq_ignore_ascii_case("true"),
            None => true,
        }
    }
}

impl Default for SpringAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkAdapter for SpringAdapter {
    fn name(&self) -> &str {
        "Spring"
    }

    fn annotations(&self) -> &[String] {
        &self.annotations
    }

    fn is_controller_annotation(&self, annotation_name: &str) -> bool {
        annotation_name.ends_with("Controller") || annotation_name.ends_with("RestController")
    }

    fn base_path(&self, controller: &TypeDecl) -> String {
        let base = controller
            .annotation(REQUEST_MAPPING)
            .map(Self::mapping_path)
            .unwrap_or_default();

        path_utils::normalize(&base)
    }

    fn endpoint_info(&self, method: &MethodDecl, base_path: &str) -> Option<(HttpMethod, String)> {
        let (verb, raw_path) = if let Some((annotation_name, verb)) = VERB_MAPPINGS
            .iter()
            .find(|(name, _)| method.has_annotation(name))
        {
            let path = method
                .annotation(annotation_name)
                .map(Self::mapping_path)
                .unwrap_or_default();
            (*verb, path)
        } else if let Some(annotation) = method.annotation(REQUEST_MAPPING) {
            (Self::request_mapping_verb(annotation), Self::mapping_path(annotation))
        } else {
            return None;
        };

        let path = path_utils::normalize(&raw_path);
        Some((verb, path_utils::combine(base_path, &path)))
    }

    fn parameter_info(&self, parameter: &ParamDecl) -> Option<ApiParameter> {
        if let Some(annotation) = parameter.annotation(REQUEST_PARAM) {
            let name = attribute_text(annotation, "name")
                .or_else(|| attribute_text(annotation, "value"))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| parameter.name.clone());

            return Some(ApiParameter {
                name,
                param_type: parameter.type_name.clone(),
                required: Self::required_flag(annotation),
                default_value: attribute_text(annotation, "defaultValue"),
                description: Some("Request parameter".to_string()),
            });
        }

        if let Some(annotation) = parameter.annotation(PATH_VARIABLE) {
            let name = attribute_text(annotation, "name")
                .or_else(|| attribute_text(annotation, "value"))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| parameter.name.clone());

            return Some(ApiParameter {
                name,
                param_type: parameter.type_name.clone(),
                required: Self::required_flag(annotation),
                default_value: None,
                description: Some("Path variable".to_string()),
            });
        }

        if let Some(annotation) = parameter.annotation(REQUEST_BODY) {
            return Some(ApiParameter {
                name: parameter.name.clone(),
                param_type: parameter.type_name.clone(),
                required: Self::required_flag(annotation),
                default_value: None,
                description: Some("Request body".to_string()),
            });
        }

        None
    }
}

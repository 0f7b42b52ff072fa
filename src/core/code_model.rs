// src/core/code_model.rs
//! Boundary to the external source-code model.
//!
//! The code model owns parsing, symbol resolution and reference search over
//! the analyzed codebase. Apiscope only ever talks to it through a snapshot
//! acquired for the duration of one operation, so every query observes a
//! consistent view of the index.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApiscopeError, Result};

/// Stable identity of a method in the analyzed codebase.
///
/// Used as the cache key for call chains and as the member of the
/// path-visited set during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    /// Qualified name of the declaring type
    pub type_name: String,
    /// Member name
    pub method_name: String,
    /// Overload disambiguator, e.g. "(String,int)". Empty when the code
    /// model supplies none, in which case overloads share one identity.
    #[serde(default)]
    pub signature: String,
}

impl MethodId {
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            signature: String::new(),
        }
    }

    pub fn with_signature(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            signature: signature.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.type_name, self.method_name, self.signature)
    }
}

impl FromStr for MethodId {
    type Err = ApiscopeError;

    /// Parses `com.example.UserController.getUser` or
    /// `com.example.UserController.getUser(String)`.
    fn from_str(s: &str) -> Result<Self> {
        let (qualified, signature) = match s.find('(') {
            Some(pos) => (&s[..pos], s[pos..].to_string()),
            None => (s, String::new()),
        };

        let (type_name, method_name) = qualified
            .rsplit_once('.')
            .ok_or_else(|| ApiscopeError::InvalidMethodRef(s.to_string()))?;

        if type_name.is_empty() || method_name.is_empty() {
            return Err(ApiscopeError::InvalidMethodRef(s.to_string()));
        }

        Ok(Self {
            type_name: type_name.to_string(),
            method_name: method_name.to_string(),
            signature,
        })
    }
}

/// A single annotation (or attribute) as declared on a type, method or
/// parameter, with its attribute values as raw source text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub qualified_name: String,
    /// Attribute name -> raw attribute text, exactly as written in source
    /// (string quotes and array braces included)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Annotation {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), raw.into());
        self
    }

    /// Raw source text of an attribute, if present.
    pub fn raw_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A method parameter as declared in source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ParamDecl {
    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }
}

/// A method as declared in source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    /// Overload disambiguator matching `MethodId::signature`
    #[serde(default)]
    pub signature: String,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl MethodDecl {
    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }

    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotation(qualified_name).is_some()
    }
}

/// A type as declared in source, with its direct annotations and methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDecl {
    pub qualified_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Qualified names of direct supertypes (superclass and interfaces)
    #[serde(default)]
    pub supertypes: Vec<String>,
}

impl TypeDecl {
    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }

    /// Identity of a method declared on this type.
    pub fn method_id(&self, method: &MethodDecl) -> MethodId {
        MethodId::with_signature(
            self.qualified_name.clone(),
            method.name.clone(),
            method.signature.clone(),
        )
    }
}

/// The external source-model collaborator.
pub trait CodeModel: Send + Sync {
    /// Acquire a consistent read scope over the model. Fails with
    /// [`ApiscopeError::ModelNotReady`] while the underlying index is still
    /// being built; callers defer and retry rather than treating that as a
    /// failure.
    fn snapshot(&self) -> Result<Box<dyn CodeSnapshot + '_>>;
}

/// Queries available inside one consistent read scope. Handles must not be
/// retained across asynchronous boundaries.
pub trait CodeSnapshot {
    /// All source-declared types in the codebase.
    fn types(&self) -> &[TypeDecl];

    /// Declaration of a method, if it exists in the model.
    fn method(&self, id: &MethodId) -> Option<&MethodDecl>;

    /// Resolved call targets of a method body, de-duplicated, in call-site
    /// order. Call expressions that cannot be resolved are omitted.
    fn call_targets(&self, id: &MethodId) -> Vec<MethodId>;

    /// All methods whose bodies call the given method.
    fn callers_of(&self, id: &MethodId) -> Vec<MethodId>;

    /// Direct and transitive subtypes of a type, de-duplicated.
    fn subtypes_of(&self, type_name: &str) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_id_display() {
        let plain = MethodId::new("com.example.UserService", "findUser");
        assert_eq!(plain.to_string(), "com.example.UserService.findUser");

        let overloaded =
            MethodId::with_signature("com.example.UserService", "findUser", "(String)");
        assert_eq!(
            overloaded.to_string(),
            "com.example.UserService.findUser(String)"
        );
    }

    #[test]
    fn test_method_id_parse() {
        let id: MethodId = "com.example.UserController.getUser".parse().unwrap();
        assert_eq!(id.type_name, "com.example.UserController");
        assert_eq!(id.method_name, "getUser");
        assert_eq!(id.signature, "");

        let id: MethodId = "com.example.UserController.getUser(long)".parse().unwrap();
        assert_eq!(id.method_name, "getUser");
        assert_eq!(id.signature, "(long)");

        assert!("nodot".parse::<MethodId>().is_err());
        assert!(".leading".parse::<MethodId>().is_err());
    }

    #[test]
    fn test_annotation_raw_attribute() {
        let annotation = Annotation::new("org.springframework.web.bind.annotation.RequestMapping")
            .with_attribute("value", "\"/users\"");

        assert_eq!(annotation.raw_attribute("value"), Some("\"/users\""));
        assert_eq!(annotation.raw_attribute("path"), None);
    }
}

// src/core/source_model.rs
//! In-memory code model.
//!
//! Backs the CLI (loaded from a JSON model file) and the test suite. A real
//! deployment can substitute any [`CodeModel`] implementation, e.g. one
//! backed by a language server or an IDE index.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::code_model::{CodeModel, CodeSnapshot, MethodDecl, MethodId, TypeDecl};
use crate::error::{ApiscopeError, Result};

/// Serialized form of the in-memory model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceModelFile {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub calls: Vec<CallRecord>,
}

/// Resolved call targets of one method body, in call-site order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub from: MethodId,
    pub to: Vec<MethodId>,
}

pub struct InMemorySourceModel {
    types: Vec<TypeDecl>,
    calls: Vec<(MethodId, Vec<MethodId>)>,
    ready: AtomicBool,
}

impl InMemorySourceModel {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            calls: Vec::new(),
            ready: AtomicBool::new(true),
        }
    }

    /// Load a model from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let model = Self::from_json(&content)?;
        info!(
            "Loaded code model from {}: {} types, {} call records",
            path.as_ref().display(),
            model.types.len(),
            model.calls.len()
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: SourceModelFile = serde_json::from_str(json)?;
        Ok(Self::from_model_file(file))
    }

    pub fn from_model_file(file: SourceModelFile) -> Self {
        let mut model = Self::new();
        model.types = file.types;
        for record in file.calls {
            model.add_calls(record.from, record.to);
        }
        model
    }

    pub fn add_type(&mut self, type_decl: TypeDecl) -> &mut Self {
        self.types.push(type_decl);
        self
    }

    /// Record the resolved call targets of a method body. Targets are
    /// de-duplicated preserving call-site order.
    pub fn add_calls(&mut self, from: MethodId, to: Vec<MethodId>) -> &mut Self {
        let mut seen = HashSet::new();
        let deduped: Vec<MethodId> = to.into_iter().filter(|t| seen.insert(t.clone())).collect();

        match self.calls.iter_mut().find(|(caller, _)| *caller == from) {
            Some((_, targets)) => {
                for target in deduped {
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
            None => self.calls.push((from, deduped)),
        }
        self
    }

    /// Simulates the index still being built; snapshots fail with
    /// `ModelNotReady` until flipped back.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl Default for InMemorySourceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeModel for InMemorySourceModel {
    fn snapshot(&self) -> Result<Box<dyn CodeSnapshot + '_>> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(ApiscopeError::ModelNotReady);
        }
        Ok(Box::new(InMemorySnapshot { model: self }))
    }
}

struct InMemorySnapshot<'a> {
    model: &'a InMemorySourceModel,
}

impl CodeSnapshot for InMemorySnapshot<'_> {
    fn types(&self) -> &[TypeDecl] {
        &self.model.types
    }

    fn method(&self, id: &MethodId) -> Option<&MethodDecl> {
        let type_decl = self
            .model
            .types
            .iter()
            .find(|t| t.qualified_name == id.type_name)?;

        type_decl.methods.iter().find(|m| {
            m.name == id.method_name && (id.signature.is_empty() || m.signature == id.signature)
        })
    }

    fn call_targets(&self, id: &MethodId) -> Vec<MethodId> {
        self.model
            .calls
            .iter()
            .find(|(caller, _)| caller == id)
            .map(|(_, targets)| targets.clone())
            .unwrap_or_default()
    }

    fn callers_of(&self, id: &MethodId) -> Vec<MethodId> {
        self.model
            .calls
            .iter()
            .filter(|(_, targets)| targets.contains(id))
            .map(|(caller, _)| caller.clone())
            .collect()
    }

    fn subtypes_of(&self, type_name: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut frontier = vec![type_name.to_string()];

        while let Some(current) = frontier.pop() {
            for type_decl in &self.model.types {
                if type_decl.supertypes.iter().any(|s| s == &current)
                    && seen.insert(type_decl.qualified_name.clone())
                {
                    found.push(type_decl.qualified_name.clone());
                    frontier.push(type_decl.qualified_name.clone());
                }
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_model_defers_snapshots() {
        let model = InMemorySourceModel::new();
        model.set_ready(false);
        assert!(matches!(
            model.snapshot().err(),
            Some(ApiscopeError::ModelNotReady)
        ));

        model.set_ready(true);
        assert!(model.snapshot().is_ok());
    }

    #[test]
    fn test_call_targets_are_deduplicated_in_order() {
        let a = MethodId::new("com.example.A", "run");
        let b = MethodId::new("com.example.B", "step");
        let c = MethodId::new("com.example.C", "finish");

        let mut model = InMemorySourceModel::new();
        model.add_calls(a.clone(), vec![b.clone(), c.clone(), b.clone()]);

        let snapshot = model.snapshot().unwrap();
        assert_eq!(snapshot.call_targets(&a), vec![b, c]);
    }

    #[test]
    fn test_callers_of() {
        let a = MethodId::new("com.example.A", "run");
        let b = MethodId::new("com.example.B", "step");
        let shared = MethodId::new("com.example.Repo", "save");

        let mut model = InMemorySourceModel::new();
        model.add_calls(a.clone(), vec![shared.clone()]);
        model.add_calls(b.clone(), vec![shared.clone()]);

        let snapshot = model.snapshot().unwrap();
        assert_eq!(snapshot.callers_of(&shared), vec![a, b]);
    }

    #[test]
    fn test_subtypes_are_transitive() {
        let mut model = InMemorySourceModel::new();
        model
            .add_type(TypeDecl {
                qualified_name: "com.example.Base".to_string(),
                ..Default::default()
            })
            .add_type(TypeDecl {
                qualified_name: "com.example.Middle".to_string(),
                supertypes: vec!["com.example.Base".to_string()],
                ..Default::default()
            })
            .add_type(TypeDecl {
                qualified_name: "com.example.Leaf".to_string(),
                supertypes: vec!["com.example.Middle".to_string()],
                ..Default::default()
            });

        let snapshot = model.snapshot().unwrap();
        let mut subtypes = snapshot.subtypes_of("com.example.Base");
        subtypes.sort();
        assert_eq!(subtypes, vec!["com.example.Leaf", "com.example.Middle"]);
    }

    #[test]
    fn test_model_file_round_trip() {
        let json = r#"{
            "types": [
                {
                    "qualified_name": "com.example.UserController",
                    "annotations": [
                        {
                            "qualified_name": "org.springframework.web.bind.annotation.RestController"
                        }
                    ],
                    "methods": [
                        {
                            "name": "getUser",
                            "return_type": "User"
                        }
                    ]
                }
            ],
            "calls": [
                {
                    "from": { "type_name": "com.example.UserController", "method_name": "getUser" },
                    "to": [ { "type_name": "com.example.UserService", "method_name": "findUser" } ]
                }
            ]
        }"#;

        let model = InMemorySourceModel::from_json(json).unwrap();
        let snapshot = model.snapshot().unwrap();

        assert_eq!(snapshot.types().len(), 1);
        let handler = MethodId::new("com.example.UserController", "getUser");
        assert!(snapshot.method(&handler).is_some());
        assert_eq!(snapshot.call_targets(&handler).len(), 1);
    }
}

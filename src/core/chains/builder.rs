// src/core/chains/builder.rs
//! Depth- and cycle-bounded call graph construction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::code_model::{CodeSnapshot, MethodId};

/// A node in a call chain tree.
///
/// Children are owned; the parent relation is a non-owning node-id
/// reference used only for path reconstruction.
#[derive(Debug, Clone, Serialize)]
pub struct CallNode {
    pub id: String,
    pub method: MethodId,
    /// Node id of the caller; `None` for the root
    pub parent: Option<String>,
    pub children: Vec<CallNode>,
    /// Distance from the entry point, root = 0
    pub depth: usize,
}

/// The bounded call tree rooted at one entry-point method.
#[derive(Debug, Clone, Serialize)]
pub struct CallChain {
    pub id: String,
    pub entry_point: MethodId,
    pub root: Option<CallNode>,
    pub built_at: DateTime<Utc>,
}

impl CallChain {
    /// Maximum node depth in the tree.
    pub fn depth(&self) -> usize {
        fn walk(node: &CallNode) -> usize {
            node.children.iter().map(walk).max().unwrap_or(node.depth)
        }
        self.root.as_ref().map(walk).unwrap_or(0)
    }

    /// All method identities in the tree, pre-order.
    pub fn all_methods(&self) -> Vec<&MethodId> {
        fn walk<'a>(node: &'a CallNode, out: &mut Vec<&'a MethodId>) {
            out.push(&node.method);
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut methods = Vec::new();
        if let Some(root) = &self.root {
            walk(root, &mut methods);
        }
        methods
    }
}

/// Builds call chains by depth-first expansion over the snapshot's resolved
/// call targets.
pub struct CallGraphBuilder {
    max_depth: usize,
    platform_prefixes: Vec<String>,
}

impl CallGraphBuilder {
    pub fn new(max_depth: usize, platform_prefixes: Vec<String>) -> Self {
        Self {
            max_depth,
            platform_prefixes,
        }
    }

    /// Build the tree for one entry point. Always terminates: a branch ends
    /// when its method already appears on the current root-to-node path or
    /// when the depth bound is exceeded.
    pub fn build(&self, snapshot: &dyn CodeSnapshot, entry_point: &MethodId) -> CallChain {
        let mut on_path = HashSet::new();
        let root = self.expand(snapshot, entry_point.clone(), None, &mut on_path, 0);

        CallChain {
            id: Uuid::new_v4().to_string(),
            entry_point: entry_point.clone(),
            root,
            built_at: Utc::now(),
        }
    }

    fn expand(
        &self,
        snapshot: &dyn CodeSnapshot,
        method: MethodId,
        parent: Option<&str>,
        on_path: &mut HashSet<MethodId>,
        depth: usize,
    ) -> Option<CallNode> {
        if depth > self.max_depth {
            return None;
        }
        // Ancestor recurrence guards direct and mutual recursion. The set is
        // scoped to the current path, so the same method may still appear in
        // independent sibling branches.
        if on_path.contains(&method) {
            return None;
        }

        let node_id = Uuid::new_v4().to_string();
        let targets: Vec<MethodId> = snapshot
            .call_targets(&method)
            .into_iter()
            .filter(|target| !self.is_platform(target))
            .collect();

        on_path.insert(method.clone());
        let mut children = Vec::new();
        for target in targets {
            if let Some(child) = self.expand(snapshot, target, Some(&node_id), on_path, depth + 1) {
                children.push(child);
            }
        }
        on_path.remove(&method);

        Some(CallNode {
            id: node_id,
            method,
            parent: parent.map(str::to_string),
            children,
            depth,
        })
    }

    /// Platform/standard-library targets are not traversed; only
    /// application code ends up in the chain.
    fn is_platform(&self, id: &MethodId) -> bool {
        self.platform_prefixes
            .iter()
            .any(|prefix| id.type_name.starts_with(prefix))
    }
}

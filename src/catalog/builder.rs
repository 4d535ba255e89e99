//! Top-down construction of a catalog tree
//!
//! The builder owns the tree while a harvest is in progress. Every node that
//! still waits for expansion is a *placeholder*: a leaf holding the URL to
//! visit, tracked by its `NodePath`. Each placeholder is resolved exactly once,
//! either into its expansion or into an error marker; resolving a path that is
//! not pending is an error, so a node's kind never changes after it is written.

use crate::catalog::{CatalogNode, CatalogTree, ErrorMarker, NodePath};
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;

/// Section name → group name → group URL, as extracted from a category page
pub type SectionMap = IndexMap<String, IndexMap<String, String>>;

/// Component name → component markup, as extracted from a group page
pub type ComponentMap = IndexMap<String, String>;

/// Errors raised when the builder is asked to break the tree's invariants
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node is not a pending placeholder: {0}")]
    NotPending(NodePath),

    #[error("No node at path: {0}")]
    UnknownPath(NodePath),

    #[error("Placeholder at wrong depth for this expansion: {0}")]
    WrongDepth(NodePath),
}

/// Builds a catalog tree by resolving placeholders keyed by path
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: CatalogTree,
    pending: HashSet<NodePath>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category placeholder holding its base URL
    ///
    /// Returns `None` when a category with the same name already exists; the
    /// first occurrence wins.
    pub fn add_category(&mut self, name: &str, base_url: &str) -> Option<NodePath> {
        if self.tree.contains_key(name) {
            return None;
        }

        let path = NodePath::root().child(name);
        self.tree
            .insert(name, CatalogNode::Leaf(base_url.to_string()));
        self.pending.insert(path.clone());
        Some(path)
    }

    /// Replaces a category placeholder with its sections
    ///
    /// Each group becomes a new placeholder holding the group's URL. Returns
    /// the group placeholders in document order, paired with their URLs.
    pub fn expand_category(
        &mut self,
        path: &NodePath,
        sections: SectionMap,
    ) -> Result<Vec<(NodePath, String)>, TreeError> {
        if path.len() != 1 {
            return Err(TreeError::WrongDepth(path.clone()));
        }

        let mut groups = Vec::new();
        let mut expanded = CatalogTree::new();
        for (section_name, section_groups) in sections {
            let section_path = path.child(section_name.as_str());
            let mut section = CatalogTree::new();
            for (group_name, group_url) in section_groups {
                groups.push((section_path.child(group_name.as_str()), group_url.clone()));
                section.insert(group_name, CatalogNode::Leaf(group_url));
            }
            expanded.insert(section_name, CatalogNode::Branch(section));
        }

        self.resolve(path, CatalogNode::Branch(expanded))?;
        for (group_path, _) in &groups {
            self.pending.insert(group_path.clone());
        }

        Ok(groups)
    }

    /// Replaces a group placeholder with its component leaves
    pub fn expand_group(
        &mut self,
        path: &NodePath,
        components: ComponentMap,
    ) -> Result<(), TreeError> {
        if path.len() != 3 {
            return Err(TreeError::WrongDepth(path.clone()));
        }

        let expanded = components
            .into_iter()
            .map(|(name, markup)| (name, CatalogNode::Leaf(markup)))
            .collect();

        self.resolve(path, CatalogNode::Branch(expanded))
    }

    /// Replaces any placeholder with an error marker
    pub fn fail(&mut self, path: &NodePath, message: impl Into<String>) -> Result<(), TreeError> {
        self.resolve(path, CatalogNode::Error(ErrorMarker::new(message)))
    }

    pub fn is_pending(&self, path: &NodePath) -> bool {
        self.pending.contains(path)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Read-only view of the tree built so far
    pub fn tree(&self) -> &CatalogTree {
        &self.tree
    }

    /// Hands out the finished tree
    ///
    /// Placeholders that were never resolved stay in the tree as URL leaves.
    pub fn finish(self) -> CatalogTree {
        if !self.pending.is_empty() {
            tracing::warn!(
                "Finishing catalog tree with {} unresolved placeholders",
                self.pending.len()
            );
        }
        self.tree
    }

    fn resolve(&mut self, path: &NodePath, node: CatalogNode) -> Result<(), TreeError> {
        if !self.pending.contains(path) {
            return Err(TreeError::NotPending(path.clone()));
        }

        let slot = self
            .slot_mut(path)
            .ok_or_else(|| TreeError::UnknownPath(path.clone()))?;
        *slot = node;
        self.pending.remove(path);
        Ok(())
    }

    fn slot_mut(&mut self, path: &NodePath) -> Option<&mut CatalogNode> {
        let (first, rest) = path.components().split_first()?;
        let mut node = self.tree.get_mut(first)?;
        for key in rest {
            node = match node {
                CatalogNode::Branch(child) => child.get_mut(key)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

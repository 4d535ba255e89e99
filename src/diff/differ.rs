//! Structural comparison of two catalog trees
//!
//! Records are emitted for leaves only. Walk order is stable: keys of the old
//! tree in their order, then keys that exist only in the new tree.

use crate::catalog::{CatalogNode, CatalogTree, NodePath};
use serde::Serialize;
use std::fmt;

/// How a leaf changed between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One changed leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub path: NodePath,
    pub kind: DiffKind,

    /// Leaf text in the old tree; absent for `Added`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_leaf: Option<String>,

    /// Leaf text in the new tree; absent for `Removed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_leaf: Option<String>,
}

impl DiffRecord {
    pub fn added(path: NodePath, text: String) -> Self {
        Self {
            path,
            kind: DiffKind::Added,
            old_leaf: None,
            new_leaf: Some(text),
        }
    }

    pub fn removed(path: NodePath, text: String) -> Self {
        Self {
            path,
            kind: DiffKind::Removed,
            old_leaf: Some(text),
            new_leaf: None,
        }
    }

    pub fn modified(path: NodePath, old: String, new: String) -> Self {
        Self {
            path,
            kind: DiffKind::Modified,
            old_leaf: Some(old),
            new_leaf: Some(new),
        }
    }
}

/// Record counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn from_records(records: &[DiffRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.kind {
                DiffKind::Added => summary.added += 1,
                DiffKind::Removed => summary.removed += 1,
                DiffKind::Modified => summary.modified += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} modified",
            self.added, self.removed, self.modified
        )
    }
}

/// Compares two trees down to their leaves
///
/// Error markers are compared as opaque leaves through their compact JSON
/// text, so a node moving between error and content is `Modified`. Where a
/// branch faces a leaf, every leaf under the branch is reported on its side
/// and the opaque leaf on the other.
pub fn diff_trees(old: &CatalogTree, new: &CatalogTree) -> Vec<DiffRecord> {
    let mut records = Vec::new();
    diff_level(old, new, &NodePath::root(), &mut records);
    records
}

fn diff_level(old: &CatalogTree, new: &CatalogTree, prefix: &NodePath, out: &mut Vec<DiffRecord>) {
    for (key, old_node) in old {
        let path = prefix.child(key.as_str());
        match new.get(key) {
            Some(new_node) => diff_node(old_node, new_node, &path, out),
            None => emit_all(old_node, &path, DiffKind::Removed, out),
        }
    }

    for (key, new_node) in new {
        if !old.contains_key(key) {
            emit_all(new_node, &prefix.child(key.as_str()), DiffKind::Added, out);
        }
    }
}

fn diff_node(old: &CatalogNode, new: &CatalogNode, path: &NodePath, out: &mut Vec<DiffRecord>) {
    match (old, new) {
        (CatalogNode::Branch(old_tree), CatalogNode::Branch(new_tree)) => {
            diff_level(old_tree, new_tree, path, out)
        }
        (CatalogNode::Branch(_), _) | (_, CatalogNode::Branch(_)) => {
            emit_all(old, path, DiffKind::Removed, out);
            emit_all(new, path, DiffKind::Added, out);
        }
        _ => {
            if let (Some(old_text), Some(new_text)) = (old.leaf_text(), new.leaf_text()) {
                if old_text != new_text {
                    out.push(DiffRecord::modified(path.clone(), old_text, new_text));
                }
            }
        }
    }
}

/// Reports every leaf under `node` as added or removed
fn emit_all(node: &CatalogNode, path: &NodePath, kind: DiffKind, out: &mut Vec<DiffRecord>) {
    match node {
        CatalogNode::Branch(tree) => {
            for (key, child) in tree {
                emit_all(child, &path.child(key.as_str()), kind, out);
            }
        }
        leaf => {
            let Some(text) = leaf.leaf_text() else {
                return;
            };
            let record = match kind {
                DiffKind::Removed => DiffRecord::removed(path.clone(), text),
                _ => DiffRecord::added(path.clone(), text),
            };
            out.push(record);
        }
    }
}

use crate::catalog::NodePath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Terminal marker recorded where an expansion failed
///
/// Serializes as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorMarker {
    pub error: String,
}

impl ErrorMarker {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Compact JSON form, used when the marker is compared as an opaque leaf
    pub fn to_leaf_text(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}

/// A single node in a catalog tree
///
/// Variant order matters for untagged deserialization: an object with a lone
/// string `error` field is an error marker, any other string is a leaf, and
/// any other object is a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogNode {
    Error(ErrorMarker),
    Leaf(String),
    Branch(CatalogTree),
}

impl CatalogNode {
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn as_branch(&self) -> Option<&CatalogTree> {
        match self {
            Self::Branch(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(text) => Some(text),
            _ => None,
        }
    }

    /// Text compared byte-for-byte by the differ; `None` for branches
    pub fn leaf_text(&self) -> Option<String> {
        match self {
            Self::Leaf(text) => Some(text.clone()),
            Self::Error(marker) => Some(marker.to_leaf_text()),
            Self::Branch(_) => None,
        }
    }
}

/// Insertion-ordered mapping from display names to catalog nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogTree {
    entries: IndexMap<String, CatalogNode>,
}

impl CatalogTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogNode> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut CatalogNode> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a node, returning the previous node under the same key
    pub fn insert(&mut self, key: impl Into<String>, node: CatalogNode) -> Option<CatalogNode> {
        self.entries.insert(key.into(), node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a node by path; the empty path has no node
    pub fn node_at(&self, path: &NodePath) -> Option<&CatalogNode> {
        let (first, rest) = path.components().split_first()?;
        let mut node = self.entries.get(first)?;
        for key in rest {
            node = node.as_branch()?.entries.get(key)?;
        }
        Some(node)
    }

    /// Visits every leaf and error marker in document order
    pub fn walk_leaves<F>(&self, mut visit: F)
    where
        F: FnMut(&NodePath, &CatalogNode),
    {
        fn walk<F: FnMut(&NodePath, &CatalogNode)>(
            tree: &CatalogTree,
            prefix: &NodePath,
            visit: &mut F,
        ) {
            for (key, node) in &tree.entries {
                let path = prefix.child(key.as_str());
                match node {
                    CatalogNode::Branch(child) => walk(child, &path, visit),
                    _ => visit(&path, node),
                }
            }
        }

        walk(self, &NodePath::root(), &mut visit);
    }

    /// Number of content leaves (error markers excluded)
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.walk_leaves(|_, node| {
            if matches!(node, CatalogNode::Leaf(_)) {
                count += 1;
            }
        });
        count
    }

    /// Paths of every error marker in the tree
    pub fn error_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        self.walk_leaves(|path, node| {
            if node.is_error() {
                paths.push(path.clone());
            }
        });
        paths
    }
}

impl<'a> IntoIterator for &'a CatalogTree {
    type Item = (&'a String, &'a CatalogNode);
    type IntoIter = indexmap::map::Iter<'a, String, CatalogNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, CatalogNode)> for CatalogTree {
    fn from_iter<I: IntoIterator<Item = (String, CatalogNode)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

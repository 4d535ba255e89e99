//! Catalog data model
//!
//! This module defines the nested, name-keyed tree mirroring the catalog's
//! Category → Section → Group → Component hierarchy, along with:
//! - `NodePath`, the key sequence identifying a node
//! - `TreeBuilder`, which grows a tree top-down by resolving placeholders
//! - JSON loading and saving that keeps key order stable

mod builder;
pub mod io;
mod path;
mod tree;

pub use builder::{ComponentMap, SectionMap, TreeBuilder, TreeError};
pub use io::{load_tree, save_tree};
pub use path::NodePath;
pub use tree::{CatalogNode, CatalogTree, ErrorMarker};

/// Number of keys on the path to a component leaf (category, section, group, component)
pub const LEAF_PATH_LEN: usize = 4;

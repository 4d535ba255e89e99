//! URL handling module for Catalog-Harvest
//!
//! This module provides link resolution against the page a link was found on,
//! and shared base-path inference for a set of sibling pages.

mod prefix;
mod resolve;

// Re-export main functions
pub use prefix::common_base_path;
pub use resolve::resolve_link;

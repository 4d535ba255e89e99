//! Snapshot comparison
//!
//! This module compares two harvested trees and records the outcome:
//! - `diff_trees` walks both trees and emits one record per changed leaf
//! - `artifact_identifier` names each artifact safely and uniquely
//! - `DiffArtifactWriter` renders modified leaves to files
//! - `write_summary` adds a markdown overview next to the artifacts

mod differ;
mod identifier;
pub mod render;
mod report;
mod writer;

pub use differ::{diff_trees, DiffKind, DiffRecord, DiffSummary};
pub use identifier::{artifact_identifier, fallback_identifier, DIGEST_HEX_LEN};
pub use render::{DiffRenderer, WordDiffRenderer};
pub use report::{format_summary, write_summary, SUMMARY_FILE};
pub use writer::{Artifact, DiffArtifactWriter};

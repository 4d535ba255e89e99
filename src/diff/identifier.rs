//! Filesystem-safe artifact names
//!
//! An identifier is a readable, sanitized rendering of the path followed by a
//! short digest of the exact path, so paths that sanitize alike stay apart.

use crate::catalog::NodePath;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Hex characters of the path digest kept in each identifier
pub const DIGEST_HEX_LEN: usize = 12;

static FALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Builds the artifact identifier for a leaf path
///
/// Paths with nothing printable in them get a [`fallback_identifier`].
///
/// # Examples
///
/// ```
/// use catalog_harvest::diff::artifact_identifier;
/// use catalog_harvest::NodePath;
///
/// let path: NodePath = ["Marketing", "Page Sections", "Heroes", "Split"].into_iter().collect();
/// let id = artifact_identifier(&path, 120);
/// assert!(id.starts_with("Marketing_Page_Sections_Heroes_Split-"));
/// ```
pub fn artifact_identifier(path: &NodePath, max_len: usize) -> String {
    let body = sanitize(&path.components().join("/"));
    if body.is_empty() {
        return fallback_identifier();
    }

    let digest = path_digest(path);
    let room = max_len.saturating_sub(DIGEST_HEX_LEN + 1);

    // Sanitized text is ASCII, so any byte index is a char boundary
    let body = body[..body.len().min(room)].trim_end_matches('_');
    if body.is_empty() {
        return digest;
    }

    format!("{}-{}", body, digest)
}

/// `diff-<unix-nanos>-<pid>-<seq>`, unique within and across processes
pub fn fallback_identifier() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = FALLBACK_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("diff-{}-{}-{}", nanos, std::process::id(), seq)
}

/// Keeps `[A-Za-z0-9._-]`, maps everything else to a single `_`
fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    out.trim_start_matches(['_', '.'])
        .trim_end_matches('_')
        .to_string()
}

/// Length-prefixed so `["a/b"]` and `["a", "b"]` hash differently
fn path_digest(path: &NodePath) -> String {
    let mut hasher = Sha256::new();
    for component in path.components() {
        hasher.update((component.len() as u64).to_le_bytes());
        hasher.update(component.as_bytes());
    }
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_HEX_LEN);
    digest
}

//! Markdown summary of a diff run
//!
//! Lists the counts, the added and removed leaves, and the modified leaves
//! linked to their artifacts.

use crate::diff::writer::Artifact;
use crate::diff::{DiffKind, DiffRecord, DiffSummary};
use crate::CatalogError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the summary inside the artifact directory
pub const SUMMARY_FILE: &str = "SUMMARY.md";

/// Writes `SUMMARY.md` into `dir`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written summary
/// * `Err(CatalogError::Io)` - Failed to write the file
pub fn write_summary(
    records: &[DiffRecord],
    artifacts: &[Artifact],
    dir: &Path,
) -> Result<PathBuf, CatalogError> {
    let markdown = format_summary(records, artifacts, Utc::now());

    let path = dir.join(SUMMARY_FILE);
    let mut file = File::create(&path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(path)
}

/// Formats the summary as markdown
pub fn format_summary(
    records: &[DiffRecord],
    artifacts: &[Artifact],
    generated_at: DateTime<Utc>,
) -> String {
    let summary = DiffSummary::from_records(records);
    let mut md = String::new();

    md.push_str("# Catalog Diff Summary\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Added**: {}\n", summary.added));
    md.push_str(&format!("- **Removed**: {}\n", summary.removed));
    md.push_str(&format!("- **Modified**: {}\n\n", summary.modified));

    if summary.is_empty() {
        md.push_str("No changes.\n");
        return md;
    }

    let files: HashMap<_, _> = artifacts.iter().map(|a| (&a.path, &a.file)).collect();

    for (kind, heading) in [
        (DiffKind::Modified, "Modified"),
        (DiffKind::Added, "Added"),
        (DiffKind::Removed, "Removed"),
    ] {
        let mut matching = records.iter().filter(|r| r.kind == kind).peekable();
        if matching.peek().is_none() {
            continue;
        }

        md.push_str(&format!("## {}\n\n", heading));
        for record in matching {
            let label = escape_markdown(&record.path.to_string());
            let link = files
                .get(&record.path)
                .and_then(|file| file.file_name())
                .map(|name| name.to_string_lossy().into_owned());

            match link {
                Some(name) => md.push_str(&format!("- [{}]({})\n", label, name)),
                None => md.push_str(&format!("- {}\n", label)),
            }
        }
        md.push('\n');
    }

    md
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '*' | '_' | '`' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

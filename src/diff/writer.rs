//! Artifact files for modified leaves

use crate::catalog::NodePath;
use crate::diff::identifier::{artifact_identifier, fallback_identifier};
use crate::diff::render::{DiffRenderer, WordDiffRenderer};
use crate::diff::{DiffKind, DiffRecord};
use crate::CatalogError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A written artifact and the leaf it describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: NodePath,
    pub file: PathBuf,
}

/// Writes one rendered file per modified leaf into a directory
pub struct DiffArtifactWriter<R: DiffRenderer = WordDiffRenderer> {
    dir: PathBuf,
    max_identifier_len: usize,
    renderer: R,
}

impl DiffArtifactWriter<WordDiffRenderer> {
    pub fn new(dir: impl Into<PathBuf>, max_identifier_len: usize) -> Self {
        Self::with_renderer(dir, max_identifier_len, WordDiffRenderer)
    }
}

impl<R: DiffRenderer> DiffArtifactWriter<R> {
    pub fn with_renderer(dir: impl Into<PathBuf>, max_identifier_len: usize, renderer: R) -> Self {
        Self {
            dir: dir.into(),
            max_identifier_len,
            renderer,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders and writes every `Modified` record
    ///
    /// Added and removed leaves have nothing to compare and only appear in
    /// the summary. Returns the artifacts in record order.
    ///
    /// # Errors
    ///
    /// Any failure to create the directory or write a file is returned.
    pub fn write_all(&self, records: &[DiffRecord]) -> Result<Vec<Artifact>, CatalogError> {
        fs::create_dir_all(&self.dir)?;

        let mut artifacts = Vec::new();
        let mut taken = HashSet::new();

        for record in records.iter().filter(|r| r.kind == DiffKind::Modified) {
            let mut identifier = artifact_identifier(&record.path, self.max_identifier_len);
            if !taken.insert(identifier.clone()) {
                tracing::warn!("Identifier '{}' already used; falling back", identifier);
                identifier = fallback_identifier();
                taken.insert(identifier.clone());
            }

            let file = self
                .dir
                .join(format!("{}.{}", identifier, self.renderer.extension()));
            let body = self.renderer.render(
                &record.path.to_string(),
                record.old_leaf.as_deref().unwrap_or_default(),
                record.new_leaf.as_deref().unwrap_or_default(),
            );
            fs::write(&file, body)?;

            tracing::debug!("Wrote {} for {}", file.display(), record.path);
            artifacts.push(Artifact {
                path: record.path.clone(),
                file,
            });
        }

        tracing::info!(
            "Wrote {} diff artifacts to {}",
            artifacts.len(),
            self.dir.display()
        );
        Ok(artifacts)
    }
}

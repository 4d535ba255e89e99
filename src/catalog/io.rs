//! Reading and writing catalog trees as JSON
//!
//! Objects are branches, strings are leaves, and `{"error": "..."}` objects are
//! failure markers. Key order is preserved in both directions so two runs over
//! an unchanged catalog produce byte-identical files.

use crate::catalog::CatalogTree;
use crate::CatalogError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Loads a catalog tree from a JSON file
pub fn load_tree(path: &Path) -> Result<CatalogTree, CatalogError> {
    let file = File::open(path)?;
    let tree = serde_json::from_reader(BufReader::new(file))?;
    Ok(tree)
}

/// Writes a catalog tree as pretty-printed JSON, creating parent directories
pub fn save_tree(tree: &CatalogTree, path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

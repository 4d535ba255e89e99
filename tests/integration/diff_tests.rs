//! Integration tests for snapshot comparison and artifact output

use catalog_harvest::catalog::{load_tree, save_tree};
use catalog_harvest::diff::{
    artifact_identifier, diff_trees, write_summary, DiffArtifactWriter, DiffKind, DiffRecord,
    DiffSummary, SUMMARY_FILE,
};
use catalog_harvest::{CatalogNode, CatalogTree, ErrorMarker, NodePath};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn tree_from_json(json: &str) -> CatalogTree {
    serde_json::from_str(json).unwrap()
}

fn path(keys: &[&str]) -> NodePath {
    keys.iter().copied().collect()
}

fn snapshot_a() -> CatalogTree {
    tree_from_json(
        r#"{
            "A": { "S": { "G": { "X": "<div class=\"p-4\">x</div>" } } },
            "Gone": { "S": { "G": { "Z": "z" } } },
            "Flaky": { "error": "Timed out after 30s waiting for https://x/flaky/" }
        }"#,
    )
}

fn snapshot_b() -> CatalogTree {
    tree_from_json(
        r#"{
            "A": { "S": { "G": { "X": "<div class=\"p-6\">x</div>", "Y": "y" } } },
            "Flaky": { "S": { "G": { "W": "w" } } }
        }"#,
    )
}

#[test]
fn test_modified_and_added_leaf() {
    let old = tree_from_json(r#"{ "A": { "S": { "G": { "X": "1" } } } }"#);
    let new = tree_from_json(r#"{ "A": { "S": { "G": { "X": "2", "Y": "3" } } } }"#);

    let records = diff_trees(&old, &new);
    assert_eq!(
        records,
        vec![
            DiffRecord::modified(path(&["A", "S", "G", "X"]), "1".into(), "2".into()),
            DiffRecord::added(path(&["A", "S", "G", "Y"]), "3".into()),
        ]
    );
}

#[test]
fn test_self_diff_is_empty() {
    for tree in [snapshot_a(), snapshot_b(), CatalogTree::new()] {
        assert!(diff_trees(&tree, &tree).is_empty());
    }
}

#[test]
fn test_diff_is_symmetric() {
    let forward = diff_trees(&snapshot_a(), &snapshot_b());
    let backward = diff_trees(&snapshot_b(), &snapshot_a());

    let flip = |kind: DiffKind| match kind {
        DiffKind::Added => DiffKind::Removed,
        DiffKind::Removed => DiffKind::Added,
        DiffKind::Modified => DiffKind::Modified,
    };

    let mut expected: Vec<(String, DiffKind, Option<String>, Option<String>)> = forward
        .iter()
        .map(|r| (r.path.to_string(), flip(r.kind), r.new_leaf.clone(), r.old_leaf.clone()))
        .collect();
    let mut actual: Vec<(String, DiffKind, Option<String>, Option<String>)> = backward
        .iter()
        .map(|r| (r.path.to_string(), r.kind, r.old_leaf.clone(), r.new_leaf.clone()))
        .collect();

    let key = |t: &(String, DiffKind, Option<String>, Option<String>)| (t.0.clone(), t.1.as_str());
    expected.sort_by_key(key);
    actual.sort_by_key(key);
    assert_eq!(expected, actual);
}

#[test]
fn test_diff_is_complete() {
    let records = diff_trees(&snapshot_a(), &snapshot_b());
    let summary = DiffSummary::from_records(&records);

    // X modified; Y and W added; Z and the Flaky marker removed
    assert_eq!(summary.modified, 1);
    assert_eq!(summary.added, 2);
    assert_eq!(summary.removed, 2);

    let removed: Vec<String> = records
        .iter()
        .filter(|r| r.kind == DiffKind::Removed)
        .map(|r| r.path.to_string())
        .collect();
    assert_eq!(removed, vec!["Gone / S / G / Z", "Flaky"]);

    let marker = records
        .iter()
        .find(|r| r.path == path(&["Flaky"]))
        .unwrap();
    assert_eq!(
        marker.old_leaf.as_deref(),
        Some(r#"{"error":"Timed out after 30s waiting for https://x/flaky/"}"#)
    );
}

#[test]
fn test_error_marker_recovery_is_modified() {
    let old = tree_from_json(r#"{ "A": { "S": { "G": { "error": "all 2 component blocks failed" } } } }"#);
    let mut new = CatalogTree::new();
    new.insert(
        "A",
        CatalogNode::Branch(tree_from_json(r#"{ "S": { "G": "recovered" } }"#)),
    );

    let records = diff_trees(&old, &new);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, DiffKind::Modified);
    assert_eq!(records[0].path, path(&["A", "S", "G"]));
    assert_eq!(
        records[0].old_leaf,
        Some(ErrorMarker::new("all 2 component blocks failed").to_leaf_text())
    );
}

#[test]
fn test_identifiers_do_not_collide() {
    let mut seen = HashSet::new();
    let fragments = ["", "/", "a/b", "日本", "Hero Sections", "..", "x", "Ünïcödé", "a b", "_"];

    for i in 0..1000 {
        let keys = [
            fragments[i % fragments.len()].to_string(),
            format!("{}{}", fragments[(i / 10) % fragments.len()], i),
            fragments[(i / 100) % fragments.len()].to_string(),
        ];
        let id = artifact_identifier(&keys.iter().cloned().collect(), 120);

        assert!(!id.is_empty());
        assert!(id.len() <= 120, "{} is too long", id);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
            "{} is not filesystem-safe",
            id
        );
        assert!(seen.insert(id.clone()), "collision on {}", id);
    }
}

#[test]
fn test_illegal_only_path_falls_back_uniquely() {
    let illegal = path(&["日本語", "/", "???"]);
    let ids: HashSet<String> = (0..50).map(|_| artifact_identifier(&illegal, 120)).collect();

    assert_eq!(ids.len(), 50);
    assert!(ids.iter().all(|id| id.starts_with("diff-")));
}

#[test]
fn test_end_to_end_artifacts() {
    let dir = TempDir::new().unwrap();
    let old_path = dir.path().join("old.json");
    let new_path = dir.path().join("new.json");
    save_tree(&snapshot_a(), &old_path).unwrap();
    save_tree(&snapshot_b(), &new_path).unwrap();

    let records = diff_trees(&load_tree(&old_path).unwrap(), &load_tree(&new_path).unwrap());

    let out = dir.path().join("diffs");
    let writer = DiffArtifactWriter::new(&out, 120);
    let artifacts = writer.write_all(&records).unwrap();
    assert_eq!(artifacts.len(), 1);

    let html = fs::read_to_string(&artifacts[0].file).unwrap();
    assert!(html.contains("<title>A / S / G / X</title>"));
    assert!(html.contains("<del>class=&quot;p-4&quot;&gt;x&lt;/div&gt;</del>"));
    assert!(html.contains("<ins>class=&quot;p-6&quot;&gt;x&lt;/div&gt;</ins>"));

    let summary = write_summary(&records, &artifacts, &out).unwrap();
    assert_eq!(summary, out.join(SUMMARY_FILE));

    let md = fs::read_to_string(summary).unwrap();
    let artifact_name = artifacts[0].file.file_name().unwrap().to_string_lossy();
    assert!(md.contains(&format!("- [A / S / G / X]({})", artifact_name)));
    assert!(md.contains("- **Removed**: 2"));

    // One artifact plus the summary
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
}

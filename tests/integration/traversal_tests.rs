//! Integration tests for the harvest loop
//!
//! These tests drive the orchestrator over an in-memory site and check how
//! failures at each level are isolated in the resulting tree.

mod support;

use catalog_harvest::browser::{CookieRecord, NavState};
use catalog_harvest::browser::WaitPolicy;
use catalog_harvest::catalog::{load_tree, save_tree, LEAF_PATH_LEN};
use catalog_harvest::diff::{diff_trees, DiffKind};
use catalog_harvest::traversal::{authenticate, login, Orchestrator};
use catalog_harvest::{CatalogError, CatalogNode, CatalogTree, NodePath};
use std::time::Duration;
use support::{
    category_page, extractor, extractor_with, group_page, navigator, root_page, url, FakeSession,
    ROOT,
};
use tempfile::TempDir;

/// Three categories: Marketing (two sections), Application UI, Ecommerce
fn catalog_site() -> FakeSession {
    FakeSession::new()
        .page(
            ROOT,
            root_page(&[
                (
                    "Marketing",
                    vec!["/components/marketing/heroes", "/components/marketing/features"],
                ),
                (
                    "Application UI",
                    vec!["/components/app/forms/inputs", "/components/app/forms/selects"],
                ),
                (
                    "Ecommerce",
                    vec!["/components/ecommerce/carts", "/components/ecommerce/orders"],
                ),
            ]),
        )
        .page(
            url("/components/marketing/"),
            category_page(&[
                (
                    "Page Sections",
                    vec![
                        ("Heroes", "/components/marketing/heroes"),
                        ("Features", "/components/marketing/features"),
                    ],
                ),
                ("Elements", vec![("Banners", "/components/marketing/banners")]),
            ]),
        )
        .page(
            url("/components/marketing/heroes"),
            group_page(&[("Simple", Some("<div>simple</div>")), ("Split", Some("<div>split</div>"))]),
        )
        .page(
            url("/components/marketing/features"),
            group_page(&[("Grid", Some("<ul>grid</ul>")), ("Broken", None)]),
        )
        .page(
            url("/components/marketing/banners"),
            group_page(&[("Top", Some("<aside>top</aside>"))]),
        )
        .page(
            url("/components/app/forms/"),
            category_page(&[(
                "Forms",
                vec![
                    ("Inputs", "/components/app/forms/inputs"),
                    ("Selects", "/components/app/forms/selects"),
                ],
            )]),
        )
        .page(
            url("/components/app/forms/inputs"),
            group_page(&[("Text", Some("<input type=\"text\">"))]),
        )
        .page(
            url("/components/app/forms/selects"),
            group_page(&[("Native", Some("<select></select>"))]),
        )
        .page(
            url("/components/ecommerce/"),
            category_page(&[(
                "Checkout",
                vec![("Carts", "/components/ecommerce/carts")],
            )]),
        )
        .page(
            url("/components/ecommerce/carts"),
            group_page(&[("Slide-over", Some("<div>cart</div>"))]),
        )
}

async fn harvest(session: FakeSession) -> Result<CatalogTree, CatalogError> {
    let mut orchestrator = Orchestrator::new(navigator(session), extractor());
    orchestrator.harvest(ROOT).await
}

fn node<'a>(tree: &'a CatalogTree, keys: &[&str]) -> &'a CatalogNode {
    let path: NodePath = keys.iter().copied().collect();
    tree.node_at(&path)
        .unwrap_or_else(|| panic!("no node at {}", path))
}

fn error_message(node: &CatalogNode) -> &str {
    match node {
        CatalogNode::Error(marker) => &marker.error,
        other => panic!("expected an error marker, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_harvest() {
    let mut orchestrator = Orchestrator::new(navigator(catalog_site()), extractor());
    let tree = orchestrator.harvest(ROOT).await.unwrap();

    let categories: Vec<&str> = tree.keys().collect();
    assert_eq!(categories, vec!["Marketing", "Application UI", "Ecommerce"]);

    assert_eq!(
        node(&tree, &["Marketing", "Page Sections", "Heroes", "Simple"]).as_leaf(),
        Some("<div>simple</div>")
    );
    assert_eq!(
        node(&tree, &["Application UI", "Forms", "Inputs", "Text"]).as_leaf(),
        Some("<input type=\"text\">")
    );

    // One block without code fails its whole group
    let features = node(&tree, &["Marketing", "Page Sections", "Features"]);
    assert_eq!(
        error_message(features),
        "1 of 2 component blocks failed: block 1 ('Broken'): code did not render"
    );
    assert_eq!(tree.error_paths().len(), 1);

    let stats = orchestrator.stats();
    assert_eq!(stats.categories, 3);
    assert_eq!(stats.groups, 6);
    assert_eq!(stats.groups_failed, 1);
    assert_eq!(stats.components, 6);
    assert_eq!(stats.block_failures, 1);
    assert_eq!(stats.error_markers(), 1);
}

#[tokio::test]
async fn test_partially_read_group_is_not_mistaken_for_removal() {
    let before = harvest(catalog_site().page(
        url("/components/app/forms/inputs"),
        group_page(&[("Text", Some("<input type=\"text\">")), ("Area", Some("<textarea>"))]),
    ))
    .await
    .unwrap();
    let after = harvest(catalog_site().page(
        url("/components/app/forms/inputs"),
        group_page(&[("Text", Some("<input type=\"text\">")), ("Area", None)]),
    ))
    .await
    .unwrap();

    let inputs = ["Application UI", "Forms", "Inputs"];
    assert!(node(&before, &inputs).is_branch());
    assert!(error_message(node(&after, &inputs)).contains("block 1 ('Area')"));

    // The diff carries the failure itself next to the leaves it replaced
    let group: NodePath = inputs.iter().copied().collect();
    let records = diff_trees(&before, &after);
    let marker = records
        .iter()
        .find(|r| r.path == group)
        .expect("error marker is reported");
    assert_eq!(marker.kind, DiffKind::Added);
    assert!(marker.new_leaf.as_deref().unwrap().contains("component blocks failed"));
}

#[tokio::test]
async fn test_single_link_category_is_one_group() {
    let session = catalog_site()
        .page(
            ROOT,
            root_page(&[
                ("Solo", vec!["/components/solo/forms/inputs"]),
                ("Ecommerce", vec!["/components/ecommerce/carts", "/components/ecommerce/orders"]),
            ]),
        )
        .page(
            url("/components/solo/forms/inputs"),
            group_page(&[("Text", Some("<input>"))]),
        );
    let visits = session.visits();
    let tree = harvest(session).await.unwrap();

    assert_eq!(
        node(&tree, &["Solo", "Solo", "inputs", "Text"]).as_leaf(),
        Some("<input>")
    );
    assert!(tree.error_paths().is_empty());

    // The group page is harvested without looking for a category page
    let visits = visits.lock().unwrap();
    assert_eq!(visits[1], url("/components/solo/forms/inputs"));
    assert_eq!(visits[2], url("/components/ecommerce/"));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_wait_runs_once_per_group() {
    let delay = Duration::from_secs(1);
    let mut orchestrator = Orchestrator::new(
        navigator(catalog_site()),
        extractor_with(WaitPolicy::Fixed(delay)),
    );
    let tree = orchestrator.harvest(ROOT).await.unwrap();

    assert_eq!(
        node(&tree, &["Marketing", "Page Sections", "Heroes", "Split"]).as_leaf(),
        Some("<div>split</div>")
    );
    let stats = orchestrator.stats();
    assert_eq!(stats.groups, 6);
    assert!(stats.elapsed >= delay * 6, "took {:?}", stats.elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_history_does_not_stop_the_walk() {
    let session = catalog_site().stuck_history();
    let visits = session.visits();
    let tree = harvest(session).await.unwrap();

    assert_eq!(
        node(&tree, &["Marketing", "Elements", "Banners", "Top"]).as_leaf(),
        Some("<aside>top</aside>")
    );
    assert!(node(&tree, &["Application UI", "Forms", "Selects", "Native"])
        .as_leaf()
        .is_some());
    assert!(node(&tree, &["Ecommerce", "Checkout", "Carts", "Slide-over"])
        .as_leaf()
        .is_some());
    // Only the group with an unreadable block failed
    assert_eq!(tree.error_paths().len(), 1);

    let visits = visits.lock().unwrap();
    assert_eq!(visits[4], url("/components/marketing/banners"));
}

#[tokio::test]
async fn test_group_failure_is_isolated() {
    let session = catalog_site().hanging(url("/components/marketing/features"));
    let tree = harvest(session).await.unwrap();

    let failed = node(&tree, &["Marketing", "Page Sections", "Features"]);
    assert!(error_message(failed).contains("Timed out"));

    // Sibling group, sibling section and other categories are complete
    assert!(node(&tree, &["Marketing", "Page Sections", "Heroes"]).is_branch());
    assert_eq!(
        node(&tree, &["Marketing", "Elements", "Banners", "Top"]).as_leaf(),
        Some("<aside>top</aside>")
    );
    assert!(node(&tree, &["Application UI", "Forms", "Selects", "Native"])
        .as_leaf()
        .is_some());
    assert!(node(&tree, &["Ecommerce", "Checkout", "Carts", "Slide-over"])
        .as_leaf()
        .is_some());

    assert_eq!(tree.error_paths().len(), 1);
}

#[tokio::test]
async fn test_category_timeout_becomes_error_marker() {
    let session = catalog_site().hanging(url("/components/app/forms/"));
    let tree = harvest(session).await.unwrap();

    let failed = node(&tree, &["Application UI"]);
    assert!(error_message(failed).contains("Timed out"));

    assert!(node(&tree, &["Marketing"]).is_branch());
    assert!(node(&tree, &["Ecommerce", "Checkout", "Carts"]).is_branch());
}

#[tokio::test]
async fn test_unreachable_category_becomes_error_marker() {
    let session = FakeSession::new().page(
        ROOT,
        root_page(&[("Missing", vec!["/components/missing/a", "/components/missing/b"])]),
    );
    let tree = harvest(session).await.unwrap();

    assert!(error_message(node(&tree, &["Missing"])).contains("ERR_NAME_NOT_RESOLVED"));
}

#[tokio::test]
async fn test_category_without_links() {
    let session = catalog_site().page(
        ROOT,
        root_page(&[
            ("Empty", vec![]),
            ("Ecommerce", vec!["/components/ecommerce/carts", "/components/ecommerce/orders"]),
        ]),
    );
    let tree = harvest(session).await.unwrap();

    assert_eq!(error_message(node(&tree, &["Empty"])), "no linked pages");
    assert!(node(&tree, &["Ecommerce"]).is_branch());
}

#[tokio::test]
async fn test_all_blocks_failed_marks_group() {
    let session = catalog_site().page(
        url("/components/app/forms/inputs"),
        group_page(&[("Text", None), ("Area", None)]),
    );
    let tree = harvest(session).await.unwrap();

    let failed = node(&tree, &["Application UI", "Forms", "Inputs"]);
    assert!(error_message(failed).starts_with("all 2 component blocks failed"));
    assert!(node(&tree, &["Application UI", "Forms", "Selects"]).is_branch());
}

#[tokio::test]
async fn test_root_failure_is_fatal() {
    let session = FakeSession::new().hanging(ROOT);
    let err = harvest(session).await.unwrap_err();
    assert!(matches!(err, CatalogError::RootUnavailable { .. }));
}

#[tokio::test]
async fn test_root_without_categories_is_fatal() {
    let session = FakeSession::new().page(ROOT, "<html><body><form>Sign in</form></body></html>");
    let err = harvest(session).await.unwrap_err();
    assert!(matches!(err, CatalogError::Evaluation(_)));
}

#[tokio::test]
async fn test_leaf_depth_is_uniform() {
    let session = catalog_site()
        .hanging(url("/components/marketing/banners"))
        .hanging(url("/components/ecommerce/"));
    let tree = harvest(session).await.unwrap();

    let mut leaves = 0;
    tree.walk_leaves(|path, node| {
        if node.is_error() {
            assert!(path.len() < LEAF_PATH_LEN, "error marker at {}", path);
        } else {
            leaves += 1;
            assert_eq!(path.len(), LEAF_PATH_LEN, "leaf at {}", path);
        }
    });
    assert_eq!(leaves, tree.leaf_count());
    // Both hanging pages, plus Features with its unreadable block
    assert_eq!(tree.error_paths().len(), 3);
}

#[tokio::test]
async fn test_visit_order_returns_after_each_group() {
    let session = catalog_site();
    let visits = session.visits();
    harvest(session).await.unwrap();

    let visits = visits.lock().unwrap();
    assert_eq!(visits[0], ROOT);
    assert_eq!(visits[1], url("/components/marketing/"));
    assert_eq!(visits[2], url("/components/marketing/heroes"));
    assert_eq!(visits[3], url("/components/marketing/features"));
}

#[tokio::test]
async fn test_harvested_tree_survives_json() {
    let session = catalog_site().hanging(url("/components/ecommerce/"));
    let tree = harvest(session).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    save_tree(&tree, &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"error\": \"Timed out"));

    let loaded = load_tree(&path).unwrap();
    assert_eq!(loaded, tree);
}

#[tokio::test]
async fn test_login_captures_cookies() {
    let cookies = vec![CookieRecord::new("session", "abc")];
    let mut nav = navigator(catalog_site().with_cookies(cookies.clone()));

    let captured = login(&mut nav, ROOT, "section", Duration::from_millis(5))
        .await
        .unwrap();
    assert_eq!(captured, cookies);
}

#[tokio::test]
async fn test_login_times_out() {
    let mut nav = navigator(
        catalog_site()
            .with_cookies(vec![CookieRecord::new("session", "abc")])
            .not_ready(ROOT),
    );

    let err = login(&mut nav, ROOT, "section", Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Authentication(_)));
}

#[tokio::test]
async fn test_login_without_cookies_fails() {
    let mut nav = navigator(catalog_site());
    let err = login(&mut nav, ROOT, "section", Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Authentication(_)));
}

#[tokio::test]
async fn test_authenticate_then_harvest() {
    let mut nav = navigator(catalog_site());
    authenticate(&mut nav, ROOT, &[CookieRecord::new("session", "abc")])
        .await
        .unwrap();
    assert_eq!(nav.state(), NavState::Loaded);
    assert_eq!(nav.cookies().await.unwrap().len(), 1);

    let mut orchestrator = Orchestrator::new(nav, extractor());
    let tree = orchestrator.harvest(ROOT).await.unwrap();
    assert_eq!(tree.len(), 3);

    let mut nav = orchestrator.into_navigator();
    nav.close().await.unwrap();
    assert_eq!(nav.state(), NavState::Closed);
}

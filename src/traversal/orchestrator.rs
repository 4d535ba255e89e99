//! Harvest loop
//!
//! The walk is strictly top-down over one page. Each category and group is
//! resolved in the [`TreeBuilder`] exactly once: either expanded, or replaced
//! by an error marker carrying the failure message. Only the root page is
//! allowed to abort the run.

use crate::browser::{BrowserSession, Navigator};
use crate::catalog::{CatalogTree, NodePath, SectionMap, TreeBuilder, TreeError};
use crate::extract::{CategoryLinks, ComponentExtraction, Extractor};
use crate::traversal::HarvestStats;
use crate::CatalogError;
use indexmap::IndexMap;
use tokio::time::Instant;

/// Drives a navigator and an extractor over the whole catalog
pub struct Orchestrator<S: BrowserSession> {
    nav: Navigator<S>,
    extractor: Extractor,
    stats: HarvestStats,
}

impl<S: BrowserSession> Orchestrator<S> {
    pub fn new(nav: Navigator<S>, extractor: Extractor) -> Self {
        Self {
            nav,
            extractor,
            stats: HarvestStats::default(),
        }
    }

    /// Counters from the last harvest
    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    /// Gives the navigator back, e.g. to close the session
    pub fn into_navigator(self) -> Navigator<S> {
        self.nav
    }

    /// Harvests the catalog reachable from `root_url`
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogTree)` - Every category, with failed nodes as error markers
    /// * `Err(CatalogError::RootUnavailable)` - The root page did not load
    /// * `Err(CatalogError::Evaluation)` - The root page listed no categories
    pub async fn harvest(&mut self, root_url: &str) -> Result<CatalogTree, CatalogError> {
        let started = Instant::now();
        self.stats = HarvestStats::default();

        tracing::info!("Starting harvest at {}", root_url);
        self.nav
            .navigate(root_url)
            .await
            .map_err(|source| CatalogError::RootUnavailable {
                url: root_url.to_string(),
                source,
            })?;

        let categories = self.extractor.categories(&mut self.nav).await?;

        let mut builder = TreeBuilder::new();
        let mut pending = Vec::with_capacity(categories.len());
        for (name, links) in categories {
            match builder.add_category(&name, links.url()) {
                Some(path) => pending.push((path, links)),
                None => tracing::warn!("Duplicate category '{}'; keeping the first", name),
            }
        }

        let total = pending.len();
        tracing::info!("Found {} categories", total);

        for (index, (path, links)) in pending.iter().enumerate() {
            tracing::info!("[{}/{}] Harvesting category '{}'", index + 1, total, path);
            self.stats.categories += 1;
            match links {
                CategoryLinks::Listing(base_url) => {
                    self.harvest_category(&mut builder, path, base_url).await?
                }
                CategoryLinks::Single { label, url } => {
                    self.harvest_single(&mut builder, path, label, url).await?
                }
            }
        }

        let tree = builder.finish();
        self.stats.elapsed = started.elapsed();
        self.stats.log();

        Ok(tree)
    }

    /// Expands one category, isolating its failures in the tree
    ///
    /// Only a broken builder invariant is returned as an error.
    async fn harvest_category(
        &mut self,
        builder: &mut TreeBuilder,
        path: &NodePath,
        base_url: &str,
    ) -> Result<(), TreeError> {
        if base_url.is_empty() {
            self.stats.categories_failed += 1;
            return fail(builder, path, "no linked pages");
        }

        if let Err(e) = self.nav.navigate(base_url).await {
            self.stats.categories_failed += 1;
            return fail(builder, path, e.to_string());
        }

        let sections = match self.extractor.sections(&mut self.nav).await {
            Ok(sections) => sections,
            Err(e) => {
                self.stats.categories_failed += 1;
                return fail(builder, path, e.to_string());
            }
        };

        let groups = builder.expand_category(path, sections)?;
        tracing::debug!("'{}' has {} groups", path, groups.len());

        for (group_path, url) in &groups {
            self.harvest_group(builder, group_path, url).await?;
        }

        Ok(())
    }

    /// Expands a category that links one page straight into one group
    ///
    /// The section takes the category's name and the group takes the link's
    /// label, so leaves keep the usual depth.
    async fn harvest_single(
        &mut self,
        builder: &mut TreeBuilder,
        path: &NodePath,
        label: &str,
        url: &str,
    ) -> Result<(), TreeError> {
        tracing::debug!("'{}' links a single page; harvesting it as one group", path);

        let section = path.name().unwrap_or(label).to_string();
        let mut sections = SectionMap::new();
        sections.insert(section, IndexMap::from([(label.to_string(), url.to_string())]));

        for (group_path, url) in &builder.expand_category(path, sections)? {
            self.harvest_group(builder, group_path, url).await?;
        }

        Ok(())
    }

    /// Expands one group into its components
    ///
    /// Any block that fails to read fails the whole group, so a partial page
    /// never looks like a complete one.
    async fn harvest_group(
        &mut self,
        builder: &mut TreeBuilder,
        path: &NodePath,
        url: &str,
    ) -> Result<(), TreeError> {
        self.stats.groups += 1;

        if let Err(e) = self.nav.navigate(url).await {
            self.stats.groups_failed += 1;
            return fail(builder, path, e.to_string());
        }

        let result = match self.extractor.components(&mut self.nav).await {
            Err(e) => {
                self.stats.groups_failed += 1;
                fail(builder, path, e.to_string())
            }
            Ok(extraction) if !extraction.failures.is_empty() => {
                self.stats.groups_failed += 1;
                self.stats.block_failures += extraction.failures.len();
                fail(builder, path, block_failure_message(&extraction))
            }
            Ok(extraction) => {
                self.stats.components += extraction.components.len();
                builder.expand_group(path, extraction.components)
            }
        };

        // The next group is reached by absolute URL, so a failed return is harmless
        if self.nav.state().is_loaded() {
            if let Err(e) = self.nav.go_back().await {
                tracing::warn!("Could not go back from '{}': {}", path, e);
            }
        }

        result
    }
}

/// Names every failed block of a group page
fn block_failure_message(extraction: &ComponentExtraction) -> String {
    let failed = extraction.failures.len();
    let detail = extraction
        .failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    if extraction.all_failed() {
        format!("all {} component blocks failed: {}", failed, detail)
    } else {
        format!(
            "{} of {} component blocks failed: {}",
            failed,
            failed + extraction.components.len(),
            detail
        )
    }
}

fn fail(builder: &mut TreeBuilder, path: &NodePath, message: impl Into<String>) -> Result<(), TreeError> {
    let message = message.into();
    tracing::warn!("'{}' failed: {}", path, message);
    builder.fail(path, message)
}

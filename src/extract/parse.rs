//! Structural parsing of rendered catalog pages
//!
//! Every function here works on an HTML snapshot, so the hierarchy rules can
//! be exercised against fixture documents without a browser.

use crate::browser::RevealReport;
use crate::catalog::{ComponentMap, SectionMap};
use crate::config::SelectorConfig;
use crate::url::{common_base_path, resolve_link};
use crate::{ConfigError, EvaluationError};
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use url::Url;

/// A component block that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
    /// Position of the block on the page
    pub index: usize,

    /// Heading, when the block had one
    pub heading: Option<String>,

    pub reason: String,
}

impl fmt::Display for BlockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.heading {
            Some(heading) => write!(f, "block {} ('{}'): {}", self.index, heading, self.reason),
            None => write!(f, "block {}: {}", self.index, self.reason),
        }
    }
}

/// Everything read from one group page
#[derive(Debug, Clone, Default)]
pub struct ComponentExtraction {
    /// Component name → code, in page order
    pub components: ComponentMap,

    /// Blocks that failed individually
    pub failures: Vec<BlockFailure>,
}

impl ComponentExtraction {
    /// True when blocks were found but none could be read
    pub fn all_failed(&self) -> bool {
        self.components.is_empty() && !self.failures.is_empty()
    }
}

/// What a category heading on the root page links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLinks {
    /// Several pages, enumerated from the category page at their shared
    /// base path; empty when the category links nothing usable
    Listing(String),

    /// Exactly one page, which is harvested directly as the only group
    Single { label: String, url: String },
}

impl CategoryLinks {
    /// URL held by the category placeholder
    pub fn url(&self) -> &str {
        match self {
            CategoryLinks::Listing(base) => base,
            CategoryLinks::Single { url, .. } => url,
        }
    }
}

/// Trims and collapses runs of whitespace into single spaces
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Inserts unless the key already exists; the first occurrence wins
fn insert_first<V>(map: &mut IndexMap<String, V>, key: String, value: V, what: &str) {
    if map.contains_key(&key) {
        tracing::warn!("Duplicate {} '{}'; keeping the first", what, key);
    } else {
        map.insert(key, value);
    }
}

/// Last non-empty path segment of a URL
fn last_segment(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// Compiled selectors for every level of the hierarchy
#[derive(Debug, Clone)]
pub struct PageParser {
    raw: SelectorConfig,
    category_section: Selector,
    category_heading: Selector,
    category_link: Selector,
    subsection: Selector,
    subsection_heading: Selector,
    group_label: Selector,
    group_entry: Selector,
    component_block: Selector,
    component_heading: Selector,
    component_code: Selector,
}

fn compile(name: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{} ({})", e, name),
    })
}

impl PageParser {
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        // Labels and links are read as one run so their document order survives
        let group_entry = format!("{}, {}", config.group_label, config.group_link);

        Ok(Self {
            raw: config.clone(),
            category_section: compile("category-section", &config.category_section)?,
            category_heading: compile("category-heading", &config.category_heading)?,
            category_link: compile("category-link", &config.category_link)?,
            subsection: compile("subsection", &config.subsection)?,
            subsection_heading: compile("subsection-heading", &config.subsection_heading)?,
            group_label: compile("group-label", &config.group_label)?,
            group_entry: compile("group-label, group-link", &group_entry)?,
            component_block: compile("component-block", &config.component_block)?,
            component_heading: compile("component-heading", &config.component_heading)?,
            component_code: compile("component-code", &config.component_code)?,
        })
    }

    /// Selector strings as configured
    pub fn selectors(&self) -> &SelectorConfig {
        &self.raw
    }

    /// Reads the root page: category name → where its pages live
    ///
    /// A category whose links share nothing, or that has no links at all,
    /// maps to an empty listing; the caller decides what that means. A
    /// category whose links all point at one page has nothing to enumerate.
    pub fn categories(
        &self,
        html: &str,
        page_url: &Url,
    ) -> Result<IndexMap<String, CategoryLinks>, EvaluationError> {
        let document = Html::parse_document(html);
        let mut categories = IndexMap::new();
        let mut seen = 0;

        for section in document.select(&self.category_section) {
            seen += 1;

            let name = match section.select(&self.category_heading).next() {
                Some(heading) => element_text(heading),
                None => String::new(),
            };
            if name.is_empty() {
                tracing::warn!("Skipping category section {} without a heading", seen);
                continue;
            }

            // Link text by URL; repeated links to one page count once
            let mut links: IndexMap<String, String> = IndexMap::new();
            for anchor in section.select(&self.category_link) {
                let Some(url) = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_link(href, page_url))
                else {
                    continue;
                };
                links.entry(url).or_insert_with(|| element_text(anchor));
            }

            let entry = if links.len() == 1 {
                let (url, text) = links.swap_remove_index(0).unwrap_or_default();
                let label = if text.is_empty() {
                    last_segment(&url).unwrap_or_else(|| name.clone())
                } else {
                    text
                };
                CategoryLinks::Single { label, url }
            } else {
                let urls: Vec<String> = links.into_keys().collect();
                CategoryLinks::Listing(common_base_path(&urls))
            };

            insert_first(&mut categories, name, entry, "category");
        }

        if categories.is_empty() {
            return Err(EvaluationError::MissingElement(format!(
                "no '{}' with a '{}' heading",
                self.raw.category_section, self.raw.category_heading
            )));
        }

        Ok(categories)
    }

    /// Reads a category page: section name → group name → group URL
    pub fn sections(&self, html: &str, page_url: &Url) -> Result<SectionMap, EvaluationError> {
        let document = Html::parse_document(html);
        let mut sections = SectionMap::new();

        for subsection in document.select(&self.subsection) {
            let name = match subsection.select(&self.subsection_heading).next() {
                Some(heading) => element_text(heading),
                None => String::new(),
            };
            if name.is_empty() {
                tracing::warn!(
                    "Skipping subsection {:?} without a heading",
                    subsection.value().id()
                );
                continue;
            }

            let groups = self.groups(subsection, page_url, &name);
            if groups.is_empty() {
                tracing::warn!("Skipping subsection '{}' with no groups", name);
                continue;
            }

            insert_first(&mut sections, name, groups, "section");
        }

        if sections.is_empty() {
            return Err(EvaluationError::MissingElement(format!(
                "no '{}' holding '{}' groups",
                self.raw.subsection, self.raw.group_label
            )));
        }

        Ok(sections)
    }

    /// Pairs each group label with the link that follows it
    fn groups(
        &self,
        subsection: ElementRef<'_>,
        page_url: &Url,
        section: &str,
    ) -> IndexMap<String, String> {
        let mut groups = IndexMap::new();
        let mut label: Option<String> = None;

        for entry in subsection.select(&self.group_entry) {
            if self.group_label.matches(&entry) {
                if let Some(orphan) = label.replace(element_text(entry)) {
                    tracing::warn!("Group '{}' in '{}' has no link", orphan, section);
                }
                continue;
            }

            let href = entry.value().attr("href").unwrap_or_default();
            match (label.take(), resolve_link(href, page_url)) {
                (Some(name), Some(url)) if !name.is_empty() => {
                    insert_first(&mut groups, name, url, "group");
                }
                (Some(name), None) => {
                    tracing::warn!("Group '{}' in '{}' has an unusable link '{}'", name, section, href);
                }
                _ => tracing::warn!("Link '{}' in '{}' has no group label", href, section),
            }
        }

        if let Some(orphan) = label {
            tracing::warn!("Group '{}' in '{}' has no link", orphan, section);
        }

        groups
    }

    /// Reads a group page after its code views were revealed
    pub fn components(
        &self,
        html: &str,
        report: &RevealReport,
    ) -> Result<ComponentExtraction, EvaluationError> {
        let document = Html::parse_document(html);
        let blocks: Vec<ElementRef<'_>> = document.select(&self.component_block).collect();

        if blocks.is_empty() {
            return Err(EvaluationError::MissingElement(self.raw.component_block.clone()));
        }
        if report.blocks != blocks.len() {
            tracing::debug!(
                "Reveal saw {} blocks, snapshot has {}",
                report.blocks,
                blocks.len()
            );
        }

        let mut extraction = ComponentExtraction::default();

        for (index, block) in blocks.into_iter().enumerate() {
            let heading = block
                .select(&self.component_heading)
                .next()
                .map(element_text)
                .filter(|h| !h.is_empty());

            let Some(name) = heading else {
                extraction.failures.push(BlockFailure {
                    index,
                    heading: None,
                    reason: "missing heading".to_string(),
                });
                continue;
            };

            let code = block
                .select(&self.component_code)
                .next()
                .map(|el| el.text().collect::<String>())
                .filter(|code| !code.trim().is_empty());

            match code {
                Some(code) => insert_first(&mut extraction.components, name, code, "component"),
                None => {
                    let reason = if report.failed.contains(&index) {
                        "code toggle missing or failed"
                    } else {
                        "code did not render"
                    };
                    extraction.failures.push(BlockFailure {
                        index,
                        heading: Some(name),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        Ok(extraction)
    }
}

//! Hierarchy extraction
//!
//! This module reads each level of the catalog from a loaded page:
//! - categories and their base paths from the root page
//! - sections and group links from a category page
//! - component code from a group page, after revealing every code view
//!
//! Parsing lives in [`PageParser`] and works on snapshots; [`Extractor`]
//! drives the live page through a [`Navigator`] to produce them.

mod parse;

pub use parse::{normalize_text, BlockFailure, CategoryLinks, ComponentExtraction, PageParser};

use crate::browser::{BrowserSession, Navigator, PageScript, RevealReport, WaitPolicy};
use crate::catalog::SectionMap;
use crate::config::SelectorConfig;
use crate::{ConfigError, EvaluationError};
use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

/// Extracts catalog levels from whatever page the navigator has loaded
#[derive(Debug, Clone)]
pub struct Extractor {
    parser: PageParser,
    wait: WaitPolicy,
}

impl Extractor {
    /// Compiles the configured selectors
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelector`] for a selector that does not
    /// parse.
    pub fn new(selectors: &SelectorConfig, wait: WaitPolicy) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: PageParser::new(selectors)?,
            wait,
        })
    }

    pub fn parser(&self) -> &PageParser {
        &self.parser
    }

    /// Category name → linked pages, from the root page
    pub async fn categories<S: BrowserSession>(
        &self,
        nav: &mut Navigator<S>,
    ) -> Result<IndexMap<String, CategoryLinks>, EvaluationError> {
        let (html, url) = snapshot(nav).await?;
        self.parser.categories(&html, &url)
    }

    /// Section name → group name → group URL, from a category page
    pub async fn sections<S: BrowserSession>(
        &self,
        nav: &mut Navigator<S>,
    ) -> Result<SectionMap, EvaluationError> {
        let (html, url) = snapshot(nav).await?;
        self.parser.sections(&html, &url)
    }

    /// Reveals every code view on a group page, then reads the components
    pub async fn components<S: BrowserSession>(
        &self,
        nav: &mut Navigator<S>,
    ) -> Result<ComponentExtraction, EvaluationError> {
        let selectors = self.parser.selectors();
        let block = Value::String(selectors.component_block.clone());

        let raw = nav
            .trigger_and_wait(
                PageScript::Reveal,
                vec![block.clone(), Value::String(selectors.reveal_toggle.clone())],
                self.wait,
                PageScript::RevealSettled,
                vec![block, Value::String(selectors.component_code.clone())],
            )
            .await?;

        let report: RevealReport =
            serde_json::from_value(raw).map_err(|e| EvaluationError::UnexpectedResult {
                script: PageScript::Reveal.name(),
                message: e.to_string(),
            })?;

        let html = nav.snapshot().await?;
        self.parser.components(&html, &report)
    }
}

async fn snapshot<S: BrowserSession>(
    nav: &mut Navigator<S>,
) -> Result<(String, Url), EvaluationError> {
    let html = nav.snapshot().await?;
    let url = nav.current_url().ok_or(EvaluationError::NotLoaded)?;
    let url = Url::parse(url).map_err(|e| EvaluationError::UnexpectedResult {
        script: "current-url",
        message: format!("'{}': {}", url, e),
    })?;
    Ok((html, url))
}

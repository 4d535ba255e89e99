//! Catalog-Harvest: a component catalog scraper and snapshot differ
//!
//! This crate walks a JavaScript-rendered component catalog through its
//! Category → Section → Group → Component hierarchy using a browser session,
//! and compares two harvested snapshots to surface upstream changes.

pub mod browser;
pub mod catalog;
pub mod config;
pub mod diff;
pub mod extract;
pub mod traversal;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Root page {url} unavailable: {source}")]
    RootUnavailable {
        url: String,
        source: NavigationError,
    },

    #[error("Tree error: {0}")]
    Tree(#[from] catalog::TreeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// A page could not be reached, or history replay did not settle in time
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    #[error("Timed out after {budget:?} waiting for {url}")]
    Timeout { url: String, budget: Duration },

    #[error("Failed to load {url}: {message}")]
    Failed { url: String, message: String },

    #[error("Invalid navigation transition: {from} -> {to}")]
    InvalidTransition {
        from: browser::NavState,
        to: browser::NavState,
    },
}

/// Extraction logic failed inside the document context
#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    #[error("No page is loaded")]
    NotLoaded,

    #[error("Script '{script}' failed: {message}")]
    Script {
        script: &'static str,
        message: String,
    },

    #[error("Script '{script}' returned an unexpected result: {message}")]
    UnexpectedResult {
        script: &'static str,
        message: String,
    },

    #[error("Expected element missing: {0}")]
    MissingElement(String),
}

/// Raw failure reported by a browser-automation backend
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("Failed to start browser session: {0}")]
    Connect(String),

    #[error("Browser command failed: {0}")]
    Command(String),

    #[error("WebDriver at {url} is unavailable: {message}")]
    Unavailable { url: String, message: String },
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{BrowserSession, NavState, Navigator, PageScript, WaitPolicy};
pub use catalog::{CatalogNode, CatalogTree, ErrorMarker, NodePath, TreeBuilder};
pub use config::Config;
pub use diff::{diff_trees, DiffKind, DiffRecord};
pub use traversal::Orchestrator;

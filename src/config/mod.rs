//! Configuration module for Catalog-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a run without a config file is possible as long
//! as the command line supplies the root URL.
//!
//! # Example
//!
//! ```no_run
//! use catalog_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Navigation budget: {}s", config.timeouts.navigation_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserKind, Config, OutputConfig, RevealConfig, RevealStrategy, SelectorConfig, SiteConfig,
    TimeoutConfig, WebDriverConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_root_url};

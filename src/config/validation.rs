use crate::config::types::{
    Config, OutputConfig, RevealConfig, RevealStrategy, SelectorConfig, SiteConfig,
    TimeoutConfig, WebDriverConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Shortest identifier that still fits a fallback name, or a readable name next to the digest
const MIN_IDENTIFIER_LEN: usize = 64;

/// Most filesystems cap a single name at 255 bytes
const MAX_IDENTIFIER_LEN: usize = 240;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_timeout_config(&config.timeouts)?;
    validate_reveal_config(&config.reveal)?;
    validate_selectors(&config.selectors)?;
    validate_webdriver_config(&config.webdriver)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the root URL, if one is configured
///
/// An empty root URL is allowed here; commands that need it check again after
/// command-line overrides are applied.
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.root_url.is_empty() {
        return Ok(());
    }
    validate_root_url(&config.root_url)?;
    Ok(())
}

/// Parses a root URL and checks that it is HTTP(S)
pub fn validate_root_url(root_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' must use HTTP or HTTPS",
            root_url
        )));
    }

    Ok(url)
}

fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("login-wait-secs", config.login_wait_secs),
        ("navigation-secs", config.navigation_secs),
        ("go-back-secs", config.go_back_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn validate_reveal_config(config: &RevealConfig) -> Result<(), ConfigError> {
    match config.strategy {
        RevealStrategy::Fixed => {
            if config.settle_ms > 60_000 {
                return Err(ConfigError::Validation(format!(
                    "settle-ms must be <= 60000ms, got {}ms",
                    config.settle_ms
                )));
            }
        }
        RevealStrategy::Condition => {
            if config.poll_ms < 10 {
                return Err(ConfigError::Validation(format!(
                    "poll-ms must be >= 10ms, got {}ms",
                    config.poll_ms
                )));
            }

            if config.max_wait_ms < config.poll_ms {
                return Err(ConfigError::Validation(format!(
                    "max-wait-ms ({}ms) must be >= poll-ms ({}ms)",
                    config.max_wait_ms, config.poll_ms
                )));
            }
        }
    }

    Ok(())
}

/// Every selector must compile; extraction compiles them again at startup
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in config.entries() {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' cannot be empty",
                name
            )));
        }

        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{} ({})", e, name),
        })?;
    }

    Ok(())
}

fn validate_webdriver_config(config: &WebDriverConfig) -> Result<(), ConfigError> {
    Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver url: {}", e)))?;
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.tree_path.is_empty() {
        return Err(ConfigError::Validation("tree-path cannot be empty".to_string()));
    }

    if config.cookies_path.is_empty() {
        return Err(ConfigError::Validation(
            "cookies-path cannot be empty".to_string(),
        ));
    }

    if config.diff_dir.is_empty() {
        return Err(ConfigError::Validation("diff-dir cannot be empty".to_string()));
    }

    if !(MIN_IDENTIFIER_LEN..=MAX_IDENTIFIER_LEN).contains(&config.max_identifier_len) {
        return Err(ConfigError::Validation(format!(
            "max-identifier-len must be between {} and {}, got {}",
            MIN_IDENTIFIER_LEN, MAX_IDENTIFIER_LEN, config.max_identifier_len
        )));
    }

    Ok(())
}

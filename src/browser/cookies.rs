//! Cookie store carrying an authenticated session between runs
//!
//! Cookies are written as a JSON array in the WebDriver wire shape, so a file
//! exported from browser developer tools can be used directly.

use crate::CatalogError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Expiry as seconds since the Unix epoch; absent for session cookies.
    /// Kept for reference only: restored cookies live as long as the browser
    /// session that received them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,

    #[serde(default, rename = "httpOnly")]
    pub http_only: bool,

    #[serde(default)]
    pub secure: bool,

    #[serde(default, rename = "sameSite", skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }
}

/// Loads a saved cookie jar
///
/// # Errors
///
/// Returns [`CatalogError::Authentication`] when the file is missing or holds
/// no cookies, since a scrape without them would only see the login page.
pub fn load_cookies(path: &Path) -> Result<Vec<CookieRecord>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::Authentication(format!(
            "no saved session at {}; run `login` first",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let cookies: Vec<CookieRecord> = serde_json::from_str(&content)?;

    if cookies.is_empty() {
        return Err(CatalogError::Authentication(format!(
            "saved session at {} holds no cookies",
            path.display()
        )));
    }

    tracing::debug!("Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}

/// Writes a cookie jar, creating parent directories as needed
pub fn save_cookies(cookies: &[CookieRecord], path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(cookies)?;
    fs::write(path, json)?;

    tracing::info!("Saved {} cookies to {}", cookies.len(), path.display());
    Ok(())
}

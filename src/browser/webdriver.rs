//! WebDriver backend
//!
//! This module handles the live browser, including:
//! - Probing the WebDriver endpoint before starting a session
//! - Building browser capabilities for Chrome and Firefox
//! - Forwarding [`BrowserSession`] commands through fantoccini
//! - Converting cookies between the driver and the on-disk store

use crate::browser::{BrowserSession, CookieRecord, PageScript};
use crate::config::{BrowserKind, WebDriverConfig};
use crate::BrowserError;
use async_trait::async_trait;
use cookie::SameSite;
use fantoccini::cookies::Cookie;
use fantoccini::{Client, ClientBuilder};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Readiness reported by a WebDriver `/status` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverStatus {
    pub ready: bool,
    pub message: String,
}

#[derive(Deserialize)]
struct StatusEnvelope {
    value: StatusBody,
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    message: String,
}

/// Builds the HTTP client used for the readiness probe
pub fn build_http_client() -> Result<HttpClient, reqwest::Error> {
    HttpClient::builder()
        .user_agent(concat!("catalog-harvest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()
}

/// Asks a WebDriver endpoint whether it can start a new session
///
/// # Arguments
///
/// * `client` - HTTP client for the probe
/// * `webdriver_url` - Base URL of the WebDriver server
///
/// # Returns
///
/// * `Ok(WebDriverStatus)` - The endpoint answered
/// * `Err(BrowserError::Unavailable)` - Unreachable, or not a WebDriver server
pub async fn check_webdriver(
    client: &HttpClient,
    webdriver_url: &str,
) -> Result<WebDriverStatus, BrowserError> {
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    let unavailable = |message: String| BrowserError::Unavailable {
        url: webdriver_url.to_string(),
        message,
    };

    let response = client
        .get(&status_url)
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(unavailable(format!("HTTP {}", response.status().as_u16())));
    }

    let envelope: StatusEnvelope = response
        .json()
        .await
        .map_err(|e| unavailable(format!("malformed status response: {}", e)))?;

    Ok(WebDriverStatus {
        ready: envelope.value.ready,
        message: envelope.value.message,
    })
}

/// Builds the capabilities map for the configured browser
fn capabilities(browser: BrowserKind, headless: bool) -> Map<String, Value> {
    let mut caps = Map::new();

    match browser {
        BrowserKind::Firefox => {
            let mut args = Vec::new();
            if headless {
                args.push("--headless".to_string());
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Chrome => {
            let mut args = vec!["--no-sandbox".to_string()];
            if headless {
                args.push("--headless=new".to_string());
                args.push("--disable-gpu".to_string());
                args.push("--disable-dev-shm-usage".to_string());
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

/// A browser page driven over the WebDriver protocol
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Starts a new browser session
    ///
    /// `headless` overrides the configured value; `login` always needs a
    /// visible window.
    pub async fn connect(config: &WebDriverConfig, headless: bool) -> Result<Self, BrowserError> {
        tracing::debug!(
            "Connecting to {:?} WebDriver at {} (headless: {})",
            config.browser,
            config.url,
            headless
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config.browser, headless));
        let client = builder
            .connect(&config.url)
            .await
            .map_err(|e| BrowserError::Connect(e.to_string()))?;

        Ok(Self { client })
    }
}

fn command_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Command(e.to_string())
}

fn to_record(cookie: &Cookie<'static>) -> CookieRecord {
    CookieRecord {
        name: cookie.name().to_string(),
        value: cookie.value().to_string(),
        domain: cookie.domain().map(str::to_string),
        path: cookie.path().map(str::to_string),
        expires: cookie
            .expires_datetime()
            .map(|t| t.unix_timestamp() as f64),
        http_only: cookie.http_only().unwrap_or(false),
        secure: cookie.secure().unwrap_or(false),
        same_site: cookie.same_site().map(|s| s.to_string()),
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

// Expiry is not replayed; installed cookies last for the browser session.
fn to_cookie(record: &CookieRecord) -> Cookie<'static> {
    let mut cookie = Cookie::new(record.name.clone(), record.value.clone());
    if let Some(domain) = &record.domain {
        cookie.set_domain(domain.clone());
    }
    cookie.set_path(record.path.clone().unwrap_or_else(|| "/".to_string()));
    cookie.set_secure(record.secure);
    cookie.set_http_only(record.http_only);

    if let Some(same_site) = &record.same_site {
        match parse_same_site(same_site) {
            Some(policy) => cookie.set_same_site(policy),
            None => tracing::warn!(
                "Ignoring unknown sameSite '{}' on cookie '{}'",
                same_site,
                record.name
            ),
        }
    }
    cookie
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client.goto(url).await.map_err(command_error)
    }

    async fn go_back(&mut self) -> Result<(), BrowserError> {
        self.client.back().await.map_err(command_error)
    }

    async fn evaluate(
        &mut self,
        script: PageScript,
        args: Vec<Value>,
    ) -> Result<Value, BrowserError> {
        self.client
            .execute(script.source(), args)
            .await
            .map_err(command_error)
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        self.client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(command_error)
    }

    async fn cookies(&mut self) -> Result<Vec<CookieRecord>, BrowserError> {
        let cookies = self.client.get_all_cookies().await.map_err(command_error)?;
        Ok(cookies.iter().map(to_record).collect())
    }

    async fn add_cookies(&mut self, cookies: &[CookieRecord]) -> Result<(), BrowserError> {
        for record in cookies {
            if let Err(e) = self.client.add_cookie(to_cookie(record)).await {
                // Cookies for other domains are rejected; the rest still apply
                tracing::warn!("Skipping cookie '{}': {}", record.name, e);
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client.clone().close().await.map_err(command_error)
    }
}

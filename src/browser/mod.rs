//! Browser-automation layer
//!
//! This module contains everything that touches a live page:
//! - `BrowserSession`, the capability a backend must provide
//! - `PageScript`, the in-page functions the extractor injects
//! - `Navigator`, which adds timeouts and a state machine on top of a session
//! - the WebDriver backend and its readiness probe
//! - the cookie store used to carry authentication between runs

pub mod cookies;
mod navigator;
mod scripts;
mod state;
pub mod webdriver;

pub use cookies::{load_cookies, save_cookies, CookieRecord};
pub use navigator::{Navigator, Timeouts, WaitPolicy};
pub use scripts::{PageScript, RevealReport};
pub use state::NavState;
pub use webdriver::{check_webdriver, WebDriverSession, WebDriverStatus};

use crate::BrowserError;
use async_trait::async_trait;
use serde_json::Value;

/// A single page in an authenticated browsing session
///
/// Implementations only forward commands; timeouts, retries and state
/// tracking belong to [`Navigator`]. Tests substitute an in-memory site.
#[async_trait]
pub trait BrowserSession: Send {
    /// Starts loading `url` in the page
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Replays one step of the page's history
    async fn go_back(&mut self) -> Result<(), BrowserError>;

    /// Runs an injected function in the page and returns its JSON result
    async fn evaluate(&mut self, script: PageScript, args: Vec<Value>)
        -> Result<Value, BrowserError>;

    /// URL the page currently shows
    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Every cookie visible to the page
    async fn cookies(&mut self) -> Result<Vec<CookieRecord>, BrowserError>;

    /// Installs cookies for the page's current domain
    async fn add_cookies(&mut self, cookies: &[CookieRecord]) -> Result<(), BrowserError>;

    /// Ends the session
    async fn close(&mut self) -> Result<(), BrowserError>;
}

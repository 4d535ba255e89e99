use crate::browser::{Timeouts, WaitPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Catalog root page listing every category
    #[serde(rename = "root-url", default)]
    pub root_url: String,
}

/// Timeout budgets, one per navigation class
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// How long `login` waits for a human to finish signing in (seconds)
    #[serde(rename = "login-wait-secs", default = "default_login_wait")]
    pub login_wait_secs: u64,

    /// Budget for a page to finish loading (seconds)
    #[serde(rename = "navigation-secs", default = "default_navigation")]
    pub navigation_secs: u64,

    /// Budget for history replay to settle (seconds)
    #[serde(rename = "go-back-secs", default = "default_go_back")]
    pub go_back_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_wait_secs: default_login_wait(),
            navigation_secs: default_navigation(),
            go_back_secs: default_go_back(),
        }
    }
}

impl TimeoutConfig {
    /// Converts the configured seconds into navigator budgets
    pub fn budgets(&self) -> Timeouts {
        Timeouts {
            login_wait: Duration::from_secs(self.login_wait_secs),
            navigation: Duration::from_secs(self.navigation_secs),
            go_back: Duration::from_secs(self.go_back_secs),
        }
    }
}

/// How to wait after the "view code" reveal action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealStrategy {
    /// Sleep for `settle-ms`
    Fixed,
    /// Poll until every component block shows code, up to `max-wait-ms`
    Condition,
}

/// Reveal action settings
#[derive(Debug, Clone, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_strategy")]
    pub strategy: RevealStrategy,

    /// Fixed settle delay (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle")]
    pub settle_ms: u64,

    /// Poll interval for the condition strategy (milliseconds)
    #[serde(rename = "poll-ms", default = "default_poll")]
    pub poll_ms: u64,

    /// Upper bound for the condition strategy (milliseconds)
    #[serde(rename = "max-wait-ms", default = "default_max_wait")]
    pub max_wait_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            settle_ms: default_settle(),
            poll_ms: default_poll(),
            max_wait_ms: default_max_wait(),
        }
    }
}

impl RevealConfig {
    pub fn wait_policy(&self) -> WaitPolicy {
        match self.strategy {
            RevealStrategy::Fixed => WaitPolicy::Fixed(Duration::from_millis(self.settle_ms)),
            RevealStrategy::Condition => WaitPolicy::Condition {
                poll: Duration::from_millis(self.poll_ms),
                max_wait: Duration::from_millis(self.max_wait_ms),
            },
        }
    }
}

/// CSS selectors describing the catalog's structural markers
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Top-level category sections on the root page
    #[serde(rename = "category-section", default = "default_category_section")]
    pub category_section: String,

    #[serde(rename = "category-heading", default = "default_category_heading")]
    pub category_heading: String,

    /// Links inside a category section
    #[serde(rename = "category-link", default = "default_link")]
    pub category_link: String,

    /// Subsections on a category page
    #[serde(rename = "subsection", default = "default_subsection")]
    pub subsection: String,

    #[serde(rename = "subsection-heading", default = "default_subsection_heading")]
    pub subsection_heading: String,

    /// Group label preceding each group link
    #[serde(rename = "group-label", default = "default_group_label")]
    pub group_label: String,

    #[serde(rename = "group-link", default = "default_link")]
    pub group_link: String,

    /// Component blocks on a group page
    #[serde(rename = "component-block", default = "default_component_block")]
    pub component_block: String,

    #[serde(rename = "component-heading", default = "default_component_heading")]
    pub component_heading: String,

    /// Element clicked to reveal a component's code
    #[serde(rename = "reveal-toggle", default = "default_reveal_toggle")]
    pub reveal_toggle: String,

    /// Element holding the revealed code
    #[serde(rename = "component-code", default = "default_component_code")]
    pub component_code: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category_section: default_category_section(),
            category_heading: default_category_heading(),
            category_link: default_link(),
            subsection: default_subsection(),
            subsection_heading: default_subsection_heading(),
            group_label: default_group_label(),
            group_link: default_link(),
            component_block: default_component_block(),
            component_heading: default_component_heading(),
            reveal_toggle: default_reveal_toggle(),
            component_code: default_component_code(),
        }
    }
}

impl SelectorConfig {
    /// Returns every selector with its config key, for validation
    pub fn entries(&self) -> [(&'static str, &str); 11] {
        [
            ("category-section", self.category_section.as_str()),
            ("category-heading", self.category_heading.as_str()),
            ("category-link", self.category_link.as_str()),
            ("subsection", self.subsection.as_str()),
            ("subsection-heading", self.subsection_heading.as_str()),
            ("group-label", self.group_label.as_str()),
            ("group-link", self.group_link.as_str()),
            ("component-block", self.component_block.as_str()),
            ("component-heading", self.component_heading.as_str()),
            ("reveal-toggle", self.reveal_toggle.as_str()),
            ("component-code", self.component_code.as_str()),
        ]
    }
}

/// Which browser the WebDriver endpoint drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

/// WebDriver connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    #[serde(default = "default_browser")]
    pub browser: BrowserKind,

    /// Run without a visible window (ignored by `login`)
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            browser: default_browser(),
            headless: default_headless(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Where `scrape` writes the catalog tree
    #[serde(rename = "tree-path", default = "default_tree_path")]
    pub tree_path: String,

    /// Cookie store written by `login` and read by `scrape`
    #[serde(rename = "cookies-path", default = "default_cookies_path")]
    pub cookies_path: String,

    /// Directory receiving diff artifacts
    #[serde(rename = "diff-dir", default = "default_diff_dir")]
    pub diff_dir: String,

    /// Upper bound on artifact identifier length
    #[serde(rename = "max-identifier-len", default = "default_max_identifier_len")]
    pub max_identifier_len: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tree_path: default_tree_path(),
            cookies_path: default_cookies_path(),
            diff_dir: default_diff_dir(),
            max_identifier_len: default_max_identifier_len(),
        }
    }
}

fn default_login_wait() -> u64 {
    300
}

fn default_navigation() -> u64 {
    30
}

fn default_go_back() -> u64 {
    10
}

fn default_strategy() -> RevealStrategy {
    RevealStrategy::Condition
}

fn default_settle() -> u64 {
    1000
}

fn default_poll() -> u64 {
    100
}

fn default_max_wait() -> u64 {
    5000
}

fn default_category_section() -> String {
    "section[id^='product-']".to_string()
}

fn default_category_heading() -> String {
    "h2".to_string()
}

fn default_link() -> String {
    "a[href]".to_string()
}

fn default_subsection() -> String {
    "section[id]".to_string()
}

fn default_subsection_heading() -> String {
    "h2".to_string()
}

fn default_group_label() -> String {
    "p.group-name".to_string()
}

fn default_component_block() -> String {
    "div[id^='component-']".to_string()
}

fn default_component_heading() -> String {
    "h2".to_string()
}

fn default_reveal_toggle() -> String {
    "button[data-tab='code']".to_string()
}

fn default_component_code() -> String {
    "pre code".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_browser() -> BrowserKind {
    BrowserKind::Chrome
}

fn default_headless() -> bool {
    true
}

fn default_tree_path() -> String {
    "catalog.json".to_string()
}

fn default_cookies_path() -> String {
    "cookies.json".to_string()
}

fn default_diff_dir() -> String {
    "diffs".to_string()
}

fn default_max_identifier_len() -> usize {
    120
}

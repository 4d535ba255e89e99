//! In-memory catalog site for driving the harvest without a browser

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_harvest::browser::{
    BrowserSession, CookieRecord, Navigator, PageScript, Timeouts, WaitPolicy,
};
use catalog_harvest::config::SelectorConfig;
use catalog_harvest::extract::Extractor;
use catalog_harvest::BrowserError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOST: &str = "https://catalog.test";
pub const ROOT: &str = "https://catalog.test/components";

/// Absolute URL on the fake host
pub fn url(path: &str) -> String {
    format!("{}{}", HOST, path)
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub html: String,
    /// Navigation never completes
    pub hang: bool,
    /// Answer to `HasElement`
    pub ready: bool,
}

/// A session that serves pages from a map, keyed by absolute URL
pub struct FakeSession {
    pages: HashMap<String, FakePage>,
    history: Vec<String>,
    cookies: Vec<CookieRecord>,
    visits: Arc<Mutex<Vec<String>>>,
    /// History replay never completes
    stuck_history: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            history: Vec::new(),
            cookies: Vec::new(),
            visits: Arc::new(Mutex::new(Vec::new())),
            stuck_history: false,
        }
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            FakePage {
                html: html.into(),
                hang: false,
                ready: true,
            },
        );
        self
    }

    pub fn hanging(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            FakePage {
                html: String::new(),
                hang: true,
                ready: false,
            },
        );
        self
    }

    pub fn not_ready(mut self, url: &str) -> Self {
        if let Some(page) = self.pages.get_mut(url) {
            page.ready = false;
        }
        self
    }

    pub fn stuck_history(mut self) -> Self {
        self.stuck_history = true;
        self
    }

    pub fn with_cookies(mut self, cookies: Vec<CookieRecord>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Every URL navigated to, in order
    pub fn visits(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.visits)
    }

    fn current(&self) -> Result<&FakePage, BrowserError> {
        self.history
            .last()
            .and_then(|url| self.pages.get(url))
            .ok_or_else(|| BrowserError::Command("no page loaded".to_string()))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.visits.lock().unwrap().push(url.to_string());

        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Command("net::ERR_NAME_NOT_RESOLVED".to_string()))?;
        if page.hang {
            std::future::pending::<()>().await;
        }

        self.history.push(url.to_string());
        Ok(())
    }

    async fn go_back(&mut self) -> Result<(), BrowserError> {
        if self.stuck_history {
            std::future::pending::<()>().await;
        }
        self.history.pop();
        Ok(())
    }

    async fn evaluate(&mut self, script: PageScript, _args: Vec<Value>) -> Result<Value, BrowserError> {
        let page = self.current()?;
        Ok(match script {
            PageScript::ReadyState => json!("complete"),
            PageScript::Snapshot => json!(page.html),
            PageScript::HasElement => json!(page.ready),
            PageScript::Reveal => {
                json!({ "blocks": page.html.matches("id=\"component-").count(), "failed": [] })
            }
            PageScript::RevealSettled => json!(true),
        })
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        self.history
            .last()
            .cloned()
            .ok_or_else(|| BrowserError::Command("no page loaded".to_string()))
    }

    async fn cookies(&mut self) -> Result<Vec<CookieRecord>, BrowserError> {
        Ok(self.cookies.clone())
    }

    async fn add_cookies(&mut self, cookies: &[CookieRecord]) -> Result<(), BrowserError> {
        self.cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.history.clear();
        Ok(())
    }
}

pub fn test_timeouts() -> Timeouts {
    Timeouts {
        login_wait: Duration::from_millis(200),
        navigation: Duration::from_millis(150),
        go_back: Duration::from_millis(100),
    }
}

pub fn navigator(session: FakeSession) -> Navigator<FakeSession> {
    Navigator::open(session, test_timeouts())
}

pub fn extractor() -> Extractor {
    extractor_with(WaitPolicy::Condition {
        poll: Duration::from_millis(5),
        max_wait: Duration::from_millis(50),
    })
}

pub fn extractor_with(wait: WaitPolicy) -> Extractor {
    Extractor::new(&SelectorConfig::default(), wait).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Root page: one `section#product-*` per category with its links
pub fn root_page(categories: &[(&str, Vec<&str>)]) -> String {
    let mut html = String::from("<html><body><main>");
    for (index, (name, links)) in categories.iter().enumerate() {
        html.push_str(&format!("<section id=\"product-{}\"><h2>{}</h2>", index, escape(name)));
        for link in links {
            let text = link.rsplit('/').next().unwrap_or_default();
            html.push_str(&format!("<a href=\"{}\">{}</a>", link, escape(text)));
        }
        html.push_str("</section>");
    }
    html.push_str("</main></body></html>");
    html
}

/// Category page: one `section[id]` per section with label/link pairs
pub fn category_page(sections: &[(&str, Vec<(&str, &str)>)]) -> String {
    let mut html = String::from("<html><body>");
    for (index, (name, groups)) in sections.iter().enumerate() {
        html.push_str(&format!("<section id=\"s{}\"><h2>{}</h2>", index, escape(name)));
        for (label, href) in groups {
            html.push_str(&format!(
                "<p class=\"group-name\">{}</p><a href=\"{}\">view</a>",
                escape(label),
                href
            ));
        }
        html.push_str("</section>");
    }
    html.push_str("</body></html>");
    html
}

/// Group page: one block per component; `None` leaves the code view empty
pub fn group_page(components: &[(&str, Option<&str>)]) -> String {
    let mut html = String::from("<html><body>");
    for (index, (name, code)) in components.iter().enumerate() {
        html.push_str(&format!(
            "<div id=\"component-{}\"><h2>{}</h2><button data-tab=\"code\">Code</button><pre><code>{}</code></pre></div>",
            index,
            escape(name),
            escape(code.unwrap_or_default())
        ));
    }
    html.push_str("</body></html>");
    html
}

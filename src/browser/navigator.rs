//! Session lifecycle with timeout budgets
//!
//! The navigator wraps one [`BrowserSession`] and is the only place where
//! navigation timeouts are enforced. It never retries: every failure is
//! returned to the caller, which decides how much of the tree to give up.

use crate::browser::{BrowserSession, CookieRecord, NavState, PageScript};
use crate::{BrowserError, EvaluationError, NavigationError};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between `document.readyState` checks while a page settles
const READY_POLL: Duration = Duration::from_millis(50);

/// Independent budgets for the three kinds of waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Waiting on a human to finish signing in
    pub login_wait: Duration,

    /// Loading a page
    pub navigation: Duration,

    /// Replaying one history step
    pub go_back: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            login_wait: Duration::from_secs(300),
            navigation: Duration::from_secs(30),
            go_back: Duration::from_secs(10),
        }
    }
}

/// How to wait for client-side rendering after a trigger action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Sleep for a constant delay
    Fixed(Duration),

    /// Poll a readiness script until it returns `true` or `max_wait` elapses
    Condition { poll: Duration, max_wait: Duration },
}

/// Drives a single page through navigations with timeouts and state tracking
pub struct Navigator<S: BrowserSession> {
    session: S,
    timeouts: Timeouts,
    state: NavState,
    current_url: Option<String>,
}

impl<S: BrowserSession> Navigator<S> {
    /// Wraps an open session; nothing is loaded yet
    pub fn open(session: S, timeouts: Timeouts) -> Self {
        Self {
            session,
            timeouts,
            state: NavState::Idle,
            current_url: None,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// URL of the last settled navigation
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Loads `url` and waits until the document is complete
    ///
    /// Fails with [`NavigationError::Timeout`] if the page does not settle
    /// within the navigation budget.
    pub async fn navigate(&mut self, url: &str) -> Result<(), NavigationError> {
        let budget = self.timeouts.navigation;
        self.run_step(Some(url), budget).await
    }

    /// Replays one history step, bounded by the go-back budget
    pub async fn go_back(&mut self) -> Result<(), NavigationError> {
        if !self.state.is_loaded() {
            return Err(NavigationError::InvalidTransition {
                from: self.state,
                to: NavState::Navigating,
            });
        }

        let budget = self.timeouts.go_back;
        self.run_step(None, budget).await
    }

    /// Evaluates a page script against the loaded document
    pub async fn evaluate(
        &mut self,
        script: PageScript,
        args: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        if !self.state.is_loaded() {
            return Err(EvaluationError::NotLoaded);
        }

        self.session
            .evaluate(script, args)
            .await
            .map_err(|e| EvaluationError::Script {
                script: script.name(),
                message: e.to_string(),
            })
    }

    /// Returns the rendered document's HTML
    pub async fn snapshot(&mut self) -> Result<String, EvaluationError> {
        match self.evaluate(PageScript::Snapshot, Vec::new()).await? {
            Value::String(html) => Ok(html),
            other => Err(EvaluationError::UnexpectedResult {
                script: PageScript::Snapshot.name(),
                message: format!("expected a string, got {}", other),
            }),
        }
    }

    /// Runs a trigger script, then waits for the page to catch up
    ///
    /// With [`WaitPolicy::Condition`], running out of time is not an error:
    /// the caller reads whatever rendered and reports what is missing.
    pub async fn trigger_and_wait(
        &mut self,
        trigger: PageScript,
        args: Vec<Value>,
        policy: WaitPolicy,
        ready: PageScript,
        ready_args: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        let result = self.evaluate(trigger, args).await?;

        match policy {
            WaitPolicy::Fixed(delay) => tokio::time::sleep(delay).await,
            WaitPolicy::Condition { poll, max_wait } => {
                if !self.poll_until(ready, &ready_args, poll, max_wait).await? {
                    tracing::warn!(
                        "'{}' still pending after {:?} on {}",
                        ready.name(),
                        max_wait,
                        self.current_url.as_deref().unwrap_or("<unknown>")
                    );
                }
            }
        }

        Ok(result)
    }

    /// Polls a script until it returns `true`, bounded by `budget`
    ///
    /// Evaluation errors count as "not yet": while a human is signing in the
    /// page may be mid-redirect when the script runs.
    pub async fn wait_for(
        &mut self,
        script: PageScript,
        args: Vec<Value>,
        budget: Duration,
        poll: Duration,
    ) -> Result<(), NavigationError> {
        let deadline = Instant::now() + budget;

        loop {
            match self.evaluate(script, args.clone()).await {
                Ok(Value::Bool(true)) => return Ok(()),
                Ok(_) => {}
                Err(e) => tracing::debug!("'{}' not ready: {}", script.name(), e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(NavigationError::Timeout {
                    url: self.current_url.clone().unwrap_or_default(),
                    budget,
                });
            }
            tokio::time::sleep(poll.min(deadline - now)).await;
        }
    }

    /// Installs cookies for the current domain
    pub async fn add_cookies(&mut self, cookies: &[CookieRecord]) -> Result<(), BrowserError> {
        self.session.add_cookies(cookies).await
    }

    /// Reads every cookie visible to the page
    pub async fn cookies(&mut self) -> Result<Vec<CookieRecord>, BrowserError> {
        self.session.cookies().await
    }

    /// Closes the underlying session; closing twice is a no-op
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = NavState::Closed;
        self.current_url = None;
        self.session.close().await
    }

    async fn run_step(&mut self, url: Option<&str>, budget: Duration) -> Result<(), NavigationError> {
        self.transition(NavState::Navigating)?;

        let target = url
            .map(str::to_string)
            .or_else(|| self.current_url.clone().map(|u| format!("back from {}", u)))
            .unwrap_or_else(|| "<history>".to_string());

        let outcome = tokio::time::timeout(budget, load(&mut self.session, url)).await;

        match outcome {
            Ok(Ok(())) => {
                self.transition(NavState::Loaded)?;
                self.current_url = match url {
                    Some(u) => Some(u.to_string()),
                    None => self.session.current_url().await.ok(),
                };
                tracing::debug!("Loaded {}", self.current_url.as_deref().unwrap_or(&target));
                Ok(())
            }
            Ok(Err(e)) => {
                self.transition(NavState::Failed)?;
                Err(NavigationError::Failed {
                    url: target,
                    message: e.to_string(),
                })
            }
            Err(_) => {
                self.transition(NavState::Failed)?;
                Err(NavigationError::Timeout {
                    url: target,
                    budget,
                })
            }
        }
    }

    async fn poll_until(
        &mut self,
        script: PageScript,
        args: &[Value],
        poll: Duration,
        max_wait: Duration,
    ) -> Result<bool, EvaluationError> {
        let deadline = Instant::now() + max_wait;

        loop {
            if self.evaluate(script, args.to_vec()).await? == Value::Bool(true) {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(poll.min(deadline - now)).await;
        }
    }

    fn transition(&mut self, next: NavState) -> Result<(), NavigationError> {
        if !self.state.can_transition_to(next) {
            return Err(NavigationError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Performs one navigation step and waits for `readyState == "complete"`
async fn load<S: BrowserSession>(session: &mut S, url: Option<&str>) -> Result<(), BrowserError> {
    match url {
        Some(url) => session.navigate(url).await?,
        None => session.go_back().await?,
    }

    loop {
        let state = session.evaluate(PageScript::ReadyState, Vec::new()).await?;
        if state.as_str() == Some("complete") {
            return Ok(());
        }
        tokio::time::sleep(READY_POLL).await;
    }
}

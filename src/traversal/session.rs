//! Signed-in session handling

use crate::browser::{BrowserSession, CookieRecord, Navigator, PageScript};
use crate::{CatalogError, NavigationError};
use serde_json::Value;
use std::time::Duration;

/// Interval between checks while a human signs in
pub const LOGIN_POLL: Duration = Duration::from_secs(1);

/// Opens the root page and waits for someone to sign in by hand
///
/// Sign-in counts as complete once `ready_selector` matches, i.e. the page
/// shows catalog content instead of a login form. Returns the cookies of
/// the signed-in session.
pub async fn login<S: BrowserSession>(
    nav: &mut Navigator<S>,
    root_url: &str,
    ready_selector: &str,
    poll: Duration,
) -> Result<Vec<CookieRecord>, CatalogError> {
    nav.navigate(root_url)
        .await
        .map_err(|source| CatalogError::RootUnavailable {
            url: root_url.to_string(),
            source,
        })?;

    let budget = nav.timeouts().login_wait;
    tracing::info!("Waiting up to {:?} for sign-in at {}", budget, root_url);

    nav.wait_for(
        PageScript::HasElement,
        vec![Value::String(ready_selector.to_string())],
        budget,
        poll,
    )
    .await
    .map_err(|e| match e {
        NavigationError::Timeout { budget, .. } => {
            CatalogError::Authentication(format!("sign-in not completed within {:?}", budget))
        }
        other => other.into(),
    })?;

    let cookies = nav.cookies().await?;
    if cookies.is_empty() {
        return Err(CatalogError::Authentication(
            "browser holds no cookies after sign-in".to_string(),
        ));
    }

    tracing::info!("Signed in; captured {} cookies", cookies.len());
    Ok(cookies)
}

/// Restores a saved session before a harvest
///
/// Cookies can only be set for the domain on screen, so the root page is
/// loaded first.
pub async fn authenticate<S: BrowserSession>(
    nav: &mut Navigator<S>,
    root_url: &str,
    cookies: &[CookieRecord],
) -> Result<(), CatalogError> {
    nav.navigate(root_url)
        .await
        .map_err(|source| CatalogError::RootUnavailable {
            url: root_url.to_string(),
            source,
        })?;

    nav.add_cookies(cookies).await?;
    tracing::info!("Installed {} cookies", cookies.len());
    Ok(())
}

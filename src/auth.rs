//! Login form handling.

use std::fmt;

use log::info;

use crate::browser::Browser;
use crate::error::{ExportError, Result};
use crate::selectors;
use crate::wait::{Wait, WaitOutcome};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Submits the login form shown on the current page.
///
/// Succeeds once the space directory link is rendered, which only happens for
/// an authenticated user.
pub async fn login<B: Browser>(browser: &B, credentials: &Credentials, wait: Wait) -> Result<()> {
    info!("Logging in as {}", credentials.username);

    browser
        .fill(selectors::LOGIN_USERNAME, &credentials.username)
        .await?;
    browser
        .fill(selectors::LOGIN_PASSWORD, &credentials.password)
        .await?;
    browser.click(selectors::LOGIN_SUBMIT).await?;

    let outcome = wait
        .until(|| async move {
            Ok((browser.count(selectors::ALL_SPACES_LINK).await? > 0).then_some(()))
        })
        .await?;
    match outcome {
        WaitOutcome::Ready(()) => {
            info!("Login successful");
            Ok(())
        }
        WaitOutcome::TimedOut => Err(ExportError::LoginFailed(wait.timeout)),
    }
}

/// Whether the current page shows the login form.
pub async fn is_login_page<B: Browser>(browser: &B) -> Result<bool> {
    Ok(browser.count(selectors::LOGIN_USERNAME).await? > 0)
}

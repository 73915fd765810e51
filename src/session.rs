//! WebDriver backed browser session.

use std::path::Path;

use log::{debug, info, warn};
use thirtyfour::{prelude::*, By, ChromiumLikeCapabilities, WebDriver, WebElement};

use crate::browser::{Browser, SessionCookie};
use crate::error::{ExportError, Result};

/// Browser launched by the WebDriver server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrowserKind {
    Firefox,
    Chrome,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    /// Window size. Kept large so the wiki never switches to its narrow layout,
    /// which hides the space tools menu.
    pub viewport: (u32, u32),
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Firefox,
            headless: true,
            viewport: (1920, 1080),
        }
    }
}

/// Owns the WebDriver session for the lifetime of a run.
///
/// Dropping a `Session` does not end the browser; call [`Session::close`].
pub struct Session {
    driver: WebDriver,
}

impl Session {
    /// Launches a browser and loads `base_url`.
    pub async fn open(options: &SessionOptions, base_url: &str) -> Result<Self> {
        info!(
            "Starting {:?} via {} (headless: {})",
            options.browser, options.webdriver_url, options.headless
        );

        let driver = match options.browser {
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if options.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(options.webdriver_url.as_str(), caps).await?
            }
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if options.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(options.webdriver_url.as_str(), caps).await?
            }
        };

        let session = Self { driver };
        if let Err(e) = session.prepare(options, base_url).await {
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }

    async fn prepare(&self, options: &SessionOptions, base_url: &str) -> Result<()> {
        let (width, height) = options.viewport;
        self.driver
            .set_window_rect(0, 0, width.into(), height.into())
            .await?;
        self.goto(base_url).await
    }

    /// Quits the browser. Failures are logged, never returned.
    pub async fn close(self) {
        match self.driver.quit().await {
            Ok(()) => debug!("Browser session closed"),
            Err(e) => warn!("Failed to close browser session: {e}"),
        }
    }

    async fn first(&self, selector: &str) -> Result<Option<WebElement>> {
        Ok(self
            .driver
            .find_all(By::Css(selector))
            .await?
            .into_iter()
            .next())
    }

    /// Absolute link target of `element`, or `None` for an anchor without a
    /// usable `href` attribute. The `href` property turns an empty attribute
    /// into the current page's URL, so only the attribute says whether the
    /// link leads anywhere.
    async fn link_target(element: &WebElement) -> Result<Option<String>> {
        match element.attr("href").await? {
            Some(raw) if !raw.trim().is_empty() => {
                // The property holds the absolute URL, the attribute may be relative.
                let absolute = element.prop("href").await?;
                Ok(absolute.filter(|href| !href.is_empty()).or(Some(raw)))
            }
            _ => Ok(None),
        }
    }

    async fn require(&self, selector: &str) -> Result<WebElement> {
        self.first(selector)
            .await?
            .ok_or_else(|| ExportError::ElementNotFound(selector.to_string()))
    }
}

impl Browser for Session {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {url}");
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.driver.find_all(By::Css(selector)).await?.len())
    }

    async fn hrefs(&self, selector: &str) -> Result<Vec<String>> {
        let mut hrefs = Vec::new();
        for element in self.driver.find_all(By::Css(selector)).await? {
            if let Some(href) = Self::link_target(&element).await? {
                hrefs.push(href);
            }
        }
        Ok(hrefs)
    }

    async fn first_href(&self, selector: &str) -> Result<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Self::link_target(&element).await,
            None => Ok(None),
        }
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        debug!("Clicking {selector}");
        self.require(selector).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let field = self.require(selector).await?;
        field.clear().await?;
        field.send_keys(value).await?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        Ok(self
            .driver
            .get_all_cookies()
            .await?
            .into_iter()
            .map(|cookie| SessionCookie::new(cookie.name, cookie.value))
            .collect())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.driver.screenshot(path).await?;
        Ok(())
    }
}

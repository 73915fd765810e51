//! Space directory pagination.

use log::{debug, info, warn};

use crate::browser::Browser;
use crate::error::{ExportError, Result};
use crate::selectors;
use crate::wait::{Wait, WaitOutcome};

enum Cursor {
    /// The directory page currently loaded has not been read yet.
    Unread,
    /// The loaded page was read and has a "next" link. `marker` is its
    /// pagination label.
    Advance { marker: Option<String> },
    Done,
}

/// Lazy sequence of space directory pages.
///
/// Each call to [`SpacePages::next_page`] yields the space URLs of one page in
/// DOM order. The "next" link is only followed when the following page is
/// requested. Opening a new `SpacePages` starts over from the first page.
pub struct SpacePages<'a, B> {
    browser: &'a B,
    wait: Wait,
    cursor: Cursor,
    page: usize,
}

impl<'a, B: Browser> SpacePages<'a, B> {
    /// Opens the space directory from any authenticated page.
    pub async fn open(browser: &'a B, wait: Wait) -> Result<Self> {
        browser.click(selectors::ALL_SPACES_LINK).await?;
        Ok(Self::on_current_page(browser, wait))
    }

    /// Reads the directory page the browser is already on.
    pub fn on_current_page(browser: &'a B, wait: Wait) -> Self {
        Self {
            browser,
            wait,
            cursor: Cursor::Unread,
            page: 0,
        }
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<String>>> {
        match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::Unread => {}
            Cursor::Advance { marker } => self.advance(marker).await?,
        }
        self.page += 1;

        let browser = self.browser;
        let rows = self
            .wait
            .until(|| async move {
                let n = browser.count(selectors::SPACE_ROW_LINK).await?;
                Ok((n > 0).then_some(n))
            })
            .await?;
        if rows == WaitOutcome::TimedOut {
            warn!(
                "No spaces listed on directory page {} after {:?}",
                self.page, self.wait.timeout
            );
        }

        let mut urls = self.browser.hrefs(selectors::SPACE_ROW_LINK).await?;
        urls.retain(|url| !url.trim().is_empty());
        debug!("Directory page {}: {} spaces", self.page, urls.len());

        // The last page keeps a "next" anchor without a target.
        let next = self.browser.first_href(selectors::NEXT_PAGE_LINK).await?;
        self.cursor = match next {
            Some(href) if !href.trim().is_empty() => Cursor::Advance {
                marker: self.browser.first_text(selectors::CURRENT_PAGE_MARKER).await?,
            },
            _ => Cursor::Done,
        };
        Ok(Some(urls))
    }

    /// Clicks "next" and waits until the pagination marker moves away from
    /// `marker`, so the following read never sees the previous page.
    async fn advance(&self, marker: Option<String>) -> Result<()> {
        let browser = self.browser;
        browser.click(selectors::NEXT_PAGE_LINK).await?;
        let previous = marker.as_deref();
        let outcome = self
            .wait
            .until(|| async move {
                let current = browser.first_text(selectors::CURRENT_PAGE_MARKER).await?;
                Ok((current.as_deref() != previous).then_some(()))
            })
            .await?;
        match outcome {
            WaitOutcome::Ready(()) => Ok(()),
            WaitOutcome::TimedOut => Err(ExportError::PageTransitionTimedOut {
                marker,
                timeout: self.wait.timeout,
            }),
        }
    }
}

/// Walks every directory page and returns all space URLs in discovery order.
pub async fn collect_space_urls<B: Browser>(pages: &mut SpacePages<'_, B>) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    while let Some(page) = pages.next_page().await? {
        urls.extend(page);
    }
    info!("Found {} spaces on {} directory pages", urls.len(), pages.page);
    Ok(urls)
}

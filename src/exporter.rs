//! Drives a full export run: login, space discovery, one export per space.

use log::{error, info, warn};

use crate::auth;
use crate::browser::Browser;
use crate::config::ExportConfig;
use crate::diagnostics;
use crate::download::Downloader;
use crate::error::{ExportError, Result};
use crate::export::{self, ExportOutcome};
use crate::report::{RunReport, SpaceRecord, Status};
use crate::space_key::{resolve_space_key, SpaceKey};
use crate::spaces::{collect_space_urls, SpacePages};

pub struct Exporter<'a, B> {
    browser: &'a B,
    downloader: &'a Downloader,
    config: &'a ExportConfig,
}

impl<'a, B: Browser> Exporter<'a, B> {
    pub fn new(browser: &'a B, downloader: &'a Downloader, config: &'a ExportConfig) -> Self {
        Self {
            browser,
            downloader,
            config,
        }
    }

    /// Exports every visible space. The browser must show the login page.
    ///
    /// Spaces are recorded in `report` as they finish, so a run that ends in
    /// an error still leaves the completed part behind.
    pub async fn run(&self, report: &mut RunReport) -> Result<()> {
        let page_wait = self.config.page_wait();
        auth::login(self.browser, &self.config.credentials, page_wait).await?;

        let mut pages = SpacePages::open(self.browser, page_wait).await?;
        let urls = collect_space_urls(&mut pages).await?;

        for (index, url) in urls.iter().enumerate() {
            info!("[{}/{}] {url}", index + 1, urls.len());
            let record = self.process_space(url, index).await?;
            report.push(record);
        }

        info!("{}", report.summary());
        Ok(())
    }

    /// [`Exporter::run`], with a `fatal` screenshot of the page the run ended
    /// on when it fails.
    pub async fn run_with_diagnostics(&self, report: &mut RunReport) -> Result<()> {
        let outcome = self.run(report).await;
        if let Err(e) = &outcome {
            error!("Export aborted: {e}");
            diagnostics::capture(self.browser, &self.config.screenshot_dir, "fatal").await;
        }
        outcome
    }

    /// Error boundary around one space. Returns `Err` only for failures that
    /// end the run.
    async fn process_space(&self, url: &str, index: usize) -> Result<SpaceRecord> {
        let mut key = None;
        match self.export_space(url, &mut key).await {
            Ok(record) => Ok(record),
            Err(e) if e.is_session_level() || self.config.fail_fast => Err(e),
            Err(e) => {
                let label = key
                    .as_ref()
                    .map_or_else(|| format!("space-{}", index + 1), SpaceKey::to_string);
                error!("Space {label} failed: {e}");
                diagnostics::capture(self.browser, &self.config.screenshot_dir, &label).await;
                Ok(SpaceRecord::new(url, key.as_ref(), Status::Failed, e.to_string()))
            }
        }
    }

    async fn export_space(&self, url: &str, key_slot: &mut Option<SpaceKey>) -> Result<SpaceRecord> {
        self.browser.goto(url).await?;
        if auth::is_login_page(self.browser).await? {
            return Err(ExportError::SessionLost(url.to_string()));
        }

        let Some(key) = resolve_space_key(self.browser).await? else {
            warn!("No space key found at {url}, skipping");
            return Ok(SpaceRecord::new(url, None, Status::Skipped, "no space key"));
        };
        *key_slot = Some(key.clone());

        let outcome = export::export_space(
            self.browser,
            &self.config.base_url,
            &key,
            self.config.wizard_timeouts(),
        )
        .await?;

        match outcome {
            ExportOutcome::NoContent => Ok(SpaceRecord::new(
                url,
                Some(&key),
                Status::Skipped,
                "no exportable content",
            )),
            ExportOutcome::Ready { download_url } => {
                // Fresh snapshot: the wizard pages may have renewed the session.
                let cookies = self.browser.cookies().await?;
                match self.downloader.fetch(&download_url, &cookies).await {
                    Ok(path) => Ok(SpaceRecord::new(
                        url,
                        Some(&key),
                        Status::Downloaded,
                        path.display().to_string(),
                    )),
                    Err(e) => {
                        error!("Space {key}: download of {download_url} failed: {e}");
                        Ok(SpaceRecord::new(url, Some(&key), Status::Failed, e.to_string()))
                    }
                }
            }
        }
    }
}

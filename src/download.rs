//! Fetches finished exports outside the browser, reusing its cookies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use reqwest::{header, Client, Url};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::browser::SessionCookie;
use crate::error::{ExportError, Result};

/// Builds a `Cookie` header value as `name=value;` pairs.
pub fn cookie_header(cookies: &[SessionCookie]) -> String {
    cookies
        .iter()
        .map(|cookie| format!("{}={};", cookie.name, cookie.value))
        .collect()
}

/// Last non-empty path segment of `url`, query and fragment excluded.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

pub struct Downloader {
    client: Client,
    target_dir: PathBuf,
    retries: usize,
    retry_pause: Duration,
}

impl Downloader {
    pub fn new(target_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_timeouts(target_dir, Duration::from_secs(30), Duration::from_secs(60))
    }

    /// `read` bounds the gap between two received chunks, so a stalled
    /// transfer fails instead of hanging the run. Large exports may take
    /// longer than `read` in total.
    pub fn with_timeouts(
        target_dir: impl Into<PathBuf>,
        connect: Duration,
        read: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect)
            .read_timeout(read)
            .build()?;
        Ok(Self {
            client,
            target_dir: target_dir.into(),
            retries: 0,
            retry_pause: Duration::from_secs(2),
        })
    }

    /// Extra attempts after a failed download.
    pub fn with_retries(mut self, retries: usize, pause: Duration) -> Self {
        self.retries = retries;
        self.retry_pause = pause;
        self
    }

    /// Downloads `link` into the target directory, replacing any file of the
    /// same name. Returns the written path.
    pub async fn fetch(&self, link: &str, cookies: &[SessionCookie]) -> Result<PathBuf> {
        let url = Url::parse(link).map_err(|e| ExportError::InvalidUrl {
            url: link.to_string(),
            reason: e.to_string(),
        })?;
        let name = file_name_from_url(&url).ok_or_else(|| ExportError::NoFileName(link.to_string()))?;

        fs::create_dir_all(&self.target_dir).await?;
        let target = self.target_dir.join(&name);
        let cookie = cookie_header(cookies);

        let mut attempt = 0;
        loop {
            match self.fetch_once(&url, &cookie, &target).await {
                Ok(bytes) => {
                    info!("Downloaded {} ({bytes} bytes)", target.display());
                    return Ok(target);
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Download of {name} failed (attempt {attempt}), retrying in {:?}: {e}",
                        self.retry_pause
                    );
                    tokio::time::sleep(self.retry_pause).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url, cookie: &str, target: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url.clone())
            .header(header::COOKIE, cookie)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let partial = partial_path(target);
        let written = async {
            let mut file = fs::File::create(&partial).await?;
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<_, ExportError>(written)
        }
        .await;

        match written {
            Ok(written) => {
                fs::rename(&partial, target).await?;
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

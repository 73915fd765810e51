//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::Credentials;
use crate::export::WizardTimeouts;
use crate::wait::Wait;

pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const REPORT_FILE_NAME: &str = "export-report.csv";

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Wiki root without a trailing slash.
    pub base_url: String,
    pub credentials: Credentials,
    pub target_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub page_timeout: Duration,
    pub export_timeout: Duration,
    pub poll_interval: Duration,
    /// Abort the run on the first failing space instead of recording it.
    pub fail_fast: bool,
}

impl ExportConfig {
    pub fn new(base_url: &str, credentials: Credentials, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            target_dir: target_dir.into(),
            screenshot_dir: PathBuf::from("."),
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fail_fast: false,
        }
    }

    pub fn page_wait(&self) -> Wait {
        Wait::new(self.page_timeout, self.poll_interval)
    }

    pub fn wizard_timeouts(&self) -> WizardTimeouts {
        let step = self.page_wait();
        WizardTimeouts {
            step,
            completion: step.with_timeout(self.export_timeout),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.target_dir.join(REPORT_FILE_NAME)
    }
}

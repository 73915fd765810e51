// src/main.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use confluence_exporter::{
    BrowserKind, Credentials, Downloader, ExportConfig, Exporter, RunReport, Session,
    SessionOptions,
};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Export every Confluence space visible to a user as PDF.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the Confluence instance, e.g. https://wiki.example.com
    base_url: String,
    username: String,
    password: String,
    /// Directory the PDF files are written to (created if missing)
    target_dir: PathBuf,

    /// WebDriver server to launch the browser through
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver: String,

    #[arg(long, value_enum, default_value_t = BrowserKind::Firefox)]
    browser: BrowserKind,

    /// Show the browser window instead of running headless
    #[arg(long)]
    visible: bool,

    /// Seconds to wait for any page element to appear
    #[arg(long, default_value_t = 30)]
    page_timeout: u64,

    /// Seconds to wait for the server to finish a space export
    #[arg(long, default_value_t = 600)]
    export_timeout: u64,

    /// Milliseconds between two checks of a wait condition
    #[arg(long, default_value_t = 500)]
    poll_interval: u64,

    /// Extra attempts for a failed download
    #[arg(long, default_value_t = 2)]
    download_retries: usize,

    /// Seconds a download may go without receiving data
    #[arg(long, default_value_t = 60)]
    download_read_timeout: u64,

    /// Abort the whole run when one space fails to export
    #[arg(long)]
    fail_fast: bool,

    /// Directory for diagnostic screenshots
    #[arg(long, default_value = ".")]
    screenshot_dir: PathBuf,
}

impl Cli {
    fn export_config(&self) -> ExportConfig {
        let mut config = ExportConfig::new(
            &self.base_url,
            Credentials::new(&self.username, &self.password),
            &self.target_dir,
        );
        config.screenshot_dir = self.screenshot_dir.clone();
        config.page_timeout = Duration::from_secs(self.page_timeout);
        config.export_timeout = Duration::from_secs(self.export_timeout);
        config.poll_interval = Duration::from_millis(self.poll_interval);
        config.fail_fast = self.fail_fast;
        config
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            webdriver_url: self.webdriver.clone(),
            browser: self.browser,
            headless: !self.visible,
            ..SessionOptions::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.export_config();
    let downloader = Downloader::with_timeouts(
        &config.target_dir,
        Duration::from_secs(30),
        Duration::from_secs(cli.download_read_timeout),
    )
    .context("Could not create HTTP client")?
    .with_retries(cli.download_retries, Duration::from_secs(2));

    let session = Session::open(&cli.session_options(), &config.base_url)
        .await
        .with_context(|| format!("Could not open {} in a browser", config.base_url))?;

    let mut report = RunReport::default();
    let outcome = Exporter::new(&session, &downloader, &config)
        .run_with_diagnostics(&mut report)
        .await;
    session.close().await;

    if !report.records.is_empty() {
        let path = config.report_path();
        match report.write_csv(&path) {
            Ok(()) => info!("Report saved to {}", path.display()),
            Err(e) => warn!("Could not write report {}: {e}", path.display()),
        }
    }

    outcome.context("Export run failed")?;
    if report.has_failures() {
        bail!("{}", report.summary());
    }
    Ok(())
}

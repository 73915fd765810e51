//! Post-mortem screenshots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{info, warn};

use crate::browser::Browser;

pub fn screenshot_file_name(label: &str, at: DateTime<Local>) -> String {
    let label: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("screenshot-{label}-{}.png", at.format("%Y%m%d-%H%M%S"))
}

/// Saves a screenshot of the current page into `dir`.
///
/// Best effort: failures are logged and `None` is returned.
pub async fn capture<B: Browser>(browser: &B, dir: &Path, label: &str) -> Option<PathBuf> {
    let path = dir.join(screenshot_file_name(label, Local::now()));
    match browser.screenshot(&path).await {
        Ok(()) => {
            info!("Saved screenshot to {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Could not capture screenshot {}: {e}", path.display());
            None
        }
    }
}

//! The space export wizard.

use std::fmt;

use log::{debug, info, warn};

use crate::browser::Browser;
use crate::error::{ExportError, Result};
use crate::selectors;
use crate::space_key::SpaceKey;
use crate::wait::{Wait, WaitOutcome};

/// Wizard steps in the order they are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStep {
    FormatSelect,
    ConfirmFormat,
    ContentScopeSelect,
    ConfirmExport,
    AwaitCompletion,
    Download,
}

impl fmt::Display for ExportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FormatSelect => "format selection",
            Self::ConfirmFormat => "format confirmation",
            Self::ContentScopeSelect => "content scope selection",
            Self::ConfirmExport => "export confirmation",
            Self::AwaitCompletion => "export completion",
            Self::Download => "download",
        };
        f.write_str(name)
    }
}

/// How the wizard ended for one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The server finished the PDF; fetch it from `download_url`.
    Ready { download_url: String },
    /// The wizard offered no "all content" option, which Confluence does for
    /// spaces without pages.
    NoContent,
}

#[derive(Debug, Clone, Copy)]
pub struct WizardTimeouts {
    /// Bound for every page transition inside the wizard.
    pub step: Wait,
    /// Bound for the server-side PDF generation.
    pub completion: Wait,
}

pub fn export_welcome_url(base_url: &str, key: &SpaceKey) -> String {
    format!("{base_url}{}?key={key}", selectors::EXPORT_WELCOME_PATH)
}

/// Walks the PDF export wizard for `key` up to the finished download link.
pub async fn export_space<B: Browser>(
    browser: &B,
    base_url: &str,
    key: &SpaceKey,
    timeouts: WizardTimeouts,
) -> Result<ExportOutcome> {
    browser.goto(&export_welcome_url(base_url, key)).await?;

    gate(browser, timeouts.step, ExportStep::FormatSelect, selectors::FORMAT_PDF_OPTION).await?;
    browser.click(selectors::FORMAT_PDF_OPTION).await?;

    gate(browser, timeouts.step, ExportStep::ConfirmFormat, selectors::FORMAT_CONFIRM).await?;
    browser.click(selectors::FORMAT_CONFIRM).await?;

    if !content_scope_offered(browser, timeouts.step).await? {
        warn!("Space {key}: no \"all content\" option, skipping");
        return Ok(ExportOutcome::NoContent);
    }
    browser.click(selectors::CONTENT_OPTION_ALL).await?;

    gate(browser, timeouts.step, ExportStep::ConfirmExport, selectors::EXPORT_CONFIRM).await?;
    browser.click(selectors::EXPORT_CONFIRM).await?;

    info!(
        "Space {key}: export started, waiting up to {:?}",
        timeouts.completion.timeout
    );
    let outcome = timeouts
        .completion
        .until(|| async move { browser.first_href(selectors::TASK_COMPLETE_LINK).await })
        .await?;
    match outcome {
        WaitOutcome::Ready(download_url) => {
            debug!("Space {key}: export ready at {download_url}");
            Ok(ExportOutcome::Ready { download_url })
        }
        WaitOutcome::TimedOut => Err(ExportError::StepTimedOut {
            step: ExportStep::AwaitCompletion,
            timeout: timeouts.completion.timeout,
        }),
    }
}

/// Waits for the element that defines `step`.
async fn gate<B: Browser>(browser: &B, wait: Wait, step: ExportStep, selector: &str) -> Result<()> {
    let outcome = wait
        .until(|| async move { Ok((browser.count(selector).await? > 0).then_some(())) })
        .await?;
    match outcome {
        WaitOutcome::Ready(()) => Ok(()),
        WaitOutcome::TimedOut => Err(ExportError::StepTimedOut {
            step,
            timeout: wait.timeout,
        }),
    }
}

/// Waits for the content scope page. Returns `false` when the next page was
/// rendered without the "all content" option.
async fn content_scope_offered<B: Browser>(browser: &B, wait: Wait) -> Result<bool> {
    let outcome = wait
        .until(|| async move {
            if browser.count(selectors::CONTENT_OPTION_ALL).await? > 0 {
                return Ok(Some(true));
            }
            // The format form is gone, so the following page has loaded.
            if browser.count(selectors::FORMAT_FORM).await? == 0 {
                return Ok(Some(false));
            }
            Ok(None)
        })
        .await?;
    outcome.ready().ok_or(ExportError::StepTimedOut {
        step: ExportStep::ContentScopeSelect,
        timeout: wait.timeout,
    })
}

//! Error types for the export run.

use std::time::Duration;

use thirtyfour::error::WebDriverErrorInner;

use crate::export::ExportStep;

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

/// Error raised while driving the wiki or fetching an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// WebDriver transport or protocol error.
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    /// A selector that must match did not match anything.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// The space directory link never appeared after submitting credentials.
    #[error("login failed: space directory link did not appear within {0:?}")]
    LoginFailed(Duration),

    /// The login form showed up where an authenticated page was expected.
    #[error("session lost: login form shown at {0}")]
    SessionLost(String),

    /// The pagination marker did not change after clicking "next".
    #[error("space list did not advance past page {marker:?} within {timeout:?}")]
    PageTransitionTimedOut {
        marker: Option<String>,
        timeout: Duration,
    },

    /// A wizard step never reached its defining element.
    #[error("export step {step} timed out after {timeout:?}")]
    StepTimedOut { step: ExportStep, timeout: Duration },

    /// The download URL has no usable final path segment.
    #[error("download URL has no file name: {0}")]
    NoFileName(String),

    /// Malformed URL.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response status.
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    /// Whether the error invalidates the whole browser session rather than a
    /// single space.
    ///
    /// Element level WebDriver failures (intercepted clicks, stale elements)
    /// stay with the space that raised them.
    pub fn is_session_level(&self) -> bool {
        match self {
            Self::LoginFailed(_) | Self::SessionLost(_) => true,
            Self::WebDriver(e) => matches!(
                e.as_inner(),
                WebDriverErrorInner::RequestFailed(_)
                    | WebDriverErrorInner::UnknownResponse(..)
                    | WebDriverErrorInner::HttpError(_)
                    | WebDriverErrorInner::InvalidSessionId(_)
                    | WebDriverErrorInner::SessionNotCreated(_)
                    | WebDriverErrorInner::NoSuchWindow(_)
                    | WebDriverErrorInner::FatalError(_)
                    | WebDriverErrorInner::CommandRecvError(_)
                    | WebDriverErrorInner::CommandSendError(_)
                    | WebDriverErrorInner::SessionCreateError(_)
            ),
            _ => false,
        }
    }
}

//! Exports every Confluence space visible to a user as PDF.
//!
//! A WebDriver controlled browser logs in, walks the space directory, runs the
//! PDF export wizard of each space and the finished files are downloaded with
//! the browser's session cookies.

pub mod auth;
pub mod browser;
pub mod config;
pub mod diagnostics;
pub mod download;
pub mod error;
pub mod export;
pub mod exporter;
pub mod report;
pub mod selectors;
pub mod session;
pub mod space_key;
pub mod spaces;
pub mod wait;

pub use auth::Credentials;
pub use browser::{Browser, SessionCookie};
pub use config::ExportConfig;
pub use download::Downloader;
pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use report::{RunReport, SpaceRecord, Status};
pub use session::{BrowserKind, Session, SessionOptions};
pub use space_key::SpaceKey;
pub use wait::{Wait, WaitOutcome};

//! The browser operations the exporter relies on.

use std::path::Path;

use crate::error::Result;

/// A cookie held by the browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A live browser page addressed through CSS selectors.
///
/// Lookups never fail because an element is missing: `count` returns zero and
/// the `Option` returning reads return `None`. Only `click` and `fill` require
/// a match and report [`ExportError::ElementNotFound`] otherwise.
///
/// [`ExportError::ElementNotFound`]: crate::error::ExportError::ElementNotFound
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Full page load of `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Resolved `href` of every matching element that has one, in DOM order.
    async fn hrefs(&self, selector: &str) -> Result<Vec<String>>;

    /// Resolved `href` of the first matching element.
    async fn first_href(&self, selector: &str) -> Result<Option<String>>;

    /// Visible text of the first matching element.
    async fn first_text(&self, selector: &str) -> Result<Option<String>>;

    /// Clicks the first matching element.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Replaces the value of the first matching input.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Snapshot of the cookies currently held by the session.
    async fn cookies(&self) -> Result<Vec<SessionCookie>>;

    /// Writes a PNG of the rendered page to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;
}

//! Space key lookup on a space landing page.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::browser::Browser;
use crate::error::Result;
use crate::selectors;

static SPACE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*listpagetemplates\.action\?key=([^&]+)&?.*$").expect("valid space key pattern")
});

/// Short identifier of a space, e.g. `ENG`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpaceKey(String);

impl SpaceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the key from a "space templates" menu link.
pub fn parse_space_key(href: &str) -> Option<SpaceKey> {
    SPACE_KEY_PATTERN
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|key| SpaceKey::new(key.as_str()))
}

/// Returns the key of the first space tools menu link that matches.
pub fn first_space_key<I, S>(hrefs: I) -> Option<SpaceKey>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .find_map(|href| parse_space_key(href.as_ref()))
}

/// Reads the space key from the space landing page currently loaded.
pub async fn resolve_space_key<B: Browser>(browser: &B) -> Result<Option<SpaceKey>> {
    let hrefs = browser.hrefs(selectors::SPACE_TOOLS_MENU_ITEM).await?;
    Ok(first_space_key(hrefs))
}

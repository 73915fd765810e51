//! CSS selectors and paths of the Confluence server UI.
//!
//! These mirror the markup of the Confluence server pages the exporter walks.
//! A markup change on the server side breaks the matching step.

// Login form
pub const LOGIN_USERNAME: &str = "#os_username";
pub const LOGIN_PASSWORD: &str = "#os_password";
pub const LOGIN_SUBMIT: &str = "#loginButton";

/// Header link to the space directory, only rendered for a logged-in user.
pub const ALL_SPACES_LINK: &str = "a.all-spaces-link";

// Space directory
pub const SPACE_ROW_LINK: &str = "td.space-name>a";
pub const NEXT_PAGE_LINK: &str = "#space-search-result .aui-nav-next>a";
pub const CURRENT_PAGE_MARKER: &str = "#space-search-result .aui-nav-selected";

/// Menu entries of the "Space tools" menu on a space landing page.
pub const SPACE_TOOLS_MENU_ITEM: &str = "#space-tools-menu a[role=\"menuitem\"]";

// Export wizard
pub const EXPORT_WELCOME_PATH: &str = "/spaces/exportspacewelcome.action";
pub const FORMAT_PDF_OPTION: &str = "#format-export-format-pdf";
pub const FORMAT_FORM: &str = "form[name=\"export-space-choose-format\"]";
pub const FORMAT_CONFIRM: &str = "form[name=\"export-space-choose-format\"] input[name=\"confirm\"]";
pub const CONTENT_OPTION_ALL: &str = "#contentOptionAll";
pub const EXPORT_CONFIRM: &str = "form[name=\"exportspaceform\"] input[name=\"confirm\"]";
pub const TASK_COMPLETE_LINK: &str = "#taskCurrentStatus>a";

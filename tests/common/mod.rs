#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use confluence_exporter::error::{ExportError, Result};
use confluence_exporter::selectors;
use confluence_exporter::{Browser, SessionCookie, Wait};
use thirtyfour::error::{WebDriverError, WebDriverErrorInfo};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const BASE: &str = "https://wiki.test";
pub const DASHBOARD: &str = "https://wiki.test/dashboard.action";
pub const DIRECTORY: &str = "https://wiki.test/spacedirectory/view.action";

pub fn quick_wait() -> Wait {
    Wait::new(Duration::from_millis(150), Duration::from_millis(5))
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub href: Option<String>,
    pub text: String,
}

/// One rendered page of the fake wiki.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<String, Vec<FakeElement>>,
    clicks: HashMap<String, String>,
    hidden_for: HashMap<String, usize>,
    covered: HashSet<String>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, selector: &str) -> Self {
        self.push(selector, FakeElement::default());
        self
    }

    pub fn link(mut self, selector: &str, href: &str) -> Self {
        self.push(
            selector,
            FakeElement {
                href: Some(href.to_string()),
                text: String::new(),
            },
        );
        self
    }

    pub fn text(mut self, selector: &str, text: &str) -> Self {
        self.push(
            selector,
            FakeElement {
                href: None,
                text: text.to_string(),
            },
        );
        self
    }

    /// Clicking `selector` loads `url`.
    pub fn on_click(mut self, selector: &str, url: &str) -> Self {
        self.clicks.insert(selector.to_string(), url.to_string());
        self
    }

    /// Clicking `selector` hits an overlay instead, as WebDriver reports it.
    pub fn covered(mut self, selector: &str) -> Self {
        self.covered.insert(selector.to_string());
        self
    }

    /// `selector` matches nothing for the first `polls` lookups.
    pub fn hidden_for(mut self, selector: &str, polls: usize) -> Self {
        self.hidden_for.insert(selector.to_string(), polls);
        self
    }

    fn push(&mut self, selector: &str, element: FakeElement) {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
    }
}

#[derive(Default)]
struct State {
    pages: HashMap<String, FakePage>,
    current: String,
    visited: Vec<String>,
    clicked: Vec<String>,
    filled: Vec<(String, String)>,
    cookies: Vec<SessionCookie>,
    cookie_reads: usize,
    screenshots: Vec<PathBuf>,
}

impl State {
    fn lookup(&mut self, selector: &str) -> Vec<FakeElement> {
        let Some(page) = self.pages.get_mut(&self.current) else {
            return Vec::new();
        };
        if let Some(remaining) = page.hidden_for.get_mut(selector) {
            if *remaining > 0 {
                *remaining -= 1;
                return Vec::new();
            }
        }
        page.elements.get(selector).cloned().unwrap_or_default()
    }

    fn load(&mut self, url: &str) {
        self.current = url.to_string();
        self.visited.push(url.to_string());
    }
}

/// In-memory browser over a map of URL to page.
#[derive(Default)]
pub struct FakeBrowser {
    state: RefCell<State>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.state.borrow_mut().pages.insert(url.to_string(), page);
        self
    }

    pub fn cookie(self, name: &str, value: &str) -> Self {
        self.state
            .borrow_mut()
            .cookies
            .push(SessionCookie::new(name, value));
        self
    }

    /// Starts the browser on `url`, as `Session::open` does.
    pub fn starting_at(self, url: &str) -> Self {
        self.state.borrow_mut().load(url);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.borrow().visited.clone()
    }

    pub fn clicked(&self) -> Vec<String> {
        self.state.borrow().clicked.clone()
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.state.borrow().filled.clone()
    }

    pub fn cookie_reads(&self) -> usize {
        self.state.borrow().cookie_reads
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.borrow().screenshots.clone()
    }
}

impl Browser for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        self.state.borrow_mut().load(url);
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.state.borrow_mut().lookup(selector).len())
    }

    async fn hrefs(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self
            .state
            .borrow_mut()
            .lookup(selector)
            .into_iter()
            .filter_map(|e| e.href)
            .collect())
    }

    async fn first_href(&self, selector: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .borrow_mut()
            .lookup(selector)
            .into_iter()
            .next()
            .and_then(|e| e.href))
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .borrow_mut()
            .lookup(selector)
            .into_iter()
            .next()
            .map(|e| e.text))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.lookup(selector).is_empty() {
            return Err(ExportError::ElementNotFound(selector.to_string()));
        }
        let covered = state
            .pages
            .get(&state.current)
            .is_some_and(|page| page.covered.contains(selector));
        if covered {
            return Err(WebDriverError::ElementClickIntercepted(WebDriverErrorInfo::new(
                format!("element click intercepted: {selector} is covered by another element"),
            ))
            .into());
        }
        state.clicked.push(selector.to_string());
        let target = state
            .pages
            .get(&state.current)
            .and_then(|page| page.clicks.get(selector))
            .cloned();
        if let Some(target) = target {
            state.load(&target);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.lookup(selector).is_empty() {
            return Err(ExportError::ElementNotFound(selector.to_string()));
        }
        state.filled.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        let mut state = self.state.borrow_mut();
        state.cookie_reads += 1;
        Ok(state.cookies.clone())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.state.borrow_mut().screenshots.push(path.to_path_buf());
        Ok(())
    }
}

// Fake wiki pages

pub fn login_page() -> FakePage {
    FakePage::new()
        .element(selectors::LOGIN_USERNAME)
        .element(selectors::LOGIN_PASSWORD)
        .element(selectors::LOGIN_SUBMIT)
        .on_click(selectors::LOGIN_SUBMIT, DASHBOARD)
}

pub fn dashboard() -> FakePage {
    FakePage::new()
        .link(selectors::ALL_SPACES_LINK, DIRECTORY)
        .on_click(selectors::ALL_SPACES_LINK, DIRECTORY)
}

pub fn directory_url(page: usize) -> String {
    if page == 1 {
        DIRECTORY.to_string()
    } else {
        format!("{DIRECTORY}?startIndex={}", (page - 1) * 24)
    }
}

/// Directory page `page` listing `spaces`, linking to page `page + 1` when
/// `has_next` is set.
pub fn directory_page(page: usize, spaces: &[&str], has_next: bool) -> FakePage {
    let mut dir = FakePage::new().text(selectors::CURRENT_PAGE_MARKER, &page.to_string());
    for space in spaces {
        dir = dir.link(selectors::SPACE_ROW_LINK, space);
    }
    if has_next {
        let next = directory_url(page + 1);
        dir.link(selectors::NEXT_PAGE_LINK, &next)
            .on_click(selectors::NEXT_PAGE_LINK, &next)
    } else {
        // Confluence keeps an inert "next" control on the last page.
        dir.element(selectors::NEXT_PAGE_LINK)
    }
}

pub fn space_url(key: &str) -> String {
    format!("{BASE}/display/{key}")
}

pub fn space_page(key: &str) -> FakePage {
    FakePage::new()
        .link(
            selectors::SPACE_TOOLS_MENU_ITEM,
            &format!("{BASE}/spaces/viewspacesummary.action?key={key}"),
        )
        .link(
            selectors::SPACE_TOOLS_MENU_ITEM,
            &format!("{BASE}/pages/listpagetemplates.action?key={key}"),
        )
}

pub fn welcome_url(key: &str) -> String {
    format!("{BASE}/spaces/exportspacewelcome.action?key={key}")
}

fn scope_url(key: &str) -> String {
    format!("{BASE}/spaces/doexportspace.action?key={key}")
}

fn progress_url(key: &str) -> String {
    format!("{BASE}/spaces/exportspaceprogress.action?key={key}")
}

pub enum Wizard<'a> {
    /// The export finishes after a few polls with a link to `download`.
    Completes { download: &'a str },
    /// The scope page comes without the "all content" option.
    NoContent,
    /// The progress page never shows a link.
    NeverCompletes,
}

/// Registers the export wizard pages of `key`.
pub fn with_wizard(browser: FakeBrowser, key: &str, wizard: Wizard<'_>) -> FakeBrowser {
    let welcome = FakePage::new()
        .element(selectors::FORMAT_PDF_OPTION)
        .element(selectors::FORMAT_FORM)
        .element(selectors::FORMAT_CONFIRM)
        .on_click(selectors::FORMAT_CONFIRM, &scope_url(key));

    let scope = match wizard {
        Wizard::NoContent => FakePage::new().element("form[name=\"exportspaceform\"]"),
        _ => FakePage::new()
            .element(selectors::CONTENT_OPTION_ALL)
            .element(selectors::EXPORT_CONFIRM)
            .on_click(selectors::EXPORT_CONFIRM, &progress_url(key)),
    };

    let progress = match wizard {
        Wizard::Completes { download } => FakePage::new()
            .link(selectors::TASK_COMPLETE_LINK, download)
            .hidden_for(selectors::TASK_COMPLETE_LINK, 3),
        _ => FakePage::new().text("#taskCurrentStatus", "Exporting..."),
    };

    browser
        .page(&welcome_url(key), welcome)
        .page(&scope_url(key), scope)
        .page(&progress_url(key), progress)
}

// Local HTTP responder

#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub cookie: Option<String>,
}

#[derive(Clone, Default)]
pub struct Routes {
    responses: HashMap<String, VecDeque<(u16, Vec<u8>)>>,
    stalled: HashSet<String>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `path`. The last queued response repeats.
    pub fn respond(mut self, path: &str, status: u16, body: &[u8]) -> Self {
        self.responses
            .entry(path.to_string())
            .or_default()
            .push_back((status, body.to_vec()));
        self
    }

    /// `path` answers 200 with a few bytes of a longer body, then goes silent
    /// with the connection held open.
    pub fn stall(mut self, path: &str) -> Self {
        self.stalled.insert(path.to_string());
        self
    }
}

pub struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serves `routes` on a random local port, one request per connection.
pub async fn serve(routes: Routes) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let routes = Arc::new(Mutex::new(routes));

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf).to_string();
            let path = head
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();
            let cookie = head.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("cookie")
                    .then(|| value.trim().to_string())
            });
            recorded.lock().unwrap().push(Request {
                path: path.clone(),
                cookie,
            });

            let route_path = path.split('?').next().unwrap_or("/").to_string();
            let stalled = routes.lock().unwrap().stalled.contains(&route_path);
            if stalled {
                let head = "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 4096\r\n\r\n%PDF";
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.flush().await;
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    drop(stream);
                });
                continue;
            }

            let (status, body) = {
                let mut routes = routes.lock().unwrap();
                match routes.responses.get_mut(route_path.as_str()) {
                    Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                    Some(queue) => queue.front().cloned().unwrap(),
                    None => (404, b"not found".to_vec()),
                }
            };
            let head = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
    });

    TestServer { url, requests }
}

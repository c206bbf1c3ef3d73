//! Access to a loaded page.
//!
//! The extraction pipeline only talks to a page through [`PageHandle`], so it runs the same
//! against a live WebDriver session ([`BrowserPage`]) and a saved document ([`HtmlPage`]).

pub mod browser;
pub mod html;

pub use browser::BrowserPage;
pub use html::HtmlPage;

use crate::error::ScrapeError;
use async_trait::async_trait;
use std::time::Duration;

/// Operations the pipeline needs from a rendered page
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Current document title
    async fn title(&self) -> Result<String, ScrapeError>;

    /// URL the page ended up on after navigation
    async fn url(&self) -> Result<String, ScrapeError>;

    /// Wait until `selector` matches an element, failing with
    /// [`ScrapeError::SelectorNotFound`] once `timeout` has passed
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
    -> Result<(), ScrapeError>;

    /// Text content of the first element matching `selector`, `None` if nothing matches
    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// Text content of every `fragment` element inside the first `container` match,
    /// in document order
    async fn text_contents(
        &self,
        container: &str,
        fragment: &str,
    ) -> Result<Vec<Option<String>>, ScrapeError>;

    /// PNG capture of the current viewport
    async fn screenshot_png(&self) -> Result<Vec<u8>, ScrapeError>;
}

/// Title and URL of a page, read once when handling starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub url: String,
}

impl PageSnapshot {
    pub async fn capture<P: PageHandle + ?Sized>(page: &P) -> Result<Self, ScrapeError> {
        let title = page.title().await?;
        let url = page.url().await?;
        Ok(Self { title, url })
    }
}

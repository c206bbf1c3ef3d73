mod integration_tests;
mod name_tests;

use crate::page::{HtmlPage, PageHandle};
use crate::error::ScrapeError;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Product page markup with the given title, price fragments and optional structured name
pub(crate) fn product_page(title: &str, fragments: &[&str], name: Option<&str>) -> String {
    let spans: String = fragments
        .iter()
        .map(|f| format!("<span>{}</span>", f))
        .collect();
    let name = name
        .map(|n| format!(r#"<div class="product-details__title"><h1>{}</h1></div>"#, n))
        .unwrap_or_default();

    format!(
        r#"<html><head><title>{title}</title></head><body>
        {name}
        <div id="standard-price"><div><div>{spans}</div></div></div>
        </body></html>"#
    )
}

/// A viewport-sized PNG, as a browser would return it
pub(crate) fn viewport_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(1280, 720, Rgba([255, 255, 255, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Wraps a page and counts how often each query is issued
pub(crate) struct CountingPage {
    pub inner: HtmlPage,
    pub waits: AtomicUsize,
    pub screenshots: AtomicUsize,
}

impl CountingPage {
    pub fn new(inner: HtmlPage) -> Self {
        Self {
            inner,
            waits: AtomicUsize::new(0),
            screenshots: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageHandle for CountingPage {
    async fn title(&self) -> Result<String, ScrapeError> {
        self.inner.title().await
    }

    async fn url(&self) -> Result<String, ScrapeError> {
        self.inner.url().await
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        self.inner.wait_for_selector(selector, timeout).await
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        self.inner.text_content(selector).await
    }

    async fn text_contents(
        &self,
        container: &str,
        fragment: &str,
    ) -> Result<Vec<Option<String>>, ScrapeError> {
        self.inner.text_contents(container, fragment).await
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, ScrapeError> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        self.inner.screenshot_png().await
    }
}

use crate::error::ScrapeError;
use crate::page::PageHandle;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// A saved HTML document standing in for a live page
///
/// Selector waits resolve immediately since the document never changes. A screenshot is only
/// available when a pre-rendered PNG was supplied with [`HtmlPage::with_screenshot`].
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: String,
    html: String,
    screenshot: Option<Vec<u8>>,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            screenshot: None,
        }
    }

    /// Attach the PNG returned by [`PageHandle::screenshot_png`]
    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = Some(png);
        self
    }

    // Html is not Send, so every query parses the document and drops it before returning.
    fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|_| ScrapeError::InvalidSelector(selector.to_string()))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[async_trait]
impl PageHandle for HtmlPage {
    // Whitespace is collapsed the way browsers report document.title
    async fn title(&self) -> Result<String, ScrapeError> {
        let doc = self.document();
        let title_selector = parse_selector("title")?;
        let raw = doc
            .select(&title_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();

        Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn url(&self) -> Result<String, ScrapeError> {
        Ok(self.url.clone())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        let doc = self.document();
        let parsed = parse_selector(selector)?;
        if doc.select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(ScrapeError::SelectorNotFound {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let doc = self.document();
        let parsed = parse_selector(selector)?;
        Ok(doc.select(&parsed).next().map(text_of))
    }

    async fn text_contents(
        &self,
        container: &str,
        fragment: &str,
    ) -> Result<Vec<Option<String>>, ScrapeError> {
        let doc = self.document();
        let container_selector = parse_selector(container)?;
        let fragment_selector = parse_selector(fragment)?;

        let Some(root) = doc.select(&container_selector).next() else {
            return Err(ScrapeError::SelectorNotFound {
                selector: container.to_string(),
                timeout: Duration::ZERO,
            });
        };

        Ok(root
            .select(&fragment_selector)
            .map(|element| Some(text_of(element)))
            .collect())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, ScrapeError> {
        self.screenshot.clone().ok_or_else(|| {
            ScrapeError::Screenshot(format!("no rendered image available for {}", self.url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html><head><title>Drill - The Home Depot</title></head>
        <body><div id="standard-price"><div><div>
            <span>$</span><span><b>1</b>2</span><span></span><span>.50</span>
        </div></div></div>
        <p class="name">  Drill  </p></body></html>"#;

    #[tokio::test]
    async fn test_title_and_url() {
        let page = HtmlPage::new("https://example.com/p/1", DOC);
        assert_eq!(page.title().await.unwrap(), "Drill - The Home Depot");
        assert_eq!(page.url().await.unwrap(), "https://example.com/p/1");
    }

    #[tokio::test]
    async fn test_text_contents_in_document_order() {
        let page = HtmlPage::new("https://example.com/p/1", DOC);
        let texts = page
            .text_contents("#standard-price > div > div", "span")
            .await
            .unwrap();

        let texts: Vec<String> = texts.into_iter().map(Option::unwrap_or_default).collect();
        assert_eq!(texts, vec!["$", "12", "", ".50"]);
    }

    #[tokio::test]
    async fn test_missing_selector() {
        let page = HtmlPage::new("https://example.com/p/1", DOC);
        let err = page
            .wait_for_selector("#sale-price", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::SelectorNotFound { ref selector, .. } if selector == "#sale-price"
        ));

        assert_eq!(page.text_content(".missing").await.unwrap(), None);
        assert_eq!(
            page.text_content("p.name").await.unwrap().as_deref(),
            Some("  Drill  ")
        );
    }

    #[tokio::test]
    async fn test_screenshot_requires_rendered_image() {
        let page = HtmlPage::new("https://example.com/p/1", DOC);
        assert!(matches!(
            page.screenshot_png().await,
            Err(ScrapeError::Screenshot(_))
        ));

        let page = page.with_screenshot(vec![1, 2, 3]);
        assert_eq!(page.screenshot_png().await.unwrap(), vec![1, 2, 3]);
    }
}

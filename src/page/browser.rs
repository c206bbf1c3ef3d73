use crate::error::ScrapeError;
use crate::page::PageHandle;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use std::time::Duration;

/// A page open in a WebDriver-controlled browser
pub struct BrowserPage {
    client: Client,
}

impl BrowserPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageHandle for BrowserPage {
    async fn title(&self) -> Result<String, ScrapeError> {
        Ok(self.client.title().await?)
    }

    async fn url(&self) -> Result<String, ScrapeError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(ScrapeError::SelectorNotFound {
                selector: selector.to_string(),
                timeout,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // textContent rather than innerText so visually hidden fragments still count
        Ok(element.prop("textContent").await?)
    }

    async fn text_contents(
        &self,
        container: &str,
        fragment: &str,
    ) -> Result<Vec<Option<String>>, ScrapeError> {
        let container = self.client.find(Locator::Css(container)).await?;
        let fragments = container.find_all(Locator::Css(fragment)).await?;

        let mut texts = Vec::with_capacity(fragments.len());
        for element in fragments {
            texts.push(element.prop("textContent").await?);
        }

        ::log::debug!("Read {} fragments from {}", texts.len(), fragment);
        Ok(texts)
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, ScrapeError> {
        self.client
            .screenshot()
            .await
            .map_err(|e| ScrapeError::Screenshot(e.to_string()))
    }
}

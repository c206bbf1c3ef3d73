use crate::config::{SelectorConfig, TitleFallbackConfig};
use crate::error::ConfigError;
use crate::page::PageHandle;
use crate::results::{NameResult, NameSource};
use regex::Regex;
use std::time::Duration;

/// Derives a product name from the page title when the structured element is missing
#[derive(Debug, Clone)]
pub struct TitleFallback {
    pattern: Regex,
    brand_suffix: String,
}

impl TitleFallback {
    pub fn new(config: &TitleFallbackConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: Regex::new(&config.pattern)?,
            brand_suffix: config.brand_suffix.clone(),
        })
    }

    /// Capture group 1 of the pattern with the brand suffix removed
    pub fn name_from_title(&self, title: &str) -> Option<String> {
        let captured = self.pattern.captures(title)?.get(1)?.as_str();
        let name = captured
            .strip_suffix(self.brand_suffix.as_str())
            .unwrap_or(captured)
            .trim();

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Resolve the product name: structured element first, page title second, sentinel last
pub async fn extract<P: PageHandle + ?Sized>(
    page: &P,
    title: &str,
    selectors: &SelectorConfig,
    fallback: &TitleFallback,
) -> NameResult {
    if let Some(name) =
        from_structured(page, &selectors.product_name, selectors.name_timeout()).await
    {
        return NameResult {
            name,
            source: NameSource::Selector,
        };
    }

    match fallback.name_from_title(title) {
        Some(name) => {
            ::log::debug!("Product name taken from page title: {}", name);
            NameResult {
                name,
                source: NameSource::TitleFallback,
            }
        }
        None => {
            ::log::error!(
                "name scrape failed selector={} title={:?}",
                selectors.product_name,
                title
            );
            NameResult::sentinel()
        }
    }
}

/// Trimmed text of the structured title element. Misses are logged, never raised.
async fn from_structured<P: PageHandle + ?Sized>(
    page: &P,
    selector: &str,
    timeout: Duration,
) -> Option<String> {
    if let Err(e) = page.wait_for_selector(selector, timeout).await {
        ::log::info!("Structured product name unavailable: {}", e);
        return None;
    }

    match page.text_content(selector).await {
        Ok(Some(text)) => {
            let text = text.trim();
            if text.is_empty() {
                ::log::info!("Structured product name is empty selector={}", selector);
                None
            } else {
                Some(text.to_string())
            }
        }
        Ok(None) => None,
        Err(e) => {
            ::log::info!("Failed to read structured product name: {}", e);
            None
        }
    }
}

use serde::{Deserialize, Serialize};

/// Name recorded when neither the product title element nor the page title yields one
pub const NAME_SCRAPE_ERROR: &str = "NAME_SCRAPE_ERROR";

/// Input for a run: the product page to scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "startUrl", alias = "url")]
    pub start_url: String,
}

/// Price text as rendered, fragments joined in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResult {
    pub price: String,
}

/// Which stage produced a product name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Selector,
    TitleFallback,
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResult {
    pub name: String,
    pub source: NameSource,
}

impl NameResult {
    pub fn sentinel() -> Self {
        Self {
            name: NAME_SCRAPE_ERROR.to_string(),
            source: NameSource::Sentinel,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.source == NameSource::Sentinel
    }
}

/// Encoded screenshot together with the metadata needed to decode it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotResult {
    pub encoding: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub img: String,
}

impl ScreenshotResult {
    /// Wrap base64 PNG data
    pub fn png(img: String) -> Self {
        Self {
            encoding: "base64".to_string(),
            kind: "image/png".to_string(),
            img,
        }
    }
}

/// One scraped product page, as pushed to the output sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub url: String,
    pub name: String,
    pub price: String,
    pub screenshot: ScreenshotResult,
}

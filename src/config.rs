use crate::error::ConfigError;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Top-level configuration for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Extra attempts after the first failed one
    #[serde(default)]
    pub max_request_retries: u32,

    /// Maximum number of requests handled in one run
    #[serde(default = "default_max_requests_per_crawl")]
    pub max_requests_per_crawl: u32,

    /// Page load budget in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Budget for the whole page handler in seconds
    #[serde(default = "default_request_handler_timeout_secs")]
    pub request_handler_timeout_secs: u64,

    /// Whether browser identities are pooled and health-tracked
    #[serde(default = "default_true")]
    pub use_session_pool: bool,

    /// Maximum number of sessions kept in the pool
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,

    /// Keep cookies in a session's browser between requests
    #[serde(default = "default_true")]
    pub persist_cookies_per_session: bool,

    /// Maximum number of pages in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Budget for establishing the WebDriver session, in milliseconds
    #[serde(default = "default_launch_timeout_ms")]
    pub launch_timeout_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory where output records are stored
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub title_fallback: TitleFallbackConfig,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,
}

/// DOM queries used by the extraction stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Element holding the rendered price fragments
    #[serde(default = "default_price_container")]
    pub price_container: String,

    /// Fragment elements inside the price container
    #[serde(default = "default_price_fragment")]
    pub price_fragment: String,

    /// Structured product title element
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// How long to wait for the price container, in seconds
    #[serde(default = "default_price_timeout_secs")]
    pub price_timeout_secs: u64,

    /// How long to wait for the product title element, in seconds
    #[serde(default = "default_name_timeout_secs")]
    pub name_timeout_secs: u64,
}

/// Page-title fallback used when the structured name element is missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleFallbackConfig {
    /// Regex applied to the page title; capture group 1 is the name
    #[serde(default = "default_title_pattern")]
    pub pattern: String,

    /// Site branding stripped from the end of the captured name
    #[serde(default = "default_brand_suffix")]
    pub brand_suffix: String,
}

/// Region of the captured image kept in the screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Viewport and post-processing for the audit screenshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Crop applied to the captured image (None keeps the whole viewport)
    #[serde(default = "default_clip")]
    pub clip: Option<ClipRegion>,

    /// Downscale factor in (0, 1]
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_true() -> bool {
    true
}

fn default_max_requests_per_crawl() -> u32 {
    1
}

fn default_navigation_timeout_secs() -> u64 {
    25
}

fn default_request_handler_timeout_secs() -> u64 {
    30
}

fn default_max_pool_size() -> usize {
    100
}

fn default_max_concurrency() -> usize {
    1
}

fn default_launch_timeout_ms() -> u64 {
    5000
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("storage/datasets/default")
}

fn default_price_container() -> String {
    "#standard-price > div > div".to_string()
}

fn default_price_fragment() -> String {
    "span".to_string()
}

fn default_product_name() -> String {
    "div.product-details__title h1".to_string()
}

fn default_price_timeout_secs() -> u64 {
    10
}

fn default_name_timeout_secs() -> u64 {
    3
}

fn default_title_pattern() -> String {
    "^(.*)$".to_string()
}

fn default_brand_suffix() -> String {
    " - The Home Depot".to_string()
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

/// Skips the fixed site banner at the top of the viewport
fn default_clip() -> Option<ClipRegion> {
    Some(ClipRegion {
        x: 0,
        y: 180,
        width: 1280,
        height: 540,
    })
}

fn default_scale() -> f32 {
    1.0
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_request_retries: 0,
            max_requests_per_crawl: default_max_requests_per_crawl(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            request_handler_timeout_secs: default_request_handler_timeout_secs(),
            use_session_pool: true,
            max_pool_size: default_max_pool_size(),
            persist_cookies_per_session: true,
            max_concurrency: default_max_concurrency(),
            headless: true,
            launch_timeout_ms: default_launch_timeout_ms(),
            webdriver_url: default_webdriver_url(),
            dataset_dir: default_dataset_dir(),
            selectors: SelectorConfig::default(),
            title_fallback: TitleFallbackConfig::default(),
            screenshot: ScreenshotConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            price_container: default_price_container(),
            price_fragment: default_price_fragment(),
            product_name: default_product_name(),
            price_timeout_secs: default_price_timeout_secs(),
            name_timeout_secs: default_name_timeout_secs(),
        }
    }
}

impl Default for TitleFallbackConfig {
    fn default() -> Self {
        Self {
            pattern: default_title_pattern(),
            brand_suffix: default_brand_suffix(),
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            clip: default_clip(),
            scale: default_scale(),
        }
    }
}

impl SelectorConfig {
    pub fn price_timeout(&self) -> Duration {
        Duration::from_secs(self.price_timeout_secs)
    }

    pub fn name_timeout(&self) -> Duration {
        Duration::from_secs(self.name_timeout_secs)
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn request_handler_timeout(&self) -> Duration {
        Duration::from_secs(self.request_handler_timeout_secs)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    /// Check every field once, before any browser work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests_per_crawl == 0 {
            return Err(invalid("max_requests_per_crawl must be at least 1"));
        }
        if self.navigation_timeout_secs == 0 || self.request_handler_timeout_secs == 0 {
            return Err(invalid("navigation and request handler timeouts must be positive"));
        }
        if self.launch_timeout_ms == 0 {
            return Err(invalid("launch_timeout_ms must be positive"));
        }
        if self.use_session_pool && self.max_pool_size == 0 {
            return Err(invalid("max_pool_size must be at least 1 when the pool is enabled"));
        }
        if self.max_concurrency != 1 {
            return Err(invalid(format!(
                "max_concurrency must be 1 for a single-page scrape, got {}",
                self.max_concurrency
            )));
        }
        if Url::parse(&self.webdriver_url).is_err() {
            return Err(invalid(format!(
                "webdriver_url `{}` is not a valid URL",
                self.webdriver_url
            )));
        }

        for selector in [
            &self.selectors.price_container,
            &self.selectors.price_fragment,
            &self.selectors.product_name,
        ] {
            if Selector::parse(selector).is_err() {
                return Err(invalid(format!("`{}` is not a valid CSS selector", selector)));
            }
        }
        if self.selectors.price_timeout_secs == 0 {
            return Err(invalid("price_timeout_secs must be positive"));
        }

        let pattern = Regex::new(&self.title_fallback.pattern)?;
        if pattern.captures_len() < 2 {
            return Err(invalid("title pattern needs at least one capture group"));
        }

        let shot = &self.screenshot;
        if shot.viewport_width == 0 || shot.viewport_height == 0 {
            return Err(invalid("viewport dimensions must be positive"));
        }
        if !(shot.scale > 0.0 && shot.scale <= 1.0) {
            return Err(invalid(format!(
                "screenshot scale must be in (0, 1], got {}",
                shot.scale
            )));
        }
        if let Some(clip) = shot.clip {
            if clip.width == 0 || clip.height == 0 {
                return Err(invalid("screenshot clip must have an area"));
            }
            if clip.x >= shot.viewport_width || clip.y >= shot.viewport_height {
                return Err(invalid("screenshot clip starts outside the viewport"));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

//! Single product page scraper.
//!
//! Loads one product page in a WebDriver browser, reads the price fragments and the product
//! name (with a page-title fallback), captures a cropped screenshot, and stores the result
//! as one JSON record.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod extract;
pub mod handler;
pub mod page;
pub mod results;
pub mod session;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use error::{ConfigError, ScrapeError};
pub use handler::{HandlerOutcome, PageHandler};
pub use results::{InputRecord, OutputRecord};

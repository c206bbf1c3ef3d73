use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading a page and running the extraction pipeline
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required element did not appear within its wait bound
    #[error("selector `{selector}` not found within {timeout:?}")]
    SelectorNotFound { selector: String, timeout: Duration },

    /// Navigation or the request handler exceeded its time budget
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("failed to connect to webdriver: {0}")]
    Connect(String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid title pattern: {0}")]
    Regex(#[from] regex::Error),
}

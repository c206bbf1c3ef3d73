use clap::Parser;
use product_page::config::ScraperConfig;
use product_page::error::ConfigError;
use product_page::results::InputRecord;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "product-page")]
#[command(about = "Scrapes the price, name and a screenshot of one product page")]
#[command(version)]
pub struct Args {
    /// Product page to scrape (alternatively use --input)
    pub url: Option<String>,

    /// JSON input record with a `startUrl` (or `url`) field
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON configuration file; flags and environment variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory where scraped records are written
    #[arg(long)]
    pub dataset_dir: Option<PathBuf>,

    #[arg(long, env = "MAX_REQUEST_RETRIES")]
    pub max_request_retries: Option<u32>,

    #[arg(long, env = "MAX_REQUESTS_PER_CRAWL")]
    pub max_requests_per_crawl: Option<u32>,

    #[arg(long, env = "NAVIGATION_TIMEOUT_SECS")]
    pub navigation_timeout_secs: Option<u64>,

    #[arg(long, env = "REQUEST_HANDLER_TIMEOUT_SECS")]
    pub request_handler_timeout_secs: Option<u64>,

    /// Anything other than "false" enables the session pool
    #[arg(long, env = "USE_SESSION_POOL", value_parser = parse_toggle)]
    pub use_session_pool: Option<bool>,

    #[arg(long, env = "MAX_POOL_SIZE")]
    pub max_pool_size: Option<usize>,

    /// Anything other than "false" keeps cookies between a session's requests
    #[arg(long, env = "PERSIST_COOKIES_PER_SESSION", value_parser = parse_toggle)]
    pub persist_cookies_per_session: Option<bool>,

    /// URL of the WebDriver server
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Run the pipeline against a saved HTML page instead of a browser
    #[arg(long)]
    pub replay_html: Option<PathBuf>,

    /// Pre-rendered PNG used as the screenshot when replaying
    #[arg(long, requires = "replay_html")]
    pub replay_screenshot: Option<PathBuf>,
}

/// Only an explicit "false" (any case) turns a toggle off
pub fn parse_toggle(value: &str) -> Result<bool, String> {
    Ok(!value.eq_ignore_ascii_case("false"))
}

impl Args {
    /// Build the run configuration: file (or defaults), then overrides, then validation
    pub fn load_config(&self) -> Result<ScraperConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path)?,
            None => ScraperConfig::default(),
        };

        if let Some(value) = self.max_request_retries {
            config.max_request_retries = value;
        }
        if let Some(value) = self.max_requests_per_crawl {
            config.max_requests_per_crawl = value;
        }
        if let Some(value) = self.navigation_timeout_secs {
            config.navigation_timeout_secs = value;
        }
        if let Some(value) = self.request_handler_timeout_secs {
            config.request_handler_timeout_secs = value;
        }
        if let Some(value) = self.use_session_pool {
            config.use_session_pool = value;
        }
        if let Some(value) = self.max_pool_size {
            config.max_pool_size = value;
        }
        if let Some(value) = self.persist_cookies_per_session {
            config.persist_cookies_per_session = value;
        }
        if let Some(value) = &self.webdriver_url {
            if !value.is_empty() {
                config.webdriver_url = value.clone();
            }
        }
        if let Some(value) = &self.dataset_dir {
            config.dataset_dir = value.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// The start URL from the positional argument or the input file
    pub fn input_record(&self) -> Result<InputRecord, ConfigError> {
        let input = match (&self.url, &self.input) {
            (Some(url), _) => InputRecord {
                start_url: url.clone(),
            },
            (None, Some(path)) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "a start URL or --input file is required".to_string(),
                ));
            }
        };

        if url::Url::parse(&input.start_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "start URL `{}` is not a valid URL",
                input.start_url
            )));
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("false"), Ok(false));
        assert_eq!(parse_toggle("FALSE"), Ok(false));
        assert_eq!(parse_toggle("true"), Ok(true));
        assert_eq!(parse_toggle("0"), Ok(true));
        assert_eq!(parse_toggle(""), Ok(true));
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::try_parse_from([
            "product-page",
            "https://example.com/p/1",
            "--max-request-retries",
            "3",
            "--use-session-pool",
            "False",
        ])
        .unwrap();

        let config = args.load_config().unwrap();
        assert_eq!(config.max_request_retries, 3);
        assert!(!config.use_session_pool);
        assert_eq!(config.navigation_timeout_secs, 25);

        let input = args.input_record().unwrap();
        assert_eq!(input.start_url, "https://example.com/p/1");
    }

    #[test]
    fn test_input_is_required() {
        let args = Args::try_parse_from(["product-page"]).unwrap();
        assert!(args.input_record().is_err());

        let args = Args::try_parse_from(["product-page", "not a url"]).unwrap();
        assert!(args.input_record().is_err());
    }
}

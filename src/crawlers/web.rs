use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::handler::{HandlerOutcome, PageHandler};
use crate::page::BrowserPage;
use crate::results::InputRecord;
use crate::session::{Session, SessionHandle, SessionPool};
use crate::sink::OutputSink;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::timeout;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub requests_finished: u32,
    pub requests_failed: u32,
    pub records_pushed: u32,
}

/// Scrape the start URL with a WebDriver browser and push the result to `sink`
///
/// # Arguments
///
/// * `config` - Validated scraper configuration
/// * `input` - The start URL
/// * `sink` - Where the output record goes
pub async fn run(
    config: &ScraperConfig,
    input: &InputRecord,
    sink: &dyn OutputSink,
) -> Result<CrawlStats, ScrapeError> {
    ::log::info!("Starting scraper for: {}", input.start_url);

    let handler = PageHandler::new(config)?;
    let mut browsers = Browsers::new(config);
    let mut queue = VecDeque::from([input.start_url.clone()]);
    let mut stats = CrawlStats::default();
    let mut handled = 0;

    while let Some(url) = queue.pop_front() {
        if handled >= config.max_requests_per_crawl {
            ::log::info!(
                "Reached max_requests_per_crawl={}, skipping remaining requests",
                config.max_requests_per_crawl
            );
            break;
        }
        handled += 1;

        match process_request(&handler, &mut browsers, config, &url, sink).await {
            Ok(HandlerOutcome::Emitted(_)) => {
                stats.requests_finished += 1;
                stats.records_pushed += 1;
            }
            Ok(HandlerOutcome::Aborted { .. }) => {
                stats.requests_finished += 1;
            }
            Err(e) => {
                ::log::error!("request failed url={} error={}", url, e);
                stats.requests_failed += 1;
            }
        }
    }

    browsers.close_all().await;

    ::log::info!(
        "Scrape complete - finished={} failed={} records={}",
        stats.requests_finished,
        stats.requests_failed,
        stats.records_pushed
    );
    Ok(stats)
}

/// Runs a request until it succeeds or the retry budget is used up
async fn process_request(
    handler: &PageHandler,
    browsers: &mut Browsers,
    config: &ScraperConfig,
    url: &str,
    sink: &dyn OutputSink,
) -> Result<HandlerOutcome, ScrapeError> {
    let attempts = config.max_request_retries + 1;
    let mut attempt = 1;

    loop {
        match attempt_request(handler, browsers, config, url, sink).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if attempt < attempts => {
                ::log::warn!(
                    "Attempt {}/{} for {} failed, retrying: {}",
                    attempt,
                    attempts,
                    url,
                    e
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One attempt: pick a session, navigate, run the handler
async fn attempt_request(
    handler: &PageHandler,
    browsers: &mut Browsers,
    config: &ScraperConfig,
    url: &str,
    sink: &dyn OutputSink,
) -> Result<HandlerOutcome, ScrapeError> {
    let session_id = browsers.acquire_session();
    let client = browsers.client(session_id).await?;

    match load_and_handle(handler, browsers, &client, session_id, config, url, sink).await {
        Ok(outcome) => {
            browsers.report_success(session_id, &client).await;
            Ok(outcome)
        }
        Err(e) => {
            browsers.report_failure(session_id).await;
            Err(e)
        }
    }
}

async fn load_and_handle(
    handler: &PageHandler,
    browsers: &mut Browsers,
    client: &Client,
    session_id: Option<usize>,
    config: &ScraperConfig,
    url: &str,
    sink: &dyn OutputSink,
) -> Result<HandlerOutcome, ScrapeError> {
    let navigation_timeout = config.navigation_timeout();
    timeout(navigation_timeout, client.goto(url))
        .await
        .map_err(|_| ScrapeError::Timeout {
            operation: "navigation",
            timeout: navigation_timeout,
        })??;

    let page = BrowserPage::new(client.clone());
    let session = browsers
        .session_mut(session_id)
        .map(|s| s as &mut dyn SessionHandle);

    let handler_timeout = config.request_handler_timeout();
    timeout(handler_timeout, handler.handle(&page, session, url, sink))
        .await
        .map_err(|_| ScrapeError::Timeout {
            operation: "request handler",
            timeout: handler_timeout,
        })?
}

/// WebDriver clients, one per pooled session or a single shared one without a pool
struct Browsers {
    pool: Option<SessionPool>,
    clients: HashMap<usize, Client>,
    shared: Option<Client>,
    webdriver_url: String,
    launch_timeout: Duration,
    headless: bool,
    viewport: (u32, u32),
    persist_cookies: bool,
}

impl Browsers {
    fn new(config: &ScraperConfig) -> Self {
        Self {
            pool: config
                .use_session_pool
                .then(|| SessionPool::new(config.max_pool_size)),
            clients: HashMap::new(),
            shared: None,
            webdriver_url: config.webdriver_url.clone(),
            launch_timeout: config.launch_timeout(),
            headless: config.headless,
            viewport: (
                config.screenshot.viewport_width,
                config.screenshot.viewport_height,
            ),
            persist_cookies: config.persist_cookies_per_session,
        }
    }

    fn acquire_session(&mut self) -> Option<usize> {
        self.pool.as_mut().map(SessionPool::acquire)
    }

    fn session_mut(&mut self, id: Option<usize>) -> Option<&mut Session> {
        let id = id?;
        self.pool.as_mut()?.get_mut(id)
    }

    /// Client for the session, connecting lazily
    async fn client(&mut self, session_id: Option<usize>) -> Result<Client, ScrapeError> {
        let existing = match session_id {
            Some(id) => self.clients.get(&id).cloned(),
            None => self.shared.clone(),
        };
        if let Some(client) = existing {
            return Ok(client);
        }

        let client = self.connect().await?;
        match session_id {
            Some(id) => {
                self.clients.insert(id, client.clone());
            }
            None => self.shared = Some(client.clone()),
        }
        Ok(client)
    }

    async fn report_success(&mut self, session_id: Option<usize>, client: &Client) {
        if let Some(session) = self.session_mut(session_id) {
            session.mark_good();
        }

        if !self.persist_cookies {
            if let Err(e) = client.delete_all_cookies().await {
                ::log::warn!("Failed to clear cookies: {}", e);
            }
        }

        self.close_unusable().await;
    }

    async fn report_failure(&mut self, session_id: Option<usize>) {
        if let Some(session) = self.session_mut(session_id) {
            session.mark_bad();
        }

        if self.pool.is_none() {
            // Without a pool the only way to get a fresh identity is a new browser
            if let Some(client) = self.shared.take() {
                close_client(client).await;
            }
        }

        self.close_unusable().await;
    }

    /// Drop sessions that were retired or wore out, closing their browsers
    async fn close_unusable(&mut self) {
        let Some(pool) = self.pool.as_mut() else {
            return;
        };

        for session in pool.evict_unusable() {
            ::log::info!(
                "Discarding session {} retired={} error_score={}",
                session.id(),
                session.is_retired(),
                session.error_score()
            );
            if let Some(client) = self.clients.remove(&session.id()) {
                close_client(client).await;
            }
        }
    }

    async fn close_all(&mut self) {
        for (_, client) in self.clients.drain() {
            close_client(client).await;
        }
        if let Some(client) = self.shared.take() {
            close_client(client).await;
        }
    }

    /// Connects to the WebDriver instance, trying common local ports if the configured
    /// URL is unreachable
    async fn connect(&self) -> Result<Client, ScrapeError> {
        match self.connect_to(&self.webdriver_url).await {
            Ok(client) => return Ok(client),
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://localhost:4444", // Selenium / geckodriver default
            "http://127.0.0.1:4444",
        ];

        for url in fallback_urls {
            if url == self.webdriver_url {
                continue;
            }

            ::log::warn!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect_to(url).await {
                return Ok(client);
            }
        }

        Err(ScrapeError::Connect(format!(
            "no WebDriver server reachable at {} or the default local ports; \
             start one or set WEBDRIVER_URL",
            self.webdriver_url
        )))
    }

    async fn connect_to(&self, url: &str) -> Result<Client, ScrapeError> {
        let mut args = vec![format!(
            "--window-size={},{}",
            self.viewport.0, self.viewport.1
        )];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);

        let client = timeout(self.launch_timeout, builder.connect(url))
            .await
            .map_err(|_| ScrapeError::Timeout {
                operation: "webdriver connect",
                timeout: self.launch_timeout,
            })?
            .map_err(|e| ScrapeError::Connect(e.to_string()))?;

        client
            .set_window_size(self.viewport.0, self.viewport.1)
            .await?;
        ::log::debug!("Connected to WebDriver at {}", url);
        Ok(client)
    }
}

async fn close_client(client: Client) {
    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver client: {}", e);
    }
}

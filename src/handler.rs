use crate::config::{ScraperConfig, ScreenshotConfig, SelectorConfig};
use crate::error::{ConfigError, ScrapeError};
use crate::extract::{self, SessionHealthSignal, TitleFallback};
use crate::page::{PageHandle, PageSnapshot};
use crate::results::OutputRecord;
use crate::session::SessionHandle;
use crate::sink::OutputSink;

/// What happened to a page that was handled without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A record was pushed to the sink
    Emitted(OutputRecord),
    /// The price container never appeared; nothing was pushed
    Aborted { selector: String },
}

/// Runs the extraction pipeline for one loaded product page
#[derive(Debug, Clone)]
pub struct PageHandler {
    selectors: SelectorConfig,
    title_fallback: TitleFallback,
    screenshot: ScreenshotConfig,
}

impl PageHandler {
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors: config.selectors.clone(),
            title_fallback: TitleFallback::new(&config.title_fallback)?,
            screenshot: config.screenshot.clone(),
        })
    }

    /// Handle one loaded page
    ///
    /// Session classification is advisory: a blocked session is retired but extraction still
    /// runs. A missing price container ends the page with [`HandlerOutcome::Aborted`]; name
    /// misses fall back to the sentinel; screenshot and transport failures are returned.
    pub async fn handle<P: PageHandle + ?Sized>(
        &self,
        page: &P,
        session: Option<&mut dyn SessionHandle>,
        request_url: &str,
        sink: &dyn OutputSink,
    ) -> Result<HandlerOutcome, ScrapeError> {
        let snapshot = PageSnapshot::capture(page).await?;
        ::log::info!("crawling title={:?} url={}", snapshot.title, snapshot.url);

        let signal = SessionHealthSignal::classify(&snapshot.title);
        match signal {
            SessionHealthSignal::Blocked => {
                ::log::error!("session blocked url={}", snapshot.url)
            }
            SessionHealthSignal::Suspect => {
                ::log::info!("session suspect url={}", snapshot.url)
            }
            SessionHealthSignal::Healthy => {}
        }
        if let Some(session) = session {
            signal.apply(session);
        }

        let price = match extract::price::extract(page, &self.selectors).await {
            Ok(price) => price,
            Err(ScrapeError::SelectorNotFound { selector, timeout }) => {
                ::log::error!(
                    "selector not found selector={} url={} timeout={:?}",
                    selector,
                    snapshot.url,
                    timeout
                );
                return Ok(HandlerOutcome::Aborted { selector });
            }
            Err(e) => return Err(e),
        };
        if price.price.is_empty() {
            ::log::warn!("price container is empty url={}", snapshot.url);
        }

        let name =
            extract::name::extract(page, &snapshot.title, &self.selectors, &self.title_fallback)
                .await;

        let name_source = name.source;

        let screenshot = extract::screenshot::capture(page, &self.screenshot).await?;

        let record = extract::record::assemble(request_url, price, name, screenshot);
        ::log::info!(
            "scraped data url={} name={:?} name_source={:?} price={:?}",
            record.url,
            record.name,
            name_source,
            record.price
        );

        sink.push_data(&record)?;
        Ok(HandlerOutcome::Emitted(record))
    }
}

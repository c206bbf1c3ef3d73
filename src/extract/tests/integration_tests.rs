use super::{CountingPage, product_page, viewport_png};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::handler::{HandlerOutcome, PageHandler};
use crate::page::HtmlPage;
use crate::results::{NAME_SCRAPE_ERROR, OutputRecord};
use crate::session::SessionHandle;
use crate::sink::{MemorySink, OutputSink};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::sync::atomic::Ordering;

#[derive(Default)]
struct RecordingSession {
    retired: u32,
    marked_bad: u32,
}

impl SessionHandle for RecordingSession {
    fn retire(&mut self) {
        self.retired += 1;
    }

    fn mark_bad(&mut self) {
        self.marked_bad += 1;
    }
}

fn handler() -> PageHandler {
    PageHandler::new(&ScraperConfig::default()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_record() {
    let html = product_page("Widget X - The Home Depot", &["$", "19", ".", "99"], None);
    let page =
        HtmlPage::new("https://example.com/p/123?loaded", html).with_screenshot(viewport_png());
    let sink = MemorySink::new();
    let mut session = RecordingSession::default();

    let outcome = handler()
        .handle(&page, Some(&mut session), "https://example.com/p/123", &sink)
        .await
        .unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(outcome, HandlerOutcome::Emitted(record.clone()));
    assert_eq!(record.url, "https://example.com/p/123");
    assert_eq!(record.name, "Widget X");
    assert_eq!(record.price, "$19.99");
    assert_eq!(record.screenshot.encoding, "base64");
    assert_eq!(record.screenshot.kind, "image/png");

    let png = STANDARD.decode(&record.screenshot.img).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (1280, 540));

    assert_eq!((session.retired, session.marked_bad), (0, 0));
}

#[tokio::test]
async fn test_blocked_session_still_extracts() {
    let html = product_page("Blocked", &["$", "5"], Some("Hammer"));
    let page = HtmlPage::new("https://example.com/p/1", html).with_screenshot(viewport_png());
    let sink = MemorySink::new();
    let mut session = RecordingSession::default();

    let outcome = handler()
        .handle(&page, Some(&mut session), "https://example.com/p/1", &sink)
        .await
        .unwrap();

    assert_eq!(session.retired, 1);
    assert_eq!(session.marked_bad, 0);
    assert!(matches!(
        outcome,
        HandlerOutcome::Emitted(ref r) if r.price == "$5" && r.name == "Hammer"
    ));
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn test_suspect_session_is_marked_bad() {
    let html = product_page(
        "Not sure if blocked, might also be a connection error",
        &[],
        None,
    );
    let page = HtmlPage::new("https://example.com/p/1", html).with_screenshot(viewport_png());
    let sink = MemorySink::new();
    let mut session = RecordingSession::default();

    handler()
        .handle(&page, Some(&mut session), "https://example.com/p/1", &sink)
        .await
        .unwrap();

    assert_eq!((session.retired, session.marked_bad), (0, 1));
    let records = sink.records();
    assert_eq!(records[0].price, "");
    // The pattern captures the whole interstitial title when no suffix is present
    assert_eq!(
        records[0].name,
        "Not sure if blocked, might also be a connection error"
    );
}

#[tokio::test]
async fn test_missing_price_container_aborts() {
    let html = r#"<html><head><title>Widget - The Home Depot</title></head><body></body></html>"#;
    let page = CountingPage::new(
        HtmlPage::new("https://example.com/p/1", html).with_screenshot(viewport_png()),
    );
    let sink = MemorySink::new();

    let outcome = handler()
        .handle(&page, None, "https://example.com/p/1", &sink)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandlerOutcome::Aborted {
            selector: "#standard-price > div > div".to_string()
        }
    );
    assert!(sink.records().is_empty());
    assert_eq!(page.waits.load(Ordering::SeqCst), 1);
    assert_eq!(page.screenshots.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_screenshot_failure_propagates() {
    let html = product_page("Widget - The Home Depot", &["$", "1"], None);
    let page = HtmlPage::new("https://example.com/p/1", html);
    let sink = MemorySink::new();

    let err = handler()
        .handle(&page, None, "https://example.com/p/1", &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Screenshot(_)));
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_degraded_name_still_emits_complete_record() {
    let html = product_page("", &["$", "3"], None);
    let page = HtmlPage::new("https://example.com/p/7", html).with_screenshot(viewport_png());
    let sink = MemorySink::new();

    handler()
        .handle(&page, None, "https://example.com/p/7", &sink)
        .await
        .unwrap();

    let records = sink.records();
    assert_eq!(records[0].name, NAME_SCRAPE_ERROR);
    assert_eq!(records[0].price, "$3");
    assert!(!records[0].screenshot.img.is_empty());
}

struct FailingSink;

impl OutputSink for FailingSink {
    fn push_data(&self, _record: &OutputRecord) -> Result<(), ScrapeError> {
        Err(ScrapeError::Io(std::io::Error::other("disk full")))
    }
}

#[tokio::test]
async fn test_sink_failure_is_reported() {
    let html = product_page("Widget - The Home Depot", &["$", "1"], None);
    let page = HtmlPage::new("https://example.com/p/1", html).with_screenshot(viewport_png());

    let err = handler()
        .handle(&page, None, "https://example.com/p/1", &FailingSink)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Io(_)));
}

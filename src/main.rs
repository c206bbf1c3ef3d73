use clap::Parser;
use product_page::handler::{HandlerOutcome, PageHandler};
use product_page::page::HtmlPage;
use product_page::sink::DatasetSink;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let input = match args.input_record() {
        Ok(input) => input,
        Err(e) => {
            ::log::error!("Invalid input: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let sink = match DatasetSink::open(&config.dataset_dir) {
        Ok(sink) => sink,
        Err(e) => {
            ::log::error!(
                "Failed to open dataset {}: {}",
                config.dataset_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    if let Some(html_path) = &args.replay_html {
        return replay(&args, html_path, &config, &input.start_url, &sink).await;
    }

    // Print WebDriver info message
    println!("Note: scraping requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL if not using the default {}",
        config.webdriver_url
    );

    match product_page::crawlers::web::run(&config, &input, &sink).await {
        Ok(stats) if stats.requests_failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            ::log::error!("Failed to run scraper: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the pipeline once against a saved page
async fn replay(
    args: &Args,
    html_path: &std::path::Path,
    config: &product_page::config::ScraperConfig,
    url: &str,
    sink: &DatasetSink,
) -> ExitCode {
    let html = match std::fs::read_to_string(html_path) {
        Ok(html) => html,
        Err(e) => {
            ::log::error!("Failed to read {}: {}", html_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut page = HtmlPage::new(url, html);
    if let Some(png_path) = &args.replay_screenshot {
        match std::fs::read(png_path) {
            Ok(png) => page = page.with_screenshot(png),
            Err(e) => {
                ::log::error!("Failed to read {}: {}", png_path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let handler = match PageHandler::new(config) {
        Ok(handler) => handler,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match handler.handle(&page, None, url, sink).await {
        Ok(HandlerOutcome::Emitted(record)) => {
            ::log::info!("Replay stored record in {}", sink.dir().display());
            ::log::debug!("Replay record name={:?} price={:?}", record.name, record.price);
            ExitCode::SUCCESS
        }
        Ok(HandlerOutcome::Aborted { selector }) => {
            ::log::warn!("Replay produced no record, missing {}", selector);
            ExitCode::FAILURE
        }
        Err(e) => {
            ::log::error!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

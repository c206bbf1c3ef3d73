use crate::results::{NameResult, OutputRecord, PriceResult, ScreenshotResult};

/// Combine the stage results into the record pushed to the sink. Values are carried over
/// as-is, sentinel names and empty prices included.
pub fn assemble(
    url: &str,
    price: PriceResult,
    name: NameResult,
    screenshot: ScreenshotResult,
) -> OutputRecord {
    OutputRecord {
        url: url.to_string(),
        name: name.name,
        price: price.price,
        screenshot,
    }
}

use crate::config::SelectorConfig;
use crate::error::ScrapeError;
use crate::page::PageHandle;
use crate::results::PriceResult;

/// Read the rendered price from the price container
///
/// Fails with [`ScrapeError::SelectorNotFound`] when the container does not show up within
/// the configured wait. A container without fragments yields an empty price.
pub async fn extract<P: PageHandle + ?Sized>(
    page: &P,
    selectors: &SelectorConfig,
) -> Result<PriceResult, ScrapeError> {
    page.wait_for_selector(&selectors.price_container, selectors.price_timeout())
        .await?;

    let fragments = page
        .text_contents(&selectors.price_container, &selectors.price_fragment)
        .await?;
    ::log::debug!("Price container holds {} fragments", fragments.len());

    Ok(PriceResult {
        price: join_fragments(fragments),
    })
}

/// Concatenate fragment texts in the order given, skipping empty or missing ones
pub fn join_fragments<I>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    fragments
        .into_iter()
        .flatten()
        .filter(|text| !text.is_empty())
        .collect()
}

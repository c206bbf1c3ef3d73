use super::product_page;
use crate::config::{SelectorConfig, TitleFallbackConfig};
use crate::extract::name::{self, TitleFallback};
use crate::page::HtmlPage;
use crate::results::{NAME_SCRAPE_ERROR, NameSource};

fn fallback() -> TitleFallback {
    TitleFallback::new(&TitleFallbackConfig::default()).unwrap()
}

#[tokio::test]
async fn test_structured_name_wins() {
    let title = "Something Else Entirely - The Home Depot";
    let page = HtmlPage::new("u", product_page(title, &["$1"], Some("Husky Tool Chest")));

    let result = name::extract(&page, title, &SelectorConfig::default(), &fallback()).await;
    assert_eq!(result.name, "Husky Tool Chest");
    assert_eq!(result.source, NameSource::Selector);
}

#[tokio::test]
async fn test_structured_name_is_trimmed() {
    let title = "Chest - The Home Depot";
    let page = HtmlPage::new("u", product_page(title, &["$1"], Some("\n   Chest  \n")));

    let result = name::extract(&page, title, &SelectorConfig::default(), &fallback()).await;
    assert_eq!(result.name, "Chest");
}

#[tokio::test]
async fn test_falls_back_to_title() {
    let title = "Foo Bar - The Home Depot";
    let page = HtmlPage::new("u", product_page(title, &["$1"], None));

    let result = name::extract(&page, title, &SelectorConfig::default(), &fallback()).await;
    assert_eq!(result.name, "Foo Bar");
    assert_eq!(result.source, NameSource::TitleFallback);
}

#[tokio::test]
async fn test_empty_structured_name_falls_back() {
    let title = "Foo Bar - The Home Depot";
    let page = HtmlPage::new("u", product_page(title, &["$1"], Some("   ")));

    let result = name::extract(&page, title, &SelectorConfig::default(), &fallback()).await;
    assert_eq!(result.name, "Foo Bar");
}

#[tokio::test]
async fn test_sentinel_when_both_stages_fail() {
    let page = HtmlPage::new("u", product_page("", &["$1"], None));

    let result = name::extract(&page, "", &SelectorConfig::default(), &fallback()).await;
    assert_eq!(result.name, NAME_SCRAPE_ERROR);
    assert!(result.is_sentinel());
}

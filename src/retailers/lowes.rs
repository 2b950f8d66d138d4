//! Lowe's

use std::time::Duration;

use crate::traits::{RetailerConfig, RetailerSelectors};

pub const NAME: &str = "lowes";
pub const BASE_URL: &str = "https://www.lowes.com";

pub fn definition(base_url: &str) -> RetailerConfig {
    RetailerConfig {
        name: NAME.to_string(),
        display_name: "Lowes".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        product_url_pattern: "{base}/pd/{id}".to_string(),
        search_url_pattern: "{base}/search?searchTerm={query}".to_string(),
        timeout: Duration::from_secs(20),
        follow_search_results: true,
        selectors: RetailerSelectors {
            price: ".main-price, [data-testid='product-price'], [itemprop='price']".to_string(),
            title: "h1.product-brand-description, h1[data-testid='product-title']".to_string(),
            brand: Some("a.product-brand, [itemprop='brand']".to_string()),
            model: Some(".product-model, [data-testid='model-number']".to_string()),
            description: Some(".romance-copy, .overview-description".to_string()),
            breadcrumb: Some("ol.breadcrumbs a, nav[aria-label='breadcrumb'] a".to_string()),
            availability: Some(".fulfillment-method .stock-status, [data-testid='availability']".to_string()),
            out_of_stock_marker: Some(".out-of-stock-banner".to_string()),
            spec_row: Some("table.specs-table tr".to_string()),
            spec_name: "th, td.spec-label".to_string(),
            spec_value: "td:not(.spec-label)".to_string(),
            search_result: ".product-card, [data-selector='splp-prd-grd']".to_string(),
            search_link: "a.product-card__link, a[data-selector='prd-description-holder']".to_string(),
            search_title: ".product-card__title, .description-spn".to_string(),
            search_price: ".product-card__price, [data-selector='splp-prd-act-$']".to_string(),
        },
    }
}

//! Build.com

use std::time::Duration;

use crate::traits::{RetailerConfig, RetailerSelectors};

pub const NAME: &str = "build";
pub const BASE_URL: &str = "https://www.build.com";

pub fn definition(base_url: &str) -> RetailerConfig {
    RetailerConfig {
        name: NAME.to_string(),
        display_name: "Build".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        product_url_pattern: "{base}/product/summary/{id}".to_string(),
        search_url_pattern: "{base}/search?term={query}".to_string(),
        timeout: Duration::from_secs(10),
        follow_search_results: false,
        selectors: RetailerSelectors {
            price: "[data-automation='price'], .js-price".to_string(),
            title: "h1[data-automation='product-title'], h1.product-title".to_string(),
            brand: Some("[data-automation='manufacturer-name'], .product-manufacturer".to_string()),
            model: Some("[data-automation='model-number'], .model-number".to_string()),
            description: Some("[data-automation='product-description']".to_string()),
            breadcrumb: Some("nav[aria-label='breadcrumb'] a".to_string()),
            availability: Some("[data-automation='stock-status'], .js-availability".to_string()),
            out_of_stock_marker: Some("[data-automation='out-of-stock']".to_string()),
            spec_row: Some("[data-automation='specifications'] tr".to_string()),
            spec_name: "th".to_string(),
            spec_value: "td".to_string(),
            search_result: "[data-automation='product-card'], .product-tile".to_string(),
            search_link: "a[data-automation='product-card-link'], a.product-tile-link".to_string(),
            search_title: "[data-automation='product-card-title'], .product-tile-name".to_string(),
            search_price: "[data-automation='product-card-price'], .product-tile-price".to_string(),
        },
    }
}

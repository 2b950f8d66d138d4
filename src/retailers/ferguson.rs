//! Ferguson plumbing supply

use std::time::Duration;

use crate::traits::{RetailerConfig, RetailerSelectors};

pub const NAME: &str = "ferguson";
pub const BASE_URL: &str = "https://www.ferguson.com";

/// Ferguson's search listing already carries price and title, so results
/// are not followed.
pub fn definition(base_url: &str) -> RetailerConfig {
    RetailerConfig {
        name: NAME.to_string(),
        display_name: "Ferguson".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        product_url_pattern: "{base}/product/{id}".to_string(),
        search_url_pattern: "{base}/search/?q={query}".to_string(),
        timeout: Duration::from_secs(15),
        follow_search_results: false,
        selectors: RetailerSelectors {
            price: ".product-price, .pdp-price__value".to_string(),
            title: "h1.product-title, h1.pdp-title".to_string(),
            brand: Some(".product-manufacturer, .pdp-brand".to_string()),
            model: Some(".product-mfr-number, .pdp-mfr".to_string()),
            description: Some(".product-description, .pdp-overview".to_string()),
            breadcrumb: Some(".breadcrumb li a".to_string()),
            availability: Some(".availability-message, .pdp-availability".to_string()),
            out_of_stock_marker: None,
            spec_row: Some(".specifications dl div, table.product-specs tr".to_string()),
            spec_name: "dt, th".to_string(),
            spec_value: "dd, td".to_string(),
            search_result: ".sr-product, .product-tile".to_string(),
            search_link: "a.sr-product__link, a.product-tile__link".to_string(),
            search_title: ".sr-product__title, .product-tile__name".to_string(),
            search_price: ".sr-product__price, .product-tile__price".to_string(),
        },
    }
}

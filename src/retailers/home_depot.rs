//! The Home Depot

use std::time::Duration;

use crate::traits::{RetailerConfig, RetailerSelectors};

pub const NAME: &str = "homedepot";
pub const BASE_URL: &str = "https://www.homedepot.com";

/// Home Depot redirects `/p/{id}` to the canonical product page, but its
/// storefront is slow behind bot protection, hence the long budget.
pub fn definition(base_url: &str) -> RetailerConfig {
    RetailerConfig {
        name: NAME.to_string(),
        display_name: "Home Depot".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        product_url_pattern: "{base}/p/{id}".to_string(),
        search_url_pattern: "{base}/s/{query}".to_string(),
        timeout: Duration::from_secs(30),
        follow_search_results: true,
        selectors: RetailerSelectors {
            price: "[data-testid='price-format'], .price-format__main-price".to_string(),
            title: "h1.product-details__title, h1[data-testid='product-title']".to_string(),
            brand: Some(".product-details__brand--link, [data-testid='product-brand']".to_string()),
            model: Some(".product-info-bar .model-number, [data-testid='model-number']".to_string()),
            description: Some(".product-overview__description".to_string()),
            breadcrumb: Some("nav.breadcrumbs a".to_string()),
            availability: Some(".fulfillment__wrapper, [data-testid='fulfillment-status']".to_string()),
            out_of_stock_marker: Some(".fulfillment__unavailable".to_string()),
            spec_row: Some(".specifications__row, .specifications__table tr".to_string()),
            spec_name: ".specifications__cell--label, th".to_string(),
            spec_value: ".specifications__cell:not(.specifications__cell--label), td".to_string(),
            search_result: ".browse-search__pod, [data-testid='product-pod']".to_string(),
            search_link: "a.product-pod__title, a[data-testid='product-header']".to_string(),
            search_title: ".product-header__title, [data-testid='product-header'] span".to_string(),
            search_price: ".price-format__main-price, [data-testid='price-format']".to_string(),
        },
    }
}

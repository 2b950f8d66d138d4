//! Traits and interfaces for retailer-agnostic price extraction

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FailureReason;
use crate::models::{ProductIdentifier, RetailerProduct};

/// Browser-like User-Agent sent with every retailer request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Configuration for a retailer extractor
#[derive(Debug, Clone)]
pub struct RetailerConfig {
    /// Key used in results and inventory columns
    pub name: String,
    /// Human-readable name, used for inventory column headers
    pub display_name: String,
    /// Base URL for the website, without trailing slash
    pub base_url: String,
    /// Direct product page pattern with `{base}` and `{id}` placeholders
    pub product_url_pattern: String,
    /// Search URL pattern with `{base}` and `{query}` placeholders
    pub search_url_pattern: String,
    /// Budget for this retailer's whole lookup
    pub timeout: Duration,
    /// Fetch the first search hit's product page for full details
    pub follow_search_results: bool,
    /// CSS selectors for extracting data
    pub selectors: RetailerSelectors,
}

/// CSS selectors for the parts of a retailer's product and search pages
#[derive(Debug, Clone, Default)]
pub struct RetailerSelectors {
    /// Price on the product page
    pub price: String,
    /// Product title on the product page
    pub title: String,
    /// Brand name (optional)
    pub brand: Option<String>,
    /// Model number (optional)
    pub model: Option<String>,
    /// Overview or description block (optional)
    pub description: Option<String>,
    /// Breadcrumb links; the last one is used as the category (optional)
    pub breadcrumb: Option<String>,
    /// Element whose text describes availability (optional)
    pub availability: Option<String>,
    /// Element whose mere presence means out of stock (optional)
    pub out_of_stock_marker: Option<String>,
    /// One row of the specification table (optional)
    pub spec_row: Option<String>,
    /// Spec name cell within a row
    pub spec_name: String,
    /// Spec value cell within a row
    pub spec_value: String,
    /// One product card in the search results listing
    pub search_result: String,
    /// Product link within a search result card
    pub search_link: String,
    /// Title within a search result card
    pub search_title: String,
    /// Price within a search result card
    pub search_price: String,
}

/// Trait for retailer-specific extractors
#[async_trait]
pub trait RetailerExtractor: Send + Sync {
    /// Get the configuration for this extractor
    fn config(&self) -> &RetailerConfig;

    /// Short retailer key used in results and logs
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Look the identifier up on this retailer.
    ///
    /// # Returns
    /// * `Result<RetailerProduct, FailureReason>` - The extracted product, or
    ///   why this retailer could not provide one
    async fn fetch_and_extract(
        &self,
        identifier: &ProductIdentifier,
        timeout: Duration,
    ) -> Result<RetailerProduct, FailureReason>;

    /// Build the direct product page URL for an identifier
    fn build_product_url(&self, identifier: &ProductIdentifier) -> String {
        let encoded_id = urlencoding::encode(identifier.as_str());
        self.config()
            .product_url_pattern
            .replace("{base}", &self.config().base_url)
            .replace("{id}", &encoded_id)
    }

    /// Build the search page URL for an identifier
    fn build_search_url(&self, identifier: &ProductIdentifier) -> String {
        let encoded_term = urlencoding::encode(identifier.as_str());
        self.config()
            .search_url_pattern
            .replace("{base}", &self.config().base_url)
            .replace("{query}", &encoded_term)
    }
}

//! Selector-driven extractor shared by every HTML storefront

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{debug, warn};

use crate::error::{FailureReason, RetailerError};
use crate::extract::{self, CompiledSelectors};
use crate::models::{ProductIdentifier, RetailerProduct};
use crate::traits::{RetailerConfig, RetailerExtractor};

/// Outcome of one GET that got as far as a status line.
enum Page {
    Found(String),
    Status(u16),
}

/// Extractor for a retailer whose pages can be read with CSS selectors.
///
/// Tries the direct product URL first and falls back to the search page when
/// that does not produce a product.
pub struct HtmlRetailer {
    client: Client,
    config: RetailerConfig,
    selectors: CompiledSelectors,
}

impl HtmlRetailer {
    /// Create an extractor that shares `client`'s connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`RetailerError::InvalidSelector`] if any configured selector
    /// does not parse.
    pub fn new(client: Client, config: RetailerConfig) -> Result<Self, RetailerError> {
        let selectors = CompiledSelectors::compile(&config.name, &config.selectors)?;
        Ok(Self {
            client,
            config,
            selectors,
        })
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Page, FailureReason> {
        debug!("Fetching {} for {}", url, self.config.name);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| FailureReason::from_reqwest(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Page::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FailureReason::from_reqwest(&e, timeout))?;

        Ok(Page::Found(body))
    }

    /// Direct lookup. `None` means the page gave us nothing and search
    /// should be tried.
    async fn direct_lookup(
        &self,
        identifier: &ProductIdentifier,
        timeout: Duration,
    ) -> Result<Option<RetailerProduct>, FailureReason> {
        let product_url = self.build_product_url(identifier);

        let page = match self.fetch(&product_url, timeout).await {
            Ok(page) => page,
            Err(FailureReason::Timeout(limit)) => return Err(FailureReason::Timeout(limit)),
            Err(e) => {
                debug!(
                    "Direct lookup for {} on {} failed ({}), trying search",
                    identifier, self.config.name, e
                );
                return Ok(None);
            }
        };

        match page {
            Page::Found(body) => {
                let product = extract::parse_product_page(&body, &product_url, &self.selectors);
                if product.is_blank() {
                    debug!(
                        "Direct page for {} on {} had no product markup",
                        identifier, self.config.name
                    );
                    Ok(None)
                } else {
                    Ok(Some(product))
                }
            }
            Page::Status(status) => {
                debug!(
                    "Direct lookup for {} on {} returned {}",
                    identifier, self.config.name, status
                );
                Ok(None)
            }
        }
    }

    async fn search_lookup(
        &self,
        identifier: &ProductIdentifier,
        timeout: Duration,
    ) -> Result<RetailerProduct, FailureReason> {
        let search_url = self.build_search_url(identifier);

        let body = match self.fetch(&search_url, timeout).await? {
            Page::Found(body) => body,
            Page::Status(status) => return Err(FailureReason::HttpError(status)),
        };

        let hit = extract::parse_first_search_hit(&body, &self.config.base_url, &self.selectors)
            .ok_or_else(|| {
                FailureReason::ParseError(format!("no search results for {identifier}"))
            })?;

        let summary = RetailerProduct::from(hit);

        if !self.config.follow_search_results {
            return Ok(summary);
        }

        match self.fetch(&summary.url, timeout).await {
            Ok(Page::Found(body)) => {
                let mut detailed = extract::parse_product_page(&body, &summary.url, &self.selectors);
                detailed.fill_missing_from(summary);
                Ok(detailed)
            }
            Ok(Page::Status(status)) => {
                warn!(
                    "Following search result {} on {} returned {}, keeping summary",
                    summary.url, self.config.name, status
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(
                    "Following search result {} on {} failed ({}), keeping summary",
                    summary.url, self.config.name, e
                );
                Ok(summary)
            }
        }
    }
}

#[async_trait]
impl RetailerExtractor for HtmlRetailer {
    fn config(&self) -> &RetailerConfig {
        &self.config
    }

    async fn fetch_and_extract(
        &self,
        identifier: &ProductIdentifier,
        timeout: Duration,
    ) -> Result<RetailerProduct, FailureReason> {
        if let Some(product) = self.direct_lookup(identifier, timeout).await? {
            return Ok(product);
        }

        self.search_lookup(identifier, timeout).await
    }
}

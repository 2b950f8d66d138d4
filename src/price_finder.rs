//! # Price Finder
//!
//! Ties a [`SearchDispatcher`] to the inventory workflow: one lookup per
//! product, and one inventory row per successful lookup.
//!
//! ## Flow
//!
//! - **Form entries**: [`PriceFinder::add_product`] searches with the entry's
//!   brand hint, enriches blank fields from the result and appends a row.
//! - **Scanned barcodes**: [`PriceFinder::process_captures`] drains a channel
//!   of [`CaptureEvent`]s and runs the same path for each decoded code.
//!
//! ## Partial Results
//!
//! A search where some retailers failed still adds a row. The failures are
//! logged as a warning and kept in [`SearchResult::error`]; only a malformed
//! product number stops a product from being added.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::capture::CaptureEvent;
use crate::config::AppConfig;
use crate::dispatcher::SearchDispatcher;
use crate::error::ValidationError;
use crate::inventory::{InventoryStore, ProductEntry};
use crate::models::SearchResult;

pub struct PriceFinder {
    dispatcher: SearchDispatcher,
}

impl PriceFinder {
    pub fn new(dispatcher: SearchDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build a finder for the configured retailers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or a retailer definition cannot be
    /// built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dispatcher = SearchDispatcher::from_config(config)?;
        info!(
            "Price finder ready for retailers: {}",
            dispatcher.retailer_names().join(", ")
        );
        Ok(Self::new(dispatcher))
    }

    /// An empty inventory table with one column triple per retailer.
    pub fn new_store(&self) -> InventoryStore {
        InventoryStore::new(
            self.dispatcher.retailer_names().to_vec(),
            self.dispatcher.display_names(),
        )
    }

    /// Search every retailer for a product number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed product number.
    pub async fn lookup(
        &self,
        product_number: &str,
        brand: Option<&str>,
    ) -> Result<SearchResult, ValidationError> {
        self.dispatcher.search_all_retailers(product_number, brand).await
    }

    /// Search for `entry` and append it to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed product number; nothing
    /// is appended in that case.
    pub async fn add_product(
        &self,
        entry: ProductEntry,
        store: &mut InventoryStore,
    ) -> Result<SearchResult, ValidationError> {
        let result = self
            .dispatcher
            .search_all_retailers(&entry.product_number, entry.brand_hint())
            .await?;

        if let Some(failures) = &result.error {
            warn!("Some searches failed: {}", failures);
        }

        let row = store.append(entry, &result);
        info!(
            "Added {} ({}) to inventory",
            row.entry.product_number, row.entry.brand
        );

        Ok(result)
    }

    /// Look up every decoded barcode until the channel closes.
    ///
    /// Returns the number of rows added.
    pub async fn process_captures(
        &self,
        mut events: mpsc::Receiver<CaptureEvent>,
        store: &mut InventoryStore,
    ) -> usize {
        let mut added = 0;

        while let Some(event) = events.recv().await {
            let CaptureEvent::Decoded(code) = event;

            match self.add_product(ProductEntry::new(code.as_str()), store).await {
                Ok(_) => added += 1,
                Err(e) => error!("Skipping scanned code {:?}: {}", code, e),
            }
        }

        info!("Capture stream closed after adding {} products", added);
        added
    }
}

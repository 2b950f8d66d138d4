//! Concurrent fan-out of one product lookup to every configured retailer

use std::collections::BTreeMap;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::aggregator::{ResultAggregator, RetailerOutcome};
use crate::config::AppConfig;
use crate::error::{FailureReason, RetailerError, ValidationError};
use crate::models::{ProductIdentifier, SearchResult};
use crate::retailers;
use crate::traits::RetailerExtractor;

/// Runs every retailer extractor for a product and merges what comes back.
///
/// Extractor order is the priority order used when retailers disagree on
/// product details.
pub struct SearchDispatcher {
    extractors: Vec<Box<dyn RetailerExtractor>>,
    aggregator: ResultAggregator,
    deadline: Option<Duration>,
}

impl SearchDispatcher {
    /// Later extractors reusing an earlier extractor's name are dropped.
    pub fn new(extractors: Vec<Box<dyn RetailerExtractor>>) -> Self {
        let mut priority: Vec<String> = Vec::with_capacity(extractors.len());
        let extractors: Vec<_> = extractors
            .into_iter()
            .filter(|e| {
                if priority.iter().any(|name| name == e.name()) {
                    warn!("Ignoring duplicate retailer {}", e.name());
                    false
                } else {
                    priority.push(e.name().to_string());
                    true
                }
            })
            .collect();
        Self {
            extractors,
            aggregator: ResultAggregator::new(priority),
            deadline: None,
        }
    }

    /// Build the dispatcher for the configured retailers, sharing one HTTP
    /// client between them.
    ///
    /// # Errors
    ///
    /// Returns [`RetailerError`] if the HTTP client cannot be built or a
    /// retailer definition is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, RetailerError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let extractors = retailers::build_extractors(&client, config.retailer_configs()?)?;

        let mut dispatcher = Self::new(extractors);
        dispatcher.deadline = config.search_deadline;
        Ok(dispatcher)
    }

    pub fn retailer_names(&self) -> &[String] {
        self.aggregator.priority()
    }

    /// Display names keyed by retailer name, for inventory column headers.
    pub fn display_names(&self) -> BTreeMap<String, String> {
        self.extractors
            .iter()
            .map(|e| (e.name().to_string(), e.config().display_name.clone()))
            .collect()
    }

    /// Search every retailer and wait for all of them to finish or time out.
    ///
    /// Uses the configured outer deadline, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] without contacting any retailer when the
    /// identifier is malformed. Retailer failures never surface here; they
    /// are reported inside the returned [`SearchResult`].
    pub async fn search_all_retailers(
        &self,
        identifier: &str,
        brand_hint: Option<&str>,
    ) -> Result<SearchResult, ValidationError> {
        let identifier = ProductIdentifier::parse(identifier)?;
        Ok(self.dispatch(&identifier, brand_hint, self.deadline).await)
    }

    /// Like [`Self::search_all_retailers`], but gives up on every retailer
    /// still pending once `deadline` has passed and records it as timed out.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the identifier is malformed.
    pub async fn search_within(
        &self,
        identifier: &str,
        brand_hint: Option<&str>,
        deadline: Duration,
    ) -> Result<SearchResult, ValidationError> {
        let identifier = ProductIdentifier::parse(identifier)?;
        Ok(self.dispatch(&identifier, brand_hint, Some(deadline)).await)
    }

    async fn dispatch(
        &self,
        identifier: &ProductIdentifier,
        brand_hint: Option<&str>,
        deadline: Option<Duration>,
    ) -> SearchResult {
        info!(
            "Searching {} retailers for {}",
            self.extractors.len(),
            identifier
        );

        let mut pending: FuturesUnordered<_> = self
            .extractors
            .iter()
            .map(|extractor| run_extractor(extractor.as_ref(), identifier))
            .collect();

        let mut outcomes: BTreeMap<String, RetailerOutcome> = BTreeMap::new();

        let collect_all = async {
            while let Some((name, outcome)) = pending.next().await {
                match &outcome {
                    Ok(product) => info!(
                        "{} returned {} for {}",
                        name,
                        product.raw_price.as_deref().unwrap_or("no price"),
                        identifier
                    ),
                    Err(reason) => warn!("{} failed for {}: {}", name, identifier, reason),
                }
                outcomes.insert(name, outcome);
            }
        };

        match deadline {
            Some(limit) => {
                if tokio::time::timeout(limit, collect_all).await.is_err() {
                    warn!(
                        "Search for {} hit its {:?} deadline, abandoning pending retailers",
                        identifier, limit
                    );
                }
            }
            None => collect_all.await,
        }
        // Dropping the stream cancels whatever is still in flight.
        drop(pending);

        if let Some(limit) = deadline {
            for name in self.aggregator.priority() {
                outcomes
                    .entry(name.clone())
                    .or_insert(Err(FailureReason::Timeout(limit)));
            }
        }

        let result = self.aggregator.merge(Some(identifier), brand_hint, outcomes);

        let found = result.successful_retailers();
        if found == 0 {
            warn!("No retailer found {}", identifier);
        } else if found < result.retailers.len() {
            warn!(
                "Found {} on {} of {} retailers",
                identifier,
                found,
                result.retailers.len()
            );
        } else {
            info!("Found {} on all {} retailers", identifier, found);
        }

        result
    }
}

/// One retailer's lookup, bounded by that retailer's own timeout.
async fn run_extractor(
    extractor: &dyn RetailerExtractor,
    identifier: &ProductIdentifier,
) -> (String, RetailerOutcome) {
    let name = extractor.name().to_string();
    let timeout = extractor.config().timeout;
    debug!("Starting {} lookup with {:?} budget", name, timeout);

    let outcome = tokio::time::timeout(timeout, extractor.fetch_and_extract(identifier, timeout))
        .await
        .unwrap_or(Err(FailureReason::Timeout(timeout)));

    (name, outcome)
}

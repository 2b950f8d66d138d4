//! Merges per-retailer outcomes into one [`SearchResult`]

use std::collections::BTreeMap;

use crate::error::FailureReason;
use crate::models::{ProductIdentifier, RetailerPriceInfo, RetailerProduct, SearchResult};

/// What one retailer produced for a search.
pub type RetailerOutcome = Result<RetailerProduct, FailureReason>;

/// Brand values that say nothing about the actual manufacturer.
const GENERIC_BRANDS: &[&str] = &[
    "other",
    "generic",
    "unknown",
    "unknown brand",
    "unbranded",
    "n/a",
    "na",
    "none",
];

/// True for brand strings that should never win over a real brand.
pub fn is_generic_brand(brand: &str) -> bool {
    let brand = brand.trim().to_lowercase();
    brand.is_empty() || GENERIC_BRANDS.contains(&brand.as_str())
}

/// Pure merge step. Retailers listed first in `priority` win when details
/// conflict.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    priority: Vec<String>,
}

impl ResultAggregator {
    pub fn new(priority: Vec<String>) -> Self {
        Self { priority }
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn merge(
        &self,
        identifier: Option<&ProductIdentifier>,
        brand_hint: Option<&str>,
        mut outcomes: BTreeMap<String, RetailerOutcome>,
    ) -> SearchResult {
        let mut ordered: Vec<(String, Option<RetailerOutcome>)> = self
            .priority
            .iter()
            .map(|name| (name.clone(), outcomes.remove(name)))
            .collect();
        // Anything outside the configured order goes last, by name.
        ordered.extend(outcomes.into_iter().map(|(name, outcome)| (name, Some(outcome))));

        let mut result = SearchResult {
            identifier: identifier.cloned(),
            brand: brand_hint
                .filter(|hint| !is_generic_brand(hint))
                .map(|hint| hint.trim().to_string()),
            ..SearchResult::default()
        };
        let mut failures = Vec::new();

        for (name, outcome) in ordered {
            match outcome {
                Some(Ok(product)) => {
                    result
                        .retailers
                        .insert(name.clone(), RetailerPriceInfo::from_product(&product));
                    if product.url.trim().is_empty() {
                        failures.push(format!("{name}: no product link found"));
                        continue;
                    }
                    absorb(&mut result, product);
                }
                Some(Err(reason)) => {
                    result.retailers.insert(name.clone(), RetailerPriceInfo::empty());
                    failures.push(format!("{name}: {reason}"));
                }
                None => {
                    result.retailers.insert(name.clone(), RetailerPriceInfo::empty());
                    failures.push(format!("{name}: no result recorded"));
                }
            }
        }

        if !failures.is_empty() {
            result.error = Some(failures.join("; "));
        }

        result
    }
}

/// First non-empty value wins for every descriptive field; the brand is
/// only taken when no concrete brand is set yet.
fn absorb(result: &mut SearchResult, product: RetailerProduct) {
    fn fill(slot: &mut Option<String>, value: Option<String>) {
        if slot.is_none() {
            *slot = value.filter(|v| !v.trim().is_empty());
        }
    }

    if result.brand.is_none() {
        result.brand = product.brand.filter(|b| !is_generic_brand(b));
    }
    fill(&mut result.product_name, product.name);
    fill(&mut result.model_number, product.model);
    fill(&mut result.category, product.category);
    fill(&mut result.description, product.description);

    for (key, value) in product.specifications {
        result.specifications.entry(key).or_insert(value);
    }
}

#[cfg(test)]
#[path = "../aggregator_test.rs"]
mod tests;

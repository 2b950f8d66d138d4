//! Selector-driven field extraction from retailer markup.
//!
//! Everything here is synchronous and works on an already-downloaded body:
//! `scraper::Html` is not `Send`, so documents are parsed and dropped inside
//! these functions and only owned values are handed back to async callers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::RetailerError;
use crate::models::{RetailerProduct, StockStatus};
use crate::traits::RetailerSelectors;

static MODEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:model|mfr|manufacturer|item)(?:\s*(?:number\b|no\.|no\b|#))?(?:\s*[:#]\s*|\s+)")
        .expect("valid model label regex")
});

/// Phrases that mean the item cannot be bought right now. Checked before the
/// positive phrases so "not in stock" never reads as "in stock".
const OUT_OF_STOCK_PHRASES: &[&str] = &[
    "out of stock",
    "out-of-stock",
    "not in stock",
    "sold out",
    "unavailable",
    "not available",
    "discontinued",
    "no longer available",
];

const IN_STOCK_PHRASES: &[&str] = &[
    "in stock",
    "in-stock",
    "available",
    "ready for pickup",
    "ships in",
    "ships today",
    "add to cart",
];

/// Selectors parsed once per retailer so each lookup only walks the DOM.
#[derive(Debug)]
pub struct CompiledSelectors {
    price: Selector,
    title: Selector,
    brand: Option<Selector>,
    model: Option<Selector>,
    description: Option<Selector>,
    breadcrumb: Option<Selector>,
    availability: Option<Selector>,
    out_of_stock_marker: Option<Selector>,
    spec_row: Option<Selector>,
    spec_name: Selector,
    spec_value: Selector,
    search_result: Selector,
    search_link: Selector,
    search_title: Selector,
    search_price: Selector,
}

impl CompiledSelectors {
    /// # Errors
    ///
    /// Returns [`RetailerError::InvalidSelector`] naming the first selector
    /// that does not parse.
    pub fn compile(retailer: &str, selectors: &RetailerSelectors) -> Result<Self, RetailerError> {
        let parse = |field: &'static str, css: &str| {
            Selector::parse(css).map_err(|e| RetailerError::InvalidSelector {
                retailer: retailer.to_string(),
                field,
                reason: format!("{e:?}"),
            })
        };
        let parse_opt = |field: &'static str, css: &Option<String>| {
            css.as_deref().map(|s| parse(field, s)).transpose()
        };

        Ok(Self {
            price: parse("price", &selectors.price)?,
            title: parse("title", &selectors.title)?,
            brand: parse_opt("brand", &selectors.brand)?,
            model: parse_opt("model", &selectors.model)?,
            description: parse_opt("description", &selectors.description)?,
            breadcrumb: parse_opt("breadcrumb", &selectors.breadcrumb)?,
            availability: parse_opt("availability", &selectors.availability)?,
            out_of_stock_marker: parse_opt("out_of_stock_marker", &selectors.out_of_stock_marker)?,
            spec_row: parse_opt("spec_row", &selectors.spec_row)?,
            spec_name: parse("spec_name", &selectors.spec_name)?,
            spec_value: parse("spec_value", &selectors.spec_value)?,
            search_result: parse("search_result", &selectors.search_result)?,
            search_link: parse("search_link", &selectors.search_link)?,
            search_title: parse("search_title", &selectors.search_title)?,
            search_price: parse("search_price", &selectors.search_price)?,
        })
    }
}

/// First hit from a search results listing, with its inline summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: Option<String>,
    pub raw_price: Option<String>,
}

impl From<SearchHit> for RetailerProduct {
    fn from(hit: SearchHit) -> Self {
        Self {
            url: hit.url,
            raw_price: hit.raw_price,
            name: hit.title,
            ..Self::default()
        }
    }
}

/// Extracts every field a product page offers. Fields are independent: a
/// selector that matches nothing leaves that field empty.
pub fn parse_product_page(body: &str, page_url: &str, selectors: &CompiledSelectors) -> RetailerProduct {
    let document = Html::parse_document(body);
    let root = document.root_element();

    let first_text = |selector: &Option<Selector>| {
        selector
            .as_ref()
            .and_then(|sel| root.select(sel).find_map(element_text))
    };

    let raw_price = root.select(&selectors.price).find_map(price_text);
    let name = root.select(&selectors.title).find_map(element_text);

    let category = selectors
        .breadcrumb
        .as_ref()
        .and_then(|sel| root.select(sel).filter_map(element_text).last());

    let availability = first_text(&selectors.availability);
    let marker_present = selectors
        .out_of_stock_marker
        .as_ref()
        .is_some_and(|sel| root.select(sel).next().is_some());

    RetailerProduct {
        url: page_url.to_string(),
        raw_price,
        in_stock: normalize_stock(availability.as_deref(), marker_present),
        name,
        brand: first_text(&selectors.brand),
        model: first_text(&selectors.model).map(|m| strip_label(&m)),
        description: first_text(&selectors.description),
        category,
        specifications: extract_specifications(root, selectors),
    }
}

/// Returns the first result card that carries a usable link.
pub fn parse_first_search_hit(
    body: &str,
    base_url: &str,
    selectors: &CompiledSelectors,
) -> Option<SearchHit> {
    let document = Html::parse_document(body);

    document.select(&selectors.search_result).find_map(|card| {
        let href = card
            .select(&selectors.search_link)
            .find_map(|link| link.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.starts_with('#'))?;

        Some(SearchHit {
            url: resolve_url(base_url, href),
            title: card.select(&selectors.search_title).find_map(element_text),
            raw_price: card.select(&selectors.search_price).find_map(price_text),
        })
    })
}

fn extract_specifications(root: ElementRef<'_>, selectors: &CompiledSelectors) -> BTreeMap<String, String> {
    let mut specifications = BTreeMap::new();

    let Some(row_selector) = &selectors.spec_row else {
        return specifications;
    };

    for row in root.select(row_selector) {
        let name = row.select(&selectors.spec_name).find_map(element_text);
        let value = row.select(&selectors.spec_value).find_map(element_text);

        if let (Some(name), Some(value)) = (name, value) {
            let name = name.trim_end_matches(':').trim().to_string();
            if !name.is_empty() {
                specifications.insert(name, value);
            }
        }
    }

    specifications
}

/// Maps availability text and an explicit sold-out marker to tri-state.
/// Nothing conclusive means `Unknown`, never `InStock`.
pub fn normalize_stock(availability: Option<&str>, out_of_stock_marker: bool) -> StockStatus {
    if out_of_stock_marker {
        return StockStatus::OutOfStock;
    }

    let Some(text) = availability else {
        return StockStatus::Unknown;
    };
    let text = text.to_lowercase();

    if OUT_OF_STOCK_PHRASES.iter().any(|p| text.contains(p)) {
        StockStatus::OutOfStock
    } else if IN_STOCK_PHRASES.iter().any(|p| text.contains(p)) {
        StockStatus::InStock
    } else {
        StockStatus::Unknown
    }
}

/// Makes a link absolute against the retailer's base URL.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Trimmed, whitespace-collapsed text content; `None` when blank.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Price text, falling back to a microdata `content` attribute.
fn price_text(element: ElementRef<'_>) -> Option<String> {
    element_text(element).or_else(|| {
        element
            .value()
            .attr("content")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    })
}

/// Drops a leading "Model #", "Model Number:" or "Mfr #" style label.
fn strip_label(text: &str) -> String {
    MODEL_LABEL.replace(text, "").trim().to_string()
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;

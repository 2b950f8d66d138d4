//! Inventory rows built from search results.
//!
//! The store is owned by whoever drives lookups and handed in by `&mut`;
//! searches never touch it themselves.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::is_generic_brand;
use crate::models::{RetailerPriceInfo, SearchResult};

/// Brand selection meaning "not known yet".
pub const OTHER_BRAND: &str = "Other";

/// What the user typed into the add-product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub product_number: String,
    pub brand: String,
    pub model_name: String,
    pub category: String,
    pub quantity: u32,
    pub msrp: Option<String>,
    pub notes: String,
}

impl ProductEntry {
    pub fn new(product_number: impl Into<String>) -> Self {
        Self {
            product_number: product_number.into(),
            brand: OTHER_BRAND.to_string(),
            model_name: String::new(),
            category: String::new(),
            quantity: 1,
            msrp: None,
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn with_brand(mut self, brand: Option<&str>) -> Self {
        self.brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(OTHER_BRAND)
            .to_string();
        self
    }

    /// Brand to pass to the search, `None` for the "Other" sentinel.
    pub fn brand_hint(&self) -> Option<&str> {
        Some(self.brand.as_str()).filter(|b| !is_generic_brand(b))
    }

    /// Fill blanks from a search result. A brand the user picked is kept.
    pub fn enrich(&mut self, result: &SearchResult) {
        if self.brand_hint().is_none()
            && let Some(brand) = &result.brand
        {
            self.brand.clone_from(brand);
        }
        if self.model_name.trim().is_empty()
            && let Some(name) = &result.product_name
        {
            self.model_name.clone_from(name);
        }
        if self.category.trim().is_empty()
            && let Some(category) = &result.category
        {
            self.category.clone_from(category);
        }
    }
}

/// One retailer's three inventory columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerColumns {
    pub retailer: String,
    pub price: String,
    pub link: String,
    pub in_stock: String,
}

/// A flattened inventory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub date_added: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: ProductEntry,
    pub retailers: Vec<RetailerColumns>,
}

impl InventoryRow {
    /// Header/value pairs in table order, e.g. `Home Depot Price`.
    pub fn record(&self) -> Vec<(String, String)> {
        let mut record = vec![
            (
                "Date Added".to_string(),
                self.date_added.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            ("Product Number".to_string(), self.entry.product_number.clone()),
            ("Brand".to_string(), self.entry.brand.clone()),
            ("Model Name".to_string(), self.entry.model_name.clone()),
            ("Category".to_string(), self.entry.category.clone()),
            ("Quantity".to_string(), self.entry.quantity.to_string()),
            ("MSRP".to_string(), self.entry.msrp.clone().unwrap_or_default()),
            ("Notes".to_string(), self.entry.notes.clone()),
        ];

        for columns in &self.retailers {
            record.push((format!("{} Price", columns.retailer), columns.price.clone()));
            record.push((format!("{} Link", columns.retailer), columns.link.clone()));
            record.push((format!("{} In Stock", columns.retailer), columns.in_stock.clone()));
        }

        record
    }
}

/// Session inventory table.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    retailer_order: Vec<String>,
    display_names: BTreeMap<String, String>,
    rows: Vec<InventoryRow>,
}

impl InventoryStore {
    pub fn new(retailer_order: Vec<String>, display_names: BTreeMap<String, String>) -> Self {
        Self {
            retailer_order,
            display_names,
            rows: Vec::new(),
        }
    }

    /// Enrich `entry` from `result` and append it as a new row.
    pub fn append(&mut self, mut entry: ProductEntry, result: &SearchResult) -> &InventoryRow {
        entry.enrich(result);

        let mut names = self.retailer_order.clone();
        names.extend(
            result
                .retailers
                .keys()
                .filter(|name| !self.retailer_order.contains(name))
                .cloned(),
        );

        let retailers = names
            .iter()
            .map(|name| {
                let info = result.retailers.get(name).cloned().unwrap_or_else(RetailerPriceInfo::empty);
                RetailerColumns {
                    retailer: self.display_name(name),
                    price: info.raw_price,
                    link: info.url,
                    in_stock: info.in_stock.as_label().to_string(),
                }
            })
            .collect();

        self.rows.push(InventoryRow {
            date_added: Utc::now(),
            entry,
            retailers,
        });
        &self.rows[self.rows.len() - 1]
    }

    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn display_name(&self, name: &str) -> String {
        self.display_names
            .get(name)
            .cloned()
            .unwrap_or_else(|| title_case(name))
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

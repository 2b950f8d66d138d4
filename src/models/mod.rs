//! Data models for retailer lookups and the aggregated search result

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Placeholder shown when a retailer reported no price.
pub const NO_PRICE: &str = "N/A";

/// Upper bound on identifier length accepted before dispatch.
pub const MAX_IDENTIFIER_LEN: usize = 40;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("valid identifier regex")
});

/// A barcode or manufacturer product number, validated once and then used
/// verbatim as the search key for every retailer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductIdentifier(String);

impl ProductIdentifier {
    /// Trims surrounding whitespace and checks the identifier shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the trimmed value is empty, too long,
    /// or contains anything besides ASCII letters, digits and inner hyphens.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let len = trimmed.chars().count();
        if len > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::TooLong {
                len,
                max: MAX_IDENTIFIER_LEN,
            });
        }

        if !IDENTIFIER_PATTERN.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductIdentifier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductIdentifier> for String {
    fn from(value: ProductIdentifier) -> Self {
        value.0
    }
}

/// Tri-state availability. `Unknown` is the default whenever a page says
/// nothing conclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

impl StockStatus {
    /// Column value used by the inventory table.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::InStock => "Yes",
            Self::OutOfStock => "No",
            Self::Unknown => "Unknown",
        }
    }
}

/// Price and link for one retailer as exposed to callers.
///
/// Construct it with [`RetailerPriceInfo::empty`] or
/// [`RetailerPriceInfo::from_product`]; both keep the rule that an entry
/// without a link carries no price and no availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerPriceInfo {
    pub raw_price: String,
    pub url: String,
    pub in_stock: StockStatus,
}

impl RetailerPriceInfo {
    /// Canonical entry for a retailer that produced nothing.
    pub fn empty() -> Self {
        Self {
            raw_price: NO_PRICE.to_string(),
            url: String::new(),
            in_stock: StockStatus::Unknown,
        }
    }

    pub fn from_product(product: &RetailerProduct) -> Self {
        if product.url.trim().is_empty() {
            return Self::empty();
        }

        Self {
            raw_price: product
                .raw_price
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| NO_PRICE.to_string()),
            url: product.url.clone(),
            in_stock: product.in_stock,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

impl Default for RetailerPriceInfo {
    fn default() -> Self {
        Self::empty()
    }
}

/// Everything one retailer extractor managed to pull from its pages.
/// Every field besides `url` is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerProduct {
    pub url: String,
    pub raw_price: Option<String>,
    pub in_stock: StockStatus,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub specifications: BTreeMap<String, String>,
}

impl RetailerProduct {
    /// True when the page gave us neither a title nor a price, which means the
    /// selectors did not line up with the markup at all.
    pub fn is_blank(&self) -> bool {
        self.name.is_none() && self.raw_price.is_none()
    }

    /// Fills fields that are still absent from `other`, keeping our own values.
    pub fn fill_missing_from(&mut self, other: Self) {
        if self.raw_price.is_none() {
            self.raw_price = other.raw_price;
        }
        if self.in_stock == StockStatus::Unknown {
            self.in_stock = other.in_stock;
        }
        self.name = self.name.take().or(other.name);
        self.brand = self.brand.take().or(other.brand);
        self.model = self.model.take().or(other.model);
        self.description = self.description.take().or(other.description);
        self.category = self.category.take().or(other.category);
        for (key, value) in other.specifications {
            self.specifications.entry(key).or_insert(value);
        }
    }
}

/// Aggregated lookup across every configured retailer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub identifier: Option<ProductIdentifier>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub model_number: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub specifications: BTreeMap<String, String>,
    pub retailers: BTreeMap<String, RetailerPriceInfo>,
    pub error: Option<String>,
}

impl SearchResult {
    /// Number of retailers that returned a product link.
    pub fn successful_retailers(&self) -> usize {
        self.retailers.values().filter(|info| !info.is_empty()).count()
    }
}

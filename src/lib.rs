//! Concurrent multi-retailer price lookup for product numbers and barcodes.

pub mod aggregator;
pub mod capture;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod models;
pub mod price_finder;
pub mod retailers;
pub mod traits;

pub use aggregator::{ResultAggregator, RetailerOutcome};
pub use config::{AppConfig, load_app_config};
pub use dispatcher::SearchDispatcher;
pub use error::{ConfigError, FailureReason, RetailerError, ValidationError};
pub use models::{ProductIdentifier, RetailerPriceInfo, RetailerProduct, SearchResult, StockStatus};
pub use price_finder::PriceFinder;
pub use traits::{RetailerConfig, RetailerExtractor, RetailerSelectors};

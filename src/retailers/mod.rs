//! Retailer definitions and the extractor that drives them

mod build_com;
mod ferguson;
mod home_depot;
mod html;
mod lowes;

use reqwest::Client;

use crate::error::RetailerError;
use crate::traits::{RetailerConfig, RetailerExtractor};

pub use html::HtmlRetailer;

/// Default retailer priority: earlier retailers win when product details
/// disagree.
pub const DEFAULT_PRIORITY: [&str; 4] = [
    home_depot::NAME,
    lowes::NAME,
    ferguson::NAME,
    build_com::NAME,
];

/// Look up a built-in retailer definition by name.
///
/// # Errors
///
/// Returns [`RetailerError::UnknownRetailer`] for names not in
/// [`DEFAULT_PRIORITY`].
pub fn definition(name: &str, base_url: Option<&str>) -> Result<RetailerConfig, RetailerError> {
    let config = match name {
        home_depot::NAME => home_depot::definition(base_url.unwrap_or(home_depot::BASE_URL)),
        lowes::NAME => lowes::definition(base_url.unwrap_or(lowes::BASE_URL)),
        ferguson::NAME => ferguson::definition(base_url.unwrap_or(ferguson::BASE_URL)),
        build_com::NAME => build_com::definition(base_url.unwrap_or(build_com::BASE_URL)),
        other => return Err(RetailerError::UnknownRetailer(other.to_string())),
    };
    Ok(config)
}

pub fn is_known(name: &str) -> bool {
    DEFAULT_PRIORITY.contains(&name)
}

/// Build one extractor per config, all sharing `client`, in the given order.
///
/// # Errors
///
/// Returns the first [`RetailerError`] raised while compiling selectors.
pub fn build_extractors(
    client: &Client,
    configs: Vec<RetailerConfig>,
) -> Result<Vec<Box<dyn RetailerExtractor>>, RetailerError> {
    configs
        .into_iter()
        .map(|config| {
            HtmlRetailer::new(client.clone(), config)
                .map(|retailer| Box::new(retailer) as Box<dyn RetailerExtractor>)
        })
        .collect()
}

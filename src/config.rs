//! Environment-driven configuration

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ConfigError, RetailerError};
use crate::retailers::{self, DEFAULT_PRIORITY};
use crate::traits::{DEFAULT_USER_AGENT, RetailerConfig};

const USER_AGENT_VAR: &str = "PRICE_FINDER_USER_AGENT";
const RETAILERS_VAR: &str = "PRICE_FINDER_RETAILERS";
const TIMEOUT_VAR: &str = "PRICE_FINDER_TIMEOUT_SECS";
const DEADLINE_VAR: &str = "PRICE_FINDER_DEADLINE_SECS";

/// Runtime settings for a price finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub user_agent: String,
    /// Enabled retailers, highest priority first.
    pub retailers: Vec<String>,
    /// Replaces every retailer's own timeout when set.
    pub timeout_override: Option<Duration>,
    /// Outer deadline for a whole search.
    pub search_deadline: Option<Duration>,
    /// Per-retailer base URL overrides.
    pub base_urls: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retailers: DEFAULT_PRIORITY.iter().map(|s| (*s).to_string()).collect(),
            timeout_override: None,
            search_deadline: None,
            base_urls: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Retailer definitions in priority order with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`RetailerError::UnknownRetailer`] for a name with no
    /// built-in definition.
    pub fn retailer_configs(&self) -> Result<Vec<RetailerConfig>, RetailerError> {
        self.retailers
            .iter()
            .map(|name| {
                let mut config =
                    retailers::definition(name, self.base_urls.get(name).map(String::as_str))?;
                if let Some(timeout) = self.timeout_override {
                    config.timeout = timeout;
                }
                Ok(config)
            })
            .collect()
    }
}

/// Load configuration from the environment, reading `.env` first.
///
/// # Errors
///
/// Returns [`ConfigError`] if a variable is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from variables already in the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if a variable is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key).ok())
}

fn base_url_var(retailer: &str) -> String {
    format!("PRICE_FINDER_{}_BASE_URL", retailer.to_uppercase())
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = AppConfig::default();

    let parse_secs = |var: &str| -> Result<Option<Duration>, ConfigError> {
        let Some(raw) = lookup(var) else {
            return Ok(None);
        };
        let secs = raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Some(Duration::from_secs(secs)))
    };

    let user_agent = lookup(USER_AGENT_VAR)
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty())
        .unwrap_or(defaults.user_agent);

    let retailers = match lookup(RETAILERS_VAR) {
        Some(raw) => parse_retailer_list(&raw)?,
        None => defaults.retailers,
    };

    let base_urls = retailers
        .iter()
        .filter_map(|name| {
            lookup(&base_url_var(name))
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .map(|url| (name.clone(), url))
        })
        .collect();

    Ok(AppConfig {
        user_agent,
        retailers,
        timeout_override: parse_secs(TIMEOUT_VAR)?,
        search_deadline: parse_secs(DEADLINE_VAR)?,
        base_urls,
    })
}

/// Comma-separated retailer names; order is kept and duplicates dropped.
fn parse_retailer_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut names: Vec<String> = Vec::new();

    for name in raw.split(',').map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        if !retailers::is_known(&name) {
            return Err(ConfigError::InvalidEnvVar {
                var: RETAILERS_VAR.to_string(),
                reason: format!("unknown retailer \"{name}\""),
            });
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(ConfigError::NoRetailers);
    }
    Ok(names)
}

//! Runtime configuration
//!
//! Defaults suit local development against the aggregate service on port
//! 5000. Deployments override through environment variables.

use std::time::Duration;

use crate::error::{DashboardError, Result};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Base URL of the aggregate service, without trailing slash
    pub api_base: String,
    /// Quiet period before date edits trigger a refetch
    pub debounce: Duration,
    pub request_timeout: Duration,
    /// Maximum zone search matches
    pub search_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl DashboardConfig {
    /// Read `MOBILITY_API_BASE`, `DASHBOARD_DEBOUNCE_MS`,
    /// `DASHBOARD_REQUEST_TIMEOUT_MS` and `DASHBOARD_SEARCH_LIMIT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base) = lookup("MOBILITY_API_BASE") {
            let base = base.trim().trim_end_matches('/');
            if base.is_empty() {
                return Err(DashboardError::Config("MOBILITY_API_BASE is empty".into()));
            }
            config.api_base = base.to_string();
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "DASHBOARD_DEBOUNCE_MS")? {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "DASHBOARD_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_var::<usize>(&lookup, "DASHBOARD_SEARCH_LIMIT")? {
            if limit == 0 {
                return Err(DashboardError::Config("DASHBOARD_SEARCH_LIMIT must be positive".into()));
            }
            config.search_limit = limit;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DashboardError::Config(format!("{} must be a number, got {:?}", key, raw))),
    }
}

//! Categorizer configuration.

use std::time::Duration;

use pantry_core::defaults::{CLASSIFIER_BUDGET_SECS, FALLBACK_CATEGORY_NAMES, STORE_TIMEOUT_MS};
use pantry_core::{Error, Result};

/// Bounds and policy for one [`Categorizer`](crate::Categorizer).
///
/// Constructed once per process and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizerConfig {
    /// Upper bound on the whole classifier tier, warm-up retries included.
    pub classifier_budget: Duration,
    /// Upper bound on each cache or catalog call.
    pub store_timeout: Duration,
    /// Catch-all category names, tried in order.
    pub fallback_names: Vec<String>,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            classifier_budget: Duration::from_secs(CLASSIFIER_BUDGET_SECS),
            store_timeout: Duration::from_millis(STORE_TIMEOUT_MS),
            fallback_names: FALLBACK_CATEGORY_NAMES
                .iter()
                .map(|n| n.to_string())
                .collect(),
        }
    }
}

impl CategorizerConfig {
    pub fn with_classifier_budget(mut self, budget: Duration) -> Self {
        self.classifier_budget = budget;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_fallback_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Load from environment variables.
    ///
    /// - `PANTRY_CLASSIFIER_BUDGET_SECS` (default 20)
    /// - `PANTRY_STORE_TIMEOUT_MS` (default 3000)
    /// - `PANTRY_FALLBACK_CATEGORIES` (comma separated, default `Other,Sonstiges`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = lookup("PANTRY_CLASSIFIER_BUDGET_SECS") {
            config.classifier_budget = Duration::from_secs(parse_positive(
                "PANTRY_CLASSIFIER_BUDGET_SECS",
                &secs,
            )?);
        }
        if let Some(ms) = lookup("PANTRY_STORE_TIMEOUT_MS") {
            config.store_timeout =
                Duration::from_millis(parse_positive("PANTRY_STORE_TIMEOUT_MS", &ms)?);
        }
        if let Some(names) = lookup("PANTRY_FALLBACK_CATEGORIES") {
            config.fallback_names = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

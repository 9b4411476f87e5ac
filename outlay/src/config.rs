//! Engine configuration.
//!
//! Loaded from TOML with every key optional; missing keys fall back to the
//! defaults in [`constants`](crate::constants). A couple of limits can be
//! overridden from the environment.
//!
//! ```toml
//! default_page_size = 20
//! max_page_size = 500
//! max_category_page_size = 100
//! amount_tolerance_percent = 20
//! query_timeout_ms = 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AMOUNT_TOLERANCE_PERCENT, DEFAULT_PAGE_SIZE, ENV_MAX_PAGE_SIZE, ENV_QUERY_TIMEOUT_MS,
    MAX_CATEGORY_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::error::{Error, Result};

/// Limits and defaults applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Page size used when a search does not ask for one.
    pub default_page_size: u32,
    /// Largest `first` a search may ask for.
    pub max_page_size: u32,
    /// Largest page size for the category listing.
    pub max_category_page_size: u32,
    /// Fuzzy amount tolerance, in percent either side of the target.
    pub amount_tolerance_percent: u32,
    /// Deadline for storage calls when the caller gives none.
    pub query_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            max_category_page_size: MAX_CATEGORY_PAGE_SIZE,
            amount_tolerance_percent: AMOUNT_TOLERANCE_PERCENT,
            query_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Apply `OUTLAY_MAX_PAGE_SIZE` and `OUTLAY_QUERY_TIMEOUT_MS` from the
    /// process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unset keys leave the value alone; set but unparseable keys are an error.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_PAGE_SIZE) {
            self.max_page_size = parse_env(ENV_MAX_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_QUERY_TIMEOUT_MS) {
            self.query_timeout_ms = Some(parse_env(ENV_QUERY_TIMEOUT_MS, &raw)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the limits are consistent with each other.
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(Error::Config("max_page_size must be at least 1".into()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(Error::Config(format!(
                "default_page_size must be between 1 and {}",
                self.max_page_size
            )));
        }
        if self.max_category_page_size == 0 {
            return Err(Error::Config(
                "max_category_page_size must be at least 1".into(),
            ));
        }
        if self.amount_tolerance_percent > 100 {
            return Err(Error::Config(
                "amount_tolerance_percent must not exceed 100".into(),
            ));
        }
        Ok(())
    }

    /// Storage deadline as a duration, if configured.
    #[must_use]
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

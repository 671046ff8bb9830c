//! Profiler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, Result};
use crate::security::InputValidator;

/// Default upper bound, in characters, for a single textual sample cell.
pub const SAMPLE_DATA_MAX_CELL_LENGTH: usize = 100 * 1024;

/// Default number of rows read by the sampler.
pub const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// Default cap on the number of histogram bins.
pub const DEFAULT_MAX_BINS: usize = 100;

/// Configuration shared by the metric engine and the sampler.
///
/// # Example
///
/// ```rust
/// use profiler_engine::config::ProfilerConfig;
///
/// let config = ProfilerConfig::default()
///     .with_sample_limit(200)
///     .with_max_cell_length(50_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Maximum characters kept per textual sample cell
    pub max_cell_length: usize,
    /// Maximum number of rows returned by the sampler
    pub sample_limit: usize,
    /// Cap on the number of bins a histogram may have
    pub max_bins: usize,
    /// Query the sampler reads from instead of the whole table
    pub sample_query: Option<String>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            max_cell_length: SAMPLE_DATA_MAX_CELL_LENGTH,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            max_bins: DEFAULT_MAX_BINS,
            sample_query: None,
        }
    }
}

impl ProfilerConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_cell_length(mut self, max_cell_length: usize) -> Self {
        self.max_cell_length = max_cell_length;
        self
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    pub fn with_max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }

    pub fn with_sample_query(mut self, sample_query: impl Into<String>) -> Self {
        self.sample_query = Some(sample_query.into());
        self
    }

    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_positive(self.max_cell_length, "max_cell_length")?;
        InputValidator::validate_positive(self.sample_limit, "sample_limit")?;
        InputValidator::validate_positive(self.max_bins, "max_bins")?;
        if self.max_bins > 10_000 {
            return Err(ProfilerError::invalid_config(format!(
                "max_bins must be at most 10000, got {}",
                self.max_bins
            )));
        }
        if let Some(query) = &self.sample_query {
            InputValidator::validate_sample_query(query)?;
        }
        Ok(())
    }
}

//! Error types for the profiler engine.
//!
//! A missing histogram or an unsupported column is not an error: those cases
//! are reported as `Ok(None)`. The variants below cover genuine failures,
//! most of which come straight from the query engine and are propagated
//! unchanged.

use thiserror::Error;

use crate::metrics::MetricName;

/// Result type for profiler operations.
pub type Result<T> = std::result::Result<T, ProfilerError>;

/// Errors that can occur while computing column metrics or extracting samples.
#[derive(Error, Debug)]
pub enum ProfilerError {
    /// DataFusion query execution error.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] datafusion::error::DataFusionError),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// Error reported by a non-DataFusion session implementation.
    #[error("Session error: {0}")]
    Session(String),

    /// A query returned values of an unexpected shape or type.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An identifier failed validation before being spliced into SQL.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// A metric result was written twice for the same column.
    #[error("Metric '{0}' has already been computed for this column")]
    MetricAlreadyComputed(MetricName),

    /// A metric needed a prior result that was never computed.
    #[error("Metric '{metric}' requires '{dependency}' to be computed first")]
    MissingDependency {
        metric: MetricName,
        dependency: MetricName,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ProfilerError {
    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a session error with the given message.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Creates a missing dependency error.
    pub fn missing_dependency(metric: MetricName, dependency: MetricName) -> Self {
        Self::MissingDependency { metric, dependency }
    }
}

impl From<serde_json::Error> for ProfilerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

//! Prelude for commonly used types and traits in profiler-engine.

pub use crate::config::ProfilerConfig;
pub use crate::error::{ProfilerError, Result};
pub use crate::interface::{ColumnProfile, Dialect, HybridOverrides, ProfilerInterface};
pub use crate::logging::LogConfig;
pub use crate::metrics::{
    ColumnDescriptor, ColumnResults, ColumnType, HistogramResult, HybridMetric,
    HybridMetricType, Metric, MetricName, MetricValue, Sample,
};
pub use crate::sampler::{truncate_cell, BatchRowSource, RowSource, SampleData, Sampler};
pub use crate::session::{CellValue, QuerySession};

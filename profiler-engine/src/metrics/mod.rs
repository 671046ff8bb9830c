//! Metric taxonomy for column profiling.
//!
//! Metrics come in three flavours:
//!
//! - **Static** metrics are a single aggregate expression with no
//!   dependencies (`COUNT`, `MIN`, `MAX`). Several of them are batched into
//!   one query by the profiler.
//! - **Composed** metrics are pure functions of values already stored in
//!   [`ColumnResults`] and issue no query (the interquartile range).
//! - **Hybrid** metrics need both prior results and a query of their own
//!   (quartiles, the histogram).
//!
//! Hybrid metrics are looked up through a [`HybridMetricType`], the factory a
//! backend adapter can swap for a dialect-specific implementation before the
//! metric is bound to a column.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::session::{CellValue, QuerySession};

pub mod basic;
pub mod column;
pub mod histogram;
pub mod quartile;
pub mod types;

pub use basic::{Count, Max, Min};
pub use column::{ColumnDescriptor, ColumnType, Sample};
pub use histogram::{
    BinBounds, BinPlan, BinSizing, FreedmanDiaconis, Histogram, HistogramInputs, HistogramMetric,
    HistogramType, PinotHistogram, PinotHistogramType,
};
pub use quartile::{FirstQuartile, InterQuartileRange, Quartile, ThirdQuartile};
pub use types::{ColumnResults, HistogramResult, MetricName, MetricValue};

/// How a metric obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Static,
    Composed,
    Hybrid,
}

/// Common identity of every metric.
pub trait Metric: Send + Sync + Debug {
    /// Stable identifier, also the key under which the value is stored.
    fn name(&self) -> MetricName;

    fn kind(&self) -> MetricKind;
}

/// A metric computed by one aggregate expression over the sample.
pub trait StaticMetric: Metric {
    /// The aggregate expression for this metric's column, or `None` when the
    /// column type is not supported.
    fn aggregate_expression(&self) -> Result<Option<String>>;

    /// Converts the aggregated cell into a metric value.
    ///
    /// `NULL` (e.g. `MIN` over zero rows) yields `None`.
    fn parse_value(&self, cell: &CellValue) -> Option<MetricValue> {
        cell_to_metric_value(cell)
    }
}

/// A metric derived purely from previously computed values.
pub trait ComposedMetric: Metric {
    fn compute(&self, results: &ColumnResults) -> Result<Option<MetricValue>>;
}

/// A metric that reads prior results and issues its own query.
#[async_trait]
pub trait HybridMetric: Metric {
    /// Computes the metric, returning `None` when the column or its prior
    /// results do not support it. Query failures propagate unchanged.
    async fn compute(
        &self,
        sample: &Sample,
        results: &ColumnResults,
        session: &dyn QuerySession,
    ) -> Result<Option<MetricValue>>;
}

/// Factory for a hybrid metric, resolved before being bound to a column.
pub trait HybridMetricType: Send + Sync + Debug {
    fn name(&self) -> MetricName;

    /// Binds the metric to a column.
    fn instantiate(&self, column: &ColumnDescriptor) -> Box<dyn HybridMetric>;
}

/// Default conversion of an aggregated cell into a metric value.
pub fn cell_to_metric_value(cell: &CellValue) -> Option<MetricValue> {
    match cell {
        CellValue::Null => None,
        CellValue::Integer(v) => Some(MetricValue::Long(*v)),
        CellValue::Float(v) => Some(MetricValue::Double(*v)),
        CellValue::Text(s) => Some(MetricValue::Text(s.clone())),
        CellValue::Boolean(b) => Some(MetricValue::Text(b.to_string())),
        CellValue::Bytes(_) => None,
    }
}

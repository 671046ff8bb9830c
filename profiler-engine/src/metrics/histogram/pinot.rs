//! Histogram dialect for Apache Pinot.
//!
//! Pinot restricts `CASE WHEN` inside aggregate functions. Bins are counted
//! with `SUM(CASE WHEN <cond> THEN 1 ELSE 0 END)` and every comparison is
//! made on integers: the column and the bounds are multiplied by
//! [`SCALE_FACTOR`], and the bounds rounded. Bin planning and labels are
//! the same as for the generic histogram.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::{run_histogram, BinBounds, BinSizing, FreedmanDiaconis, HistogramMetric};
use crate::error::Result;
use crate::metrics::{
    ColumnDescriptor, ColumnResults, HybridMetric, HybridMetricType, Metric, MetricKind,
    MetricName, MetricValue, Sample,
};
use crate::security::InputValidator;
use crate::session::QuerySession;

/// Multiplier applied to values and bounds before comparison.
pub const SCALE_FACTOR: i64 = 1000;

/// Histogram counting bins with scaled integer comparisons.
///
/// A bin `[start, end)` becomes
/// `SUM(CASE WHEN v * k >= round(start * k) AND v * k < round(end * k) THEN 1 ELSE 0 END)`
/// with `k` the scale factor. Bounds closer together than `1 / k` collapse
/// onto the same integer.
#[derive(Debug, Clone)]
pub struct PinotHistogram {
    column: ColumnDescriptor,
    sizing: Arc<dyn BinSizing>,
    /// Multiplier `k` applied before comparing
    scale_factor: i64,
}

impl PinotHistogram {
    pub fn new(column: ColumnDescriptor, sizing: Arc<dyn BinSizing>) -> Self {
        Self {
            column,
            sizing,
            scale_factor: SCALE_FACTOR,
        }
    }

    /// Overrides the multiplier applied to values and bounds.
    ///
    /// # Arguments
    ///
    /// * `scale_factor` - Multiplier for the comparison; values below 1 are
    ///   raised to 1
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use profiler_engine::metrics::{
    ///     BinBounds, ColumnDescriptor, ColumnType, FreedmanDiaconis, HistogramMetric,
    ///     PinotHistogram,
    /// };
    ///
    /// let metric = PinotHistogram::new(
    ///     ColumnDescriptor::new("price", ColumnType::Float),
    ///     Arc::new(FreedmanDiaconis::default()),
    /// )
    /// .with_scale_factor(100);
    ///
    /// let bin = BinBounds { index: 0, start: 0.5, end: None };
    /// assert_eq!(
    ///     metric.bin_aggregate("price", &bin).unwrap(),
    ///     "SUM(CASE WHEN price * 100 >= 50 THEN 1 ELSE 0 END)"
    /// );
    /// ```
    pub fn with_scale_factor(mut self, scale_factor: i64) -> Self {
        self.scale_factor = scale_factor.max(1);
        self
    }

    pub fn scale_factor(&self) -> i64 {
        self.scale_factor
    }

    fn scaled_bound(&self, bound: f64, name: &str) -> Result<i64> {
        InputValidator::validate_finite(bound, name)?;
        Ok((bound * self.scale_factor as f64).round() as i64)
    }
}

impl HistogramMetric for PinotHistogram {
    fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    fn bin_sizing(&self) -> &dyn BinSizing {
        self.sizing.as_ref()
    }

    fn bin_aggregate(&self, value_expr: &str, bin: &BinBounds) -> Result<String> {
        let scaled = format!("{value_expr} * {}", self.scale_factor);
        let start = self.scaled_bound(bin.start, "bin start")?;
        let condition = match bin.end {
            Some(end) => {
                let end = self.scaled_bound(end, "bin end")?;
                format!("{scaled} >= {start} AND {scaled} < {end}")
            }
            None => format!("{scaled} >= {start}"),
        };
        Ok(format!("SUM(CASE WHEN {condition} THEN 1 ELSE 0 END)"))
    }
}

impl Metric for PinotHistogram {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Hybrid
    }
}

#[async_trait]
impl HybridMetric for PinotHistogram {
    #[instrument(skip_all, fields(metric = "histogram", dialect = "pinot", column = %self.column.name))]
    async fn compute(
        &self,
        sample: &Sample,
        results: &ColumnResults,
        session: &dyn QuerySession,
    ) -> Result<Option<MetricValue>> {
        Ok(run_histogram(self, sample, results, session)
            .await?
            .map(MetricValue::Histogram))
    }
}

/// Metric type producing [`PinotHistogram`]s.
///
/// Registered as the histogram override of [`Dialect::Pinot`](crate::interface::Dialect).
#[derive(Debug, Clone)]
pub struct PinotHistogramType {
    sizing: Arc<dyn BinSizing>,
    scale_factor: i64,
}

impl PinotHistogramType {
    pub fn new(sizing: Arc<dyn BinSizing>) -> Self {
        Self {
            sizing,
            scale_factor: SCALE_FACTOR,
        }
    }

    /// Scale factor handed to every histogram this type instantiates.
    pub fn with_scale_factor(mut self, scale_factor: i64) -> Self {
        self.scale_factor = scale_factor.max(1);
        self
    }
}

impl Default for PinotHistogramType {
    fn default() -> Self {
        Self::new(Arc::new(FreedmanDiaconis::default()))
    }
}

impl HybridMetricType for PinotHistogramType {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn instantiate(&self, column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(
            PinotHistogram::new(column.clone(), self.sizing.clone())
                .with_scale_factor(self.scale_factor),
        )
    }
}

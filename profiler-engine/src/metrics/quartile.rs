//! Quartiles and the interquartile range.
//!
//! Quartiles are exact: the non-null values are ordered and the two values
//! straddling position `q * (n - 1)` are interpolated linearly, so at most two
//! rows are fetched per quartile.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{
    ColumnDescriptor, ColumnResults, ComposedMetric, HybridMetric, HybridMetricType, Metric,
    MetricKind, MetricName, MetricValue, Sample,
};
use crate::error::{ProfilerError, Result};
use crate::session::QuerySession;

/// First quartile metric type (25th percentile).
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstQuartile;

/// Third quartile metric type (75th percentile).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThirdQuartile;

impl HybridMetricType for FirstQuartile {
    fn name(&self) -> MetricName {
        MetricName::FirstQuartile
    }

    fn instantiate(&self, column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(Quartile::new(column.clone(), MetricName::FirstQuartile, 0.25))
    }
}

impl HybridMetricType for ThirdQuartile {
    fn name(&self) -> MetricName {
        MetricName::ThirdQuartile
    }

    fn instantiate(&self, column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(Quartile::new(column.clone(), MetricName::ThirdQuartile, 0.75))
    }
}

/// A quantile bound to a column.
#[derive(Debug, Clone)]
pub struct Quartile {
    column: ColumnDescriptor,
    name: MetricName,
    fraction: f64,
}

impl Quartile {
    pub fn new(column: ColumnDescriptor, name: MetricName, fraction: f64) -> Self {
        Self {
            column,
            name,
            fraction,
        }
    }

    /// Zero-based offset of the lower neighbour and the interpolation weight.
    fn position(&self, count: u64) -> (u64, f64) {
        let pos = self.fraction * (count - 1) as f64;
        let lower = pos.floor();
        (lower as u64, pos - lower)
    }
}

impl Metric for Quartile {
    fn name(&self) -> MetricName {
        self.name
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Hybrid
    }
}

#[async_trait]
impl HybridMetric for Quartile {
    #[instrument(skip(self, sample, results, session), fields(metric = %self.name, column = %self.column.name))]
    async fn compute(
        &self,
        sample: &Sample,
        results: &ColumnResults,
        session: &dyn QuerySession,
    ) -> Result<Option<MetricValue>> {
        if !self.column.supports_histogram() {
            return Ok(None);
        }

        let count = match results.require_numeric(self.name, MetricName::Count)? {
            Some(count) if count >= 1.0 => count as u64,
            _ => return Ok(None),
        };

        let (offset, weight) = self.position(count);
        let expr = self.column.profiled_expression()?;
        let sql = format!(
            "SELECT {expr} AS \"value\" FROM {} WHERE {expr} IS NOT NULL ORDER BY {expr} ASC LIMIT 2 OFFSET {offset}",
            sample.from_clause()
        );
        debug!(sql = %sql, "Computing quartile");

        let rows = session.fetch_rows(&sql, 2).await?;
        let mut values = rows.rows.iter().filter_map(|row| row.first());
        let lower = match values.next() {
            Some(cell) => cell.as_f64().ok_or_else(|| {
                ProfilerError::invalid_data(format!("Expected numeric value for {}", self.name))
            })?,
            None => return Ok(None),
        };
        let upper = values.next().and_then(|cell| cell.as_f64()).unwrap_or(lower);

        Ok(Some(MetricValue::Double(lower + weight * (upper - lower))))
    }
}

/// Third quartile minus first quartile.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterQuartileRange;

impl Metric for InterQuartileRange {
    fn name(&self) -> MetricName {
        MetricName::InterQuartileRange
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Composed
    }
}

impl ComposedMetric for InterQuartileRange {
    fn compute(&self, results: &ColumnResults) -> Result<Option<MetricValue>> {
        let first = results.numeric(MetricName::FirstQuartile);
        let third = results.numeric(MetricName::ThirdQuartile);
        Ok(match (first, third) {
            (Some(q1), Some(q3)) => Some(MetricValue::Double(q3 - q1)),
            _ => None,
        })
    }
}

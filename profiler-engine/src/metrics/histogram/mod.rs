//! Histogram metric: bin sizing, aggregate query synthesis and result parsing.
//!
//! Every histogram, whatever the backend, follows the same steps:
//!
//! 1. read count, min, max and the IQR from the column's results;
//! 2. plan the bins with a [`BinSizing`] strategy;
//! 3. emit one query with one conditional aggregate per bin, aliased by the
//!    bin's position;
//! 4. read the single result row back in plan order, pairing each count with
//!    its bin label.
//!
//! Labels are rounded to three decimals and need not be unique, so they
//! never appear in the query text.
//!
//! Only the per-bin aggregate of step 3 differs between dialects. It is the
//! [`HistogramMetric::bin_aggregate`] hook; everything else lives in
//! [`run_histogram`] and cannot be specialised.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    ColumnDescriptor, ColumnResults, HybridMetric, HybridMetricType, Metric, MetricKind,
    MetricName, MetricValue, Sample,
};
use crate::error::{ProfilerError, Result};
use crate::security::InputValidator;
use crate::session::{CellValue, QueryRow, QuerySession};

mod bins;
mod pinot;

pub use bins::{BinBounds, BinPlan, BinSizing, FreedmanDiaconis, HistogramInputs};
pub use pinot::{PinotHistogram, PinotHistogramType, SCALE_FACTOR};

use super::types::HistogramResult;

/// A histogram bound to a column, parameterised by its query dialect.
pub trait HistogramMetric: Send + Sync + std::fmt::Debug {
    fn column(&self) -> &ColumnDescriptor;

    /// The strategy used to plan bins.
    fn bin_sizing(&self) -> &dyn BinSizing;

    /// Renders the aggregate counting the rows of one bin.
    ///
    /// The default counts matching rows with
    /// `COUNT(CASE WHEN <cond> THEN 1 END)`.
    fn bin_aggregate(&self, value_expr: &str, bin: &BinBounds) -> Result<String> {
        InputValidator::validate_finite(bin.start, "bin start")?;
        let condition = match bin.end {
            Some(end) => {
                InputValidator::validate_finite(end, "bin end")?;
                format!("{value_expr} >= {} AND {value_expr} < {end}", bin.start)
            }
            None => format!("{value_expr} >= {}", bin.start),
        };
        Ok(format!("COUNT(CASE WHEN {condition} THEN 1 END)"))
    }
}

/// Plans the bins of a histogram from its column's results.
///
/// Shared by every dialect so bin math can never diverge.
pub fn plan_histogram<H: HistogramMetric + ?Sized>(
    metric: &H,
    inputs: &HistogramInputs,
) -> BinPlan {
    metric.bin_sizing().plan(inputs)
}

/// Synthesizes the single aggregate query for a bin plan.
pub fn build_histogram_query<H: HistogramMetric + ?Sized>(
    metric: &H,
    sample: &Sample,
    plan: &BinPlan,
) -> Result<String> {
    let value_expr = metric.column().profiled_expression()?;
    let selects = plan
        .bounds()
        .iter()
        .map(|bin| {
            let aggregate = metric.bin_aggregate(&value_expr, bin)?;
            Ok(format!("{aggregate} AS \"{}\"", bin.alias()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "SELECT {} FROM {}",
        selects.join(", "),
        sample.from_clause()
    ))
}

/// Computes a histogram end to end.
///
/// Returns `Ok(None)` for unsupported columns, missing or non-numeric
/// inputs, a plan without bins, or a query yielding no row.
pub async fn run_histogram<H: HistogramMetric + ?Sized>(
    metric: &H,
    sample: &Sample,
    results: &ColumnResults,
    session: &dyn QuerySession,
) -> Result<Option<HistogramResult>> {
    let column = metric.column();
    if !column.supports_histogram()
        || results.is_non_numeric(MetricName::Min)
        || results.is_non_numeric(MetricName::Max)
    {
        return Ok(None);
    }

    let Some(inputs) = HistogramInputs::from_results(results) else {
        warn!(
            column = %column.name,
            "Skipping histogram: count, min and max must be computed first"
        );
        return Ok(None);
    };

    let plan = plan_histogram(metric, &inputs);
    if plan.is_empty() {
        debug!(column = %column.name, "No histogram bins for column");
        return Ok(None);
    }

    let sql = build_histogram_query(metric, sample, &plan)?;
    debug!(
        column = %column.name,
        num_bins = plan.num_bins,
        bin_width = plan.bin_width,
        sql = %sql,
        "Computing histogram"
    );

    match session.fetch_first(&sql).await? {
        Some(row) => parse_histogram_row(&plan.bounds(), &row).map(Some),
        None => Ok(None),
    }
}

/// Pairs each planned bin with its count in a histogram result row.
///
/// Counts are looked up by the alias [`build_histogram_query`] gave the
/// bin, so the boundaries always follow plan order. `NULL` counts (`SUM`
/// over zero rows) are read as zero.
///
/// # Arguments
///
/// * `bounds` - The planned bins, as returned by [`BinPlan::bounds`]
/// * `row` - The single row returned by the histogram query
pub fn parse_histogram_row(bounds: &[BinBounds], row: &QueryRow) -> Result<HistogramResult> {
    let mut boundaries = Vec::with_capacity(bounds.len());
    let mut frequencies = Vec::with_capacity(bounds.len());

    for bin in bounds {
        let alias = bin.alias();
        let cell = row.get(&alias).ok_or_else(|| {
            ProfilerError::invalid_data(format!("Histogram result is missing column '{alias}'"))
        })?;
        let count = match cell {
            CellValue::Null => 0,
            CellValue::Integer(v) if *v >= 0 => *v as u64,
            CellValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 => *v as u64,
            other => {
                return Err(ProfilerError::invalid_data(format!(
                    "Expected a non-negative integer count for bin '{}', got {other:?}",
                    bin.label()
                )))
            }
        };
        boundaries.push(bin.label());
        frequencies.push(count);
    }

    HistogramResult::new(boundaries, frequencies)
}

/// The backend-independent histogram.
#[derive(Debug, Clone)]
pub struct Histogram {
    column: ColumnDescriptor,
    sizing: Arc<dyn BinSizing>,
}

impl Histogram {
    pub fn new(column: ColumnDescriptor, sizing: Arc<dyn BinSizing>) -> Self {
        Self { column, sizing }
    }
}

impl HistogramMetric for Histogram {
    fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    fn bin_sizing(&self) -> &dyn BinSizing {
        self.sizing.as_ref()
    }
}

impl Metric for Histogram {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Hybrid
    }
}

#[async_trait]
impl HybridMetric for Histogram {
    #[instrument(skip_all, fields(metric = "histogram", column = %self.column.name))]
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

/// Metric type producing [`Histogram`]s.
#[derive(Debug, Clone)]
pub struct HistogramType {
    sizing: Arc<dyn BinSizing>,
}

impl HistogramType {
    pub fn new(sizing: Arc<dyn BinSizing>) -> Self {
        Self { sizing }
    }
}

impl Default for HistogramType {
    fn default() -> Self {
        Self::new(Arc::new(FreedmanDiaconis::default()))
    }
}

impl HybridMetricType for HistogramType {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn instantiate(&self, column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(Histogram::new(column.clone(), self.sizing.clone()))
    }
}

//! Backend adapters: metric dispatch and column profiling against one sample.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use datafusion::prelude::SessionContext;
//! use profiler_engine::interface::{Dialect, ProfilerInterface};
//!
//! let ctx = SessionContext::new();
//! let interface = ProfilerInterface::builder(Arc::new(ctx), "orders")
//!     .dialect(Dialect::Pinot)
//!     .build()
//!     .unwrap();
//! assert_eq!(interface.overrides().len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::ProfilerConfig;
use crate::error::Result;
use crate::log_query;
use crate::logging::LogConfig;
use crate::metrics::{
    BinSizing, ColumnDescriptor, ColumnResults, ComposedMetric, Count, FirstQuartile,
    FreedmanDiaconis, HistogramType, HybridMetricType, InterQuartileRange, Max, Metric,
    MetricName, MetricValue, Min, PinotHistogramType, Sample, StaticMetric, ThirdQuartile,
};
use crate::sampler::{Sampler, SqlRowSource};
use crate::session::QuerySession;

mod overrides;
mod profile;

pub use overrides::{HybridOverrides, HybridOverridesBuilder};
pub use profile::ColumnProfile;

/// Query dialect of a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Generic,
    Pinot,
}

impl Dialect {
    /// The overrides this dialect needs.
    pub fn default_overrides(&self, sizing: Arc<dyn BinSizing>) -> HybridOverrides {
        match self {
            Dialect::Generic => HybridOverrides::empty(),
            Dialect::Pinot => HybridOverrides::builder()
                .with(Arc::new(PinotHistogramType::new(sizing)))
                .build(),
        }
    }
}

/// Builder for [`ProfilerInterface`].
pub struct ProfilerInterfaceBuilder {
    session: Arc<dyn QuerySession>,
    table: String,
    config: ProfilerConfig,
    dialect: Dialect,
    log_config: LogConfig,
    extra_overrides: Vec<Arc<dyn HybridMetricType>>,
}

impl ProfilerInterfaceBuilder {
    pub fn config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Registers an extra override, applied on top of the dialect's own.
    pub fn override_metric(mut self, metric_type: Arc<dyn HybridMetricType>) -> Self {
        self.extra_overrides.push(metric_type);
        self
    }

    /// Validates the table name and configuration and builds the adapter.
    pub fn build(self) -> Result<ProfilerInterface> {
        self.config.validate()?;
        let sample = Sample::table(self.table)?;
        let sizing: Arc<dyn BinSizing> = Arc::new(FreedmanDiaconis::new(self.config.max_bins));

        let overrides = self
            .extra_overrides
            .into_iter()
            .fold(
                HybridOverrides::builder().extend(&self.dialect.default_overrides(sizing.clone())),
                |builder, metric_type| builder.with(metric_type),
            )
            .build();

        debug!(
            table = %sample.table_name(),
            dialect = ?self.dialect,
            overrides = ?overrides.names(),
            "Built profiler interface"
        );

        Ok(ProfilerInterface {
            session: self.session,
            sample,
            config: self.config,
            dialect: self.dialect,
            log_config: self.log_config,
            sizing,
            overrides,
        })
    }
}

/// Computes metrics for the columns of one sample on one backend.
///
/// The override registry is fixed when the adapter is built.
pub struct ProfilerInterface {
    session: Arc<dyn QuerySession>,
    sample: Sample,
    config: ProfilerConfig,
    dialect: Dialect,
    log_config: LogConfig,
    sizing: Arc<dyn BinSizing>,
    overrides: HybridOverrides,
}

impl ProfilerInterface {
    pub fn builder(session: Arc<dyn QuerySession>, table: impl Into<String>) -> ProfilerInterfaceBuilder {
        ProfilerInterfaceBuilder {
            session,
            table: table.into(),
            config: ProfilerConfig::default(),
            dialect: Dialect::default(),
            log_config: LogConfig::default(),
            extra_overrides: Vec::new(),
        }
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn overrides(&self) -> &HybridOverrides {
        &self.overrides
    }

    /// Resolves `metric_type` against this adapter's overrides, binds it to
    /// `column` and computes it.
    ///
    /// Errors from the metric propagate unchanged.
    #[instrument(skip_all, fields(column = %column.name, metric = %metric_type.name()))]
    pub async fn get_hybrid_metric(
        &self,
        column: &ColumnDescriptor,
        metric_type: &dyn HybridMetricType,
        results: &ColumnResults,
    ) -> Result<Option<MetricValue>> {
        let effective = self.overrides.resolve(metric_type);
        debug!(implementation = ?effective, "Resolved hybrid metric");
        effective
            .instantiate(column)
            .compute(&self.sample, results, self.session.as_ref())
            .await
    }

    /// Computes count, min and max with a single aggregate query.
    #[instrument(skip_all, fields(column = %column.name))]
    pub async fn compute_static_metrics(&self, column: &ColumnDescriptor) -> Result<ColumnResults> {
        let metrics: Vec<Box<dyn StaticMetric>> = vec![
            Box::new(Count::new(column.clone())),
            Box::new(Min::new(column.clone())),
            Box::new(Max::new(column.clone())),
        ];

        let mut selected = Vec::with_capacity(metrics.len());
        let mut selects = Vec::with_capacity(metrics.len());
        for metric in &metrics {
            if let Some(expr) = metric.aggregate_expression()? {
                selects.push(format!("{expr} AS \"{}\"", metric.name()));
                selected.push(metric);
            }
        }

        let mut results = ColumnResults::new();
        if selects.is_empty() {
            return Ok(results);
        }

        let sql = format!(
            "SELECT {} FROM {}",
            selects.join(", "),
            self.sample.from_clause()
        );
        log_query!(self.log_config, &sql, "Computing static metrics");

        if let Some(row) = self.session.fetch_first(&sql).await? {
            for metric in selected {
                if let Some(value) = row
                    .get(metric.name().as_str())
                    .and_then(|cell| metric.parse_value(cell))
                {
                    results.insert(metric.name(), value)?;
                }
            }
        }

        Ok(results)
    }

    /// Computes a composed metric from `results`; no query is issued.
    pub fn compute_composed_metric(
        &self,
        metric: &dyn ComposedMetric,
        results: &ColumnResults,
    ) -> Result<Option<MetricValue>> {
        metric.compute(results)
    }

    /// Profiles a column: static metrics, quartiles, IQR, then the histogram.
    ///
    /// Metrics the column does not support are simply absent from the
    /// profile.
    #[instrument(skip_all, fields(column = %column.name, dialect = ?self.dialect))]
    pub async fn profile_column(&self, column: &ColumnDescriptor) -> Result<ColumnProfile> {
        let mut results = self.compute_static_metrics(column).await?;

        let quartiles: [&dyn HybridMetricType; 2] = [&FirstQuartile, &ThirdQuartile];
        for metric_type in quartiles {
            if let Some(value) = self.get_hybrid_metric(column, metric_type, &results).await? {
                results.insert(metric_type.name(), value)?;
            }
        }

        if let Some(iqr) = self.compute_composed_metric(&InterQuartileRange, &results)? {
            results.insert(InterQuartileRange.name(), iqr)?;
        }

        let histogram = HistogramType::new(self.sizing.clone());
        if let Some(value) = self.get_hybrid_metric(column, &histogram, &results).await? {
            results.insert(MetricName::Histogram, value)?;
        }

        info!(metrics = results.len(), "Profiled column");
        Ok(ColumnProfile::new(column.clone(), results))
    }

    /// Profiles several columns one after another.
    pub async fn profile_columns(&self, columns: &[ColumnDescriptor]) -> Result<Vec<ColumnProfile>> {
        let mut profiles = Vec::with_capacity(columns.len());
        for column in columns {
            profiles.push(self.profile_column(column).await?);
        }
        Ok(profiles)
    }

    /// A sampler reading from this adapter's sample through its session.
    ///
    /// A configured `sample_query` replaces the table as the row source.
    pub fn sampler(&self) -> Sampler<SqlRowSource> {
        let mut source = SqlRowSource::new(self.session.clone(), self.sample.clone());
        if let Some(query) = &self.config.sample_query {
            source = source.with_query(query.clone());
        }
        Sampler::new(source, &self.config)
    }
}

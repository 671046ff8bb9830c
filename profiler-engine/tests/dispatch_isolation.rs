//! Hybrid metric dispatch resolves overrides per adapter instance.

use async_trait::async_trait;
use profiler_engine::prelude::*;
use profiler_engine::session::{QueryRow, RowSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct SqlLog {
    queries: Mutex<Vec<String>>,
}

impl SqlLog {
    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuerySession for SqlLog {
    async fn fetch_first(&self, sql: &str) -> Result<Option<QueryRow>> {
        self.queries.lock().unwrap().push(sql.to_string());
        Ok(None)
    }

    async fn fetch_rows(&self, sql: &str, _limit: usize) -> Result<RowSet> {
        self.queries.lock().unwrap().push(sql.to_string());
        Ok(RowSet::default())
    }
}

/// Tags its result with a label and counts computations.
#[derive(Debug, Clone)]
struct Tagged {
    label: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Tagged {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HybridMetricType for Tagged {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn instantiate(&self, _column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(self.clone())
    }
}

impl Metric for Tagged {
    fn name(&self) -> MetricName {
        MetricName::Histogram
    }

    fn kind(&self) -> profiler_engine::metrics::MetricKind {
        profiler_engine::metrics::MetricKind::Hybrid
    }
}

#[async_trait]
impl HybridMetric for Tagged {
    async fn compute(
        &self,
        _sample: &Sample,
        _results: &ColumnResults,
        _session: &dyn QuerySession,
    ) -> Result<Option<MetricValue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(MetricValue::Text(self.label.to_string())))
    }
}

fn column() -> ColumnDescriptor {
    ColumnDescriptor::new("value", ColumnType::Integer)
}

#[tokio::test]
async fn test_override_wins_and_default_is_never_called() {
    let base = Tagged::new("base");
    let dialect = Tagged::new("dialect");

    let with_override = ProfilerInterface::builder(Arc::new(SqlLog::default()), "data")
        .override_metric(Arc::new(dialect.clone()))
        .build()
        .unwrap();
    let without_override = ProfilerInterface::builder(Arc::new(SqlLog::default()), "data")
        .build()
        .unwrap();

    let value = with_override
        .get_hybrid_metric(&column(), &base, &ColumnResults::new())
        .await
        .unwrap();
    assert_eq!(value, Some(MetricValue::Text("dialect".into())));
    assert_eq!((base.calls(), dialect.calls()), (0, 1));

    let value = without_override
        .get_hybrid_metric(&column(), &base, &ColumnResults::new())
        .await
        .unwrap();
    assert_eq!(value, Some(MetricValue::Text("base".into())));
    assert_eq!((base.calls(), dialect.calls()), (1, 1));
}

#[tokio::test]
async fn test_adapters_never_share_registries() {
    let first = ProfilerInterface::builder(Arc::new(SqlLog::default()), "data")
        .override_metric(Arc::new(Tagged::new("first")))
        .build()
        .unwrap();
    let second = ProfilerInterface::builder(Arc::new(SqlLog::default()), "data")
        .override_metric(Arc::new(Tagged::new("second")))
        .build()
        .unwrap();
    let plain = ProfilerInterface::builder(Arc::new(SqlLog::default()), "data")
        .build()
        .unwrap();

    let base = Tagged::new("base");
    let column = column();
    let results = ColumnResults::new();
    let (a, b, c) = tokio::join!(
        first.get_hybrid_metric(&column, &base, &results),
        second.get_hybrid_metric(&column, &base, &results),
        plain.get_hybrid_metric(&column, &base, &results),
    );

    assert_eq!(a.unwrap(), Some(MetricValue::Text("first".into())));
    assert_eq!(b.unwrap(), Some(MetricValue::Text("second".into())));
    assert_eq!(c.unwrap(), Some(MetricValue::Text("base".into())));
    assert!(plain.overrides().is_empty());
}

#[tokio::test]
async fn test_pinot_and_generic_adapters_emit_different_queries() {
    let results = ColumnResults::new()
        .with(MetricName::Count, 5_i64)
        .unwrap()
        .with(MetricName::Min, 1_i64)
        .unwrap()
        .with(MetricName::Max, 5_i64)
        .unwrap()
        .with(MetricName::InterQuartileRange, 2.0)
        .unwrap();
    let histogram = profiler_engine::metrics::HistogramType::default();

    let generic_log = Arc::new(SqlLog::default());
    let pinot_log = Arc::new(SqlLog::default());
    let generic = ProfilerInterface::builder(generic_log.clone(), "data")
        .build()
        .unwrap();
    let pinot = ProfilerInterface::builder(pinot_log.clone(), "data")
        .dialect(Dialect::Pinot)
        .build()
        .unwrap();

    generic
        .get_hybrid_metric(&column(), &histogram, &results)
        .await
        .unwrap();
    pinot
        .get_hybrid_metric(&column(), &histogram, &results)
        .await
        .unwrap();

    let generic_sql = generic_log.queries().remove(0);
    let pinot_sql = pinot_log.queries().remove(0);
    assert!(generic_sql.contains("COUNT(CASE WHEN"));
    assert!(!generic_sql.contains("SUM("));
    assert!(pinot_sql.contains("SUM(CASE WHEN \"value\" * 1000 >= 1000 AND \"value\" * 1000 < 3339 THEN 1 ELSE 0 END)"));
    assert!(!pinot_sql.contains("COUNT("));

    // same bins, same aliases
    for alias in ["AS \"bin_0\"", "AS \"bin_1\""] {
        assert!(generic_sql.contains(alias));
        assert!(pinot_sql.contains(alias));
    }
    assert!(!generic_sql.contains("AS \"bin_2\""));
    assert!(!pinot_sql.contains("AS \"bin_2\""));
}

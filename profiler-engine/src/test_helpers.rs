//! Test helpers: a recording session and small in-memory contexts.

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ProfilerError, Result};
use crate::metrics::{
    ColumnDescriptor, ColumnResults, HybridMetric, HybridMetricType, Metric, MetricKind,
    MetricName, MetricValue, Sample,
};
use crate::session::{QueryRow, QuerySession, RowSet};

/// A session that records every query and answers from canned data.
#[derive(Debug, Default)]
pub struct RecordingSession {
    queries: Mutex<Vec<String>>,
    first_row: Option<QueryRow>,
    failure: Option<String>,
}

impl RecordingSession {
    /// Returns no rows for every query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every query with a session error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Answers `fetch_first` with `row`.
    pub fn with_first_row(mut self, row: QueryRow) -> Self {
        self.first_row = Some(row);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) -> Result<()> {
        self.queries.lock().unwrap().push(sql.to_string());
        match &self.failure {
            Some(message) => Err(ProfilerError::session(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QuerySession for RecordingSession {
    async fn fetch_first(&self, sql: &str) -> Result<Option<QueryRow>> {
        self.record(sql)?;
        Ok(self.first_row.clone())
    }

    async fn fetch_rows(&self, sql: &str, _limit: usize) -> Result<RowSet> {
        self.record(sql)?;
        Ok(RowSet::default())
    }

    fn engine_name(&self) -> &str {
        "recording"
    }
}

/// A hybrid metric type that counts how often its metrics are computed.
#[derive(Debug)]
pub struct CountingType {
    pub name: MetricName,
    pub label: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl CountingType {
    pub fn new(name: MetricName, label: &'static str) -> Self {
        Self {
            name,
            label,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl HybridMetricType for CountingType {
    fn name(&self) -> MetricName {
        self.name
    }

    fn instantiate(&self, _column: &ColumnDescriptor) -> Box<dyn HybridMetric> {
        Box::new(CountingMetric {
            name: self.name,
            label: self.label,
            calls: self.calls.clone(),
        })
    }
}

#[derive(Debug)]
struct CountingMetric {
    name: MetricName,
    label: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Metric for CountingMetric {
    fn name(&self) -> MetricName {
        self.name
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Hybrid
    }
}

#[async_trait]
impl HybridMetric for CountingMetric {
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

/// Results of the column `[1, 2, 3, 4, 5]`.
pub fn golden_results() -> ColumnResults {
    ColumnResults::new()
        .with(MetricName::Count, 5_i64)
        .unwrap()
        .with(MetricName::Min, 1_i64)
        .unwrap()
        .with(MetricName::Max, 5_i64)
        .unwrap()
        .with(MetricName::InterQuartileRange, 2.0)
        .unwrap()
}

/// A context with one nullable Int64 column registered as `table`.
pub fn numeric_context(table: &str, column: &str, values: Vec<Option<i64>>) -> SessionContext {
    let ctx = SessionContext::new();
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new(column, DataType::Int64, true)])),
        vec![Arc::new(Int64Array::from(values)) as ArrayRef],
    )
    .unwrap();
    ctx.register_batch(table, batch).unwrap();
    ctx
}

/// A batch with a single Utf8 column named `comment`.
pub fn text_batch(values: &[&str]) -> RecordBatch {
    RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("comment", DataType::Utf8, true)])),
        vec![Arc::new(StringArray::from(values.to_vec())) as ArrayRef],
    )
    .unwrap()
}

//! Sample data extraction.
//!
//! A [`Sampler`] reads a bounded number of rows from a [`RowSource`] and
//! truncates every textual cell as the last step, whichever source the rows
//! came from.

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::ProfilerConfig;
use crate::error::Result;
use crate::metrics::{ColumnDescriptor, Sample};
use crate::security::{sample_query_statement, InputValidator};
use crate::session::{batch_to_rows, QuerySession, RowSet};

mod truncation;

pub use truncation::{truncate_cell, truncate_row, truncate_rows};

/// Sample rows returned to callers, with cells already truncated.
pub type SampleData = RowSet;

/// Where sample rows are read from.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Reads at most `limit` rows.
    async fn read_rows(&self, limit: usize) -> Result<RowSet>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// Reads rows through a query session.
///
/// Rows come from the sample's table, or from a user-supplied query set with
/// [`SqlRowSource::with_query`]. Either way the session is asked for at most
/// `limit` rows.
pub struct SqlRowSource {
    session: Arc<dyn QuerySession>,
    sample: Sample,
    columns: Vec<ColumnDescriptor>,
    query: Option<String>,
}

impl SqlRowSource {
    pub fn new(session: Arc<dyn QuerySession>, sample: Sample) -> Self {
        Self {
            session,
            sample,
            columns: Vec::new(),
            query: None,
        }
    }

    /// Restricts the sample to the given columns, in that order.
    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// Reads from `sql` instead of the sample's table.
    ///
    /// The query is wrapped as `SELECT <cols> FROM (<sql>) AS sample_query
    /// LIMIT n`, so its own ordering and filters are kept.
    pub fn with_query(mut self, sql: impl Into<String>) -> Self {
        self.query = Some(sql.into());
        self
    }

    fn query(&self, limit: usize) -> Result<String> {
        let relation = match &self.query {
            Some(sql) => {
                InputValidator::validate_sample_query(sql)?;
                format!("({}) AS sample_query", sample_query_statement(sql))
            }
            None => self.sample.from_clause().to_string(),
        };
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(ColumnDescriptor::identifier)
                .collect::<Result<Vec<_>>>()?
                .join(", ")
        };
        Ok(format!("SELECT {projection} FROM {relation} LIMIT {limit}"))
    }
}

#[async_trait]
impl RowSource for SqlRowSource {
    async fn read_rows(&self, limit: usize) -> Result<RowSet> {
        let sql = self.query(limit)?;
        self.session.fetch_rows(&sql, limit).await
    }

    fn describe(&self) -> String {
        let origin = if self.query.is_some() {
            "sample_query"
        } else {
            self.sample.table_name()
        };
        format!("{}:{origin}", self.session.engine_name())
    }
}

/// Reads rows from in-memory Arrow record batches.
pub struct BatchRowSource {
    batches: Vec<RecordBatch>,
}

impl BatchRowSource {
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }
}

#[async_trait]
impl RowSource for BatchRowSource {
    async fn read_rows(&self, limit: usize) -> Result<RowSet> {
        let columns = self
            .batches
            .first()
            .map(|batch| {
                batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect()
            })
            .unwrap_or_default();

        let mut rows = Vec::new();
        for batch in &self.batches {
            let remaining = limit.saturating_sub(rows.len());
            if remaining == 0 {
                break;
            }
            let take = batch.num_rows().min(remaining);
            rows.extend(batch_to_rows(&batch.slice(0, take))?);
        }

        Ok(RowSet { columns, rows })
    }

    fn describe(&self) -> String {
        format!("batches({})", self.batches.len())
    }
}

/// Bounded, truncating reader of sample rows.
pub struct Sampler<S: RowSource> {
    source: S,
    sample_limit: usize,
    max_cell_length: usize,
}

impl<S: RowSource> Sampler<S> {
    pub fn new(source: S, config: &ProfilerConfig) -> Self {
        Self {
            source,
            sample_limit: config.sample_limit,
            max_cell_length: config.max_cell_length,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reads up to the configured number of rows and truncates their cells.
    #[instrument(skip(self), fields(source = %self.source.describe(), limit = self.sample_limit))]
    pub async fn fetch_sample_data(&self) -> Result<SampleData> {
        let RowSet { columns, rows } = self.source.read_rows(self.sample_limit).await?;
        let rows = truncate_rows(rows, self.max_cell_length);
        debug!(rows = rows.len(), "Fetched sample data");
        Ok(SampleData { columns, rows })
    }
}

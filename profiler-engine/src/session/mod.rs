//! Query execution seam between the metric engine and a backend.
//!
//! Metrics never talk to an engine directly: they synthesize SQL and hand it
//! to a [`QuerySession`]. DataFusion's `SessionContext` implements the trait
//! out of the box; other engines plug in with their own implementation.
//! Connection management, retries and timeouts belong to the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod cell;
mod datafusion_session;

pub use cell::{array_to_cells, batch_to_rows, CellValue};

/// One result row with its column labels, in select-list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    columns: Vec<String>,
    values: Vec<CellValue>,
}

impl QueryRow {
    /// Creates a row; labels and values are paired positionally.
    pub fn new(columns: Vec<String>, values: Vec<CellValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Looks up a value by its column label.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Iterates `(column, value)` pairs in select-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A bounded set of rows sharing one column layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// An engine connection able to run synthesized profiling queries.
#[async_trait]
pub trait QuerySession: Send + Sync {
    /// Runs `sql` and returns its first row, or `None` when it yields no rows.
    async fn fetch_first(&self, sql: &str) -> Result<Option<QueryRow>>;

    /// Runs `sql` and returns at most `limit` rows.
    async fn fetch_rows(&self, sql: &str, limit: usize) -> Result<RowSet>;

    /// Short engine name used in logs.
    fn engine_name(&self) -> &str {
        "unknown"
    }
}

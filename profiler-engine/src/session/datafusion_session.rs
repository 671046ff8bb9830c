//! [`QuerySession`] implementation for DataFusion.

use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use futures::StreamExt;
use tracing::{debug, instrument};

use super::{batch_to_rows, QueryRow, QuerySession, RowSet};
use crate::error::Result;

#[async_trait]
impl QuerySession for SessionContext {
    #[instrument(skip(self, sql), fields(engine = "datafusion"))]
    async fn fetch_first(&self, sql: &str) -> Result<Option<QueryRow>> {
        debug!(sql = %sql, "Executing query");
        let df = self.sql(sql).await?.limit(0, Some(1))?;
        let batches = df.collect().await?;

        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }
            let columns = batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
            let mut rows = batch_to_rows(&batch.slice(0, 1))?;
            return Ok(rows.pop().map(|values| QueryRow::new(columns, values)));
        }

        Ok(None)
    }

    #[instrument(skip(self, sql), fields(engine = "datafusion"))]
    async fn fetch_rows(&self, sql: &str, limit: usize) -> Result<RowSet> {
        debug!(sql = %sql, "Executing bounded query");
        let df = self.sql(sql).await?.limit(0, Some(limit))?;
        let columns = df
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();

        let mut stream = df.execute_stream().await?;
        let mut rows = Vec::new();
        while let Some(batch) = stream.next().await {
            let batch = batch?;
            let remaining = limit - rows.len();
            let take = batch.num_rows().min(remaining);
            rows.extend(batch_to_rows(&batch.slice(0, take))?);
            if rows.len() >= limit {
                break;
            }
        }

        Ok(RowSet { columns, rows })
    }

    fn engine_name(&self) -> &str {
        "datafusion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CellValue;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn create_test_context() -> SessionContext {
        let ctx = SessionContext::new();
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new("id", DataType::Int64, true),
                Field::new("name", DataType::Utf8, true),
            ])),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef,
                Arc::new(StringArray::from(vec!["a", "b", "c", "d"])) as ArrayRef,
            ],
        )
        .unwrap();
        ctx.register_batch("data", batch).unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_fetch_first_aggregate_row() {
        let ctx = create_test_context();
        let row = ctx
            .fetch_first("SELECT COUNT(\"id\") AS \"n\", MAX(\"id\") AS \"top\" FROM data")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(row.columns(), &["n".to_string(), "top".to_string()]);
        assert_eq!(row.get("n"), Some(&CellValue::Integer(4)));
        assert_eq!(row.get("top"), Some(&CellValue::Integer(4)));
    }

    #[tokio::test]
    async fn test_fetch_first_empty_result() {
        let ctx = create_test_context();
        let row = ctx
            .fetch_first("SELECT \"id\" FROM data WHERE \"id\" > 100")
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_fetch_rows_respects_limit() {
        let ctx = create_test_context();
        let rows = ctx.fetch_rows("SELECT * FROM data", 2).await.unwrap();
        assert_eq!(rows.columns, vec!["id".to_string(), "name".to_string()]);
        assert_eq!(rows.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_query_errors_propagate() {
        let ctx = create_test_context();
        let err = ctx.fetch_first("SELECT missing FROM data").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ProfilerError::QueryExecution(_)
        ));
    }
}

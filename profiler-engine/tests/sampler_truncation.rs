use arrow::array::{ArrayRef, BinaryArray, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use profiler_engine::config::SAMPLE_DATA_MAX_CELL_LENGTH;
use profiler_engine::prelude::*;
use std::sync::Arc;

fn mixed_batch(long_len: usize) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("comment", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, true),
        Field::new("payload", DataType::Binary, true),
    ]);
    let long_text = "x".repeat(long_len);
    let at_limit = "y".repeat(SAMPLE_DATA_MAX_CELL_LENGTH);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
            Arc::new(StringArray::from(vec![
                Some(long_text.as_str()),
                Some(at_limit.as_str()),
                None,
            ])) as ArrayRef,
            Arc::new(BooleanArray::from(vec![Some(true), None, Some(false)])) as ArrayRef,
            Arc::new(BinaryArray::from(vec![
                Some(vec![0_u8; 300_000].as_slice()),
                None,
                Some(b"ab".as_slice()),
            ])) as ArrayRef,
        ],
    )
    .unwrap()
}

fn assert_truncated(data: &SampleData) {
    assert_eq!(data.columns, vec!["id", "comment", "active", "payload"]);
    assert_eq!(data.rows.len(), 3);

    let first = data.rows[0][1].as_str().unwrap();
    assert_eq!(first.chars().count(), SAMPLE_DATA_MAX_CELL_LENGTH);
    assert!(first.chars().all(|c| c == 'x'));

    let second = data.rows[1][1].as_str().unwrap();
    assert_eq!(second, "y".repeat(SAMPLE_DATA_MAX_CELL_LENGTH));

    assert_eq!(data.rows[2][1], CellValue::Null);
    assert_eq!(data.rows[0][0], CellValue::Integer(1));
    assert_eq!(data.rows[0][2], CellValue::Boolean(true));
    assert_eq!(data.rows[1][2], CellValue::Null);
    assert_eq!(data.rows[0][3], CellValue::Bytes(vec![0_u8; 300_000]));
}

#[tokio::test]
async fn test_sql_source_truncates_text_cells() {
    let ctx = SessionContext::new();
    ctx.register_batch("data", mixed_batch(SAMPLE_DATA_MAX_CELL_LENGTH + 50_000))
        .unwrap();
    let interface = ProfilerInterface::builder(Arc::new(ctx), "data")
        .build()
        .unwrap();

    let data = interface.sampler().fetch_sample_data().await.unwrap();
    assert_truncated(&data);
}

#[tokio::test]
async fn test_batch_source_truncates_text_cells() {
    let batch = mixed_batch(SAMPLE_DATA_MAX_CELL_LENGTH + 50_000);
    let sampler = Sampler::new(BatchRowSource::new(vec![batch]), &ProfilerConfig::default());

    let data = sampler.fetch_sample_data().await.unwrap();
    assert_truncated(&data);
}

#[tokio::test]
async fn test_sample_limit_bounds_rows() {
    let ctx = SessionContext::new();
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)])),
        vec![Arc::new(Int64Array::from((0..500).collect::<Vec<i64>>())) as ArrayRef],
    )
    .unwrap();
    ctx.register_batch("data", batch).unwrap();

    let interface = ProfilerInterface::builder(Arc::new(ctx), "data")
        .config(ProfilerConfig::default().with_sample_limit(20))
        .build()
        .unwrap();

    let data = interface.sampler().fetch_sample_data().await.unwrap();
    assert_eq!(data.rows.len(), 20);
}

#[tokio::test]
async fn test_custom_cell_length() {
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("comment", DataType::Utf8, true)])),
        vec![Arc::new(StringArray::from(vec!["añadir", "ok"])) as ArrayRef],
    )
    .unwrap();
    let config = ProfilerConfig::default().with_max_cell_length(3);
    let data = Sampler::new(BatchRowSource::new(vec![batch]), &config)
        .fetch_sample_data()
        .await
        .unwrap();

    assert_eq!(
        data.rows,
        vec![
            vec![CellValue::Text("aña".into())],
            vec![CellValue::Text("ok".into())],
        ]
    );
}

#[tokio::test]
async fn test_user_query_truncates_oversized_cells() {
    let long_body = "b".repeat(SAMPLE_DATA_MAX_CELL_LENGTH * 2);
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("body", DataType::Utf8, true),
        ])),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
            Arc::new(StringArray::from(vec!["huge", "small", "null_body"])) as ArrayRef,
            Arc::new(StringArray::from(vec![
                Some(long_body.as_str()),
                Some("z"),
                None,
            ])) as ArrayRef,
        ],
    )
    .unwrap();
    let ctx = SessionContext::new();
    ctx.register_batch("huge_text", batch).unwrap();

    // the interface's own table is never read
    let interface = ProfilerInterface::builder(Arc::new(ctx), "unused")
        .config(
            ProfilerConfig::default()
                .with_sample_query("SELECT id, name, body FROM huge_text ORDER BY id"),
        )
        .build()
        .unwrap();

    let data = interface.sampler().fetch_sample_data().await.unwrap();
    assert_eq!(data.columns, vec!["id", "name", "body"]);
    assert_eq!(data.rows.len(), 3);
    for row in &data.rows {
        for cell in row {
            if let Some(text) = cell.as_str() {
                assert!(text.chars().count() <= SAMPLE_DATA_MAX_CELL_LENGTH);
            }
        }
    }
    assert_eq!(
        data.rows[0][2].as_str().map(|s| s.chars().count()),
        Some(SAMPLE_DATA_MAX_CELL_LENGTH)
    );
    assert_eq!(data.rows[1][2], CellValue::Text("z".into()));
    assert_eq!(data.rows[2][2], CellValue::Null);
}

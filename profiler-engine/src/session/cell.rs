//! Scalar cell values and their extraction from Arrow arrays.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, UInt64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single scalar value read from a query result or an in-memory batch.
///
/// Types without a dedicated variant (dates, timestamps, intervals, nested
/// values) are carried as their display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns the value as a number when it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(value: Vec<u8>) -> Self {
        CellValue::Bytes(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// Converts every value of an Arrow array into cells.
pub fn array_to_cells(array: &ArrayRef) -> Result<Vec<CellValue>> {
    let len = array.len();
    let cells: Vec<CellValue> = match array.data_type() {
        DataType::Null => vec![CellValue::Null; len],
        DataType::Boolean => {
            let values = array.as_boolean();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Boolean(values.value(i))
                    }
                })
                .collect()
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let widened = cast(array, &DataType::Int64)?;
            let values = widened.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Integer(values.value(i))
                    }
                })
                .collect()
        }
        DataType::UInt64 => {
            let values = array.as_primitive::<UInt64Type>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        let v = values.value(i);
                        i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
                    }
                })
                .collect()
        }
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let widened = cast(array, &DataType::Float64)?;
            let values = widened.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Float(values.value(i))
                    }
                })
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let normalized = cast(array, &DataType::Utf8)?;
            let values = normalized.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Text(values.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => {
            let normalized = cast(array, &DataType::LargeBinary)?;
            let values = normalized.as_binary::<i64>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bytes(values.value(i).to_vec())
                    }
                })
                .collect()
        }
        DataType::FixedSizeBinary(_) => {
            let values = array.as_fixed_size_binary();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bytes(values.value(i).to_vec())
                    }
                })
                .collect()
        }
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
            (0..len)
                .map(|i| {
                    if array.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

/// Converts a record batch into row-major cells.
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Vec<CellValue>>> {
    let columns = batch
        .columns()
        .iter()
        .map(array_to_cells)
        .collect::<Result<Vec<_>>>()?;

    let mut rows = vec![Vec::with_capacity(columns.len()); batch.num_rows()];
    for column in columns {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.push(cell);
        }
    }
    Ok(rows)
}

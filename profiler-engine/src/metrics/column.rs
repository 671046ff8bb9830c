//! Column descriptors, semantic column types and sample handles.

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::security::SqlSecurity;

/// Semantic type of a profiled column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Decimal,
    Text,
    Boolean,
    Date,
    Timestamp,
    Binary,
    Other,
}

impl ColumnType {
    /// Numeric types whose values can be binned directly.
    pub fn is_quantifiable(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Decimal
        )
    }

    /// Textual types, profiled through their length.
    pub fn is_concatenable(&self) -> bool {
        matches!(self, ColumnType::Text)
    }

    pub fn is_date_time(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Timestamp)
    }

    /// Maps an Arrow data type onto its semantic type.
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnType::Integer,
            DataType::Float16 | DataType::Float32 | DataType::Float64 => ColumnType::Float,
            DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => ColumnType::Decimal,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnType::Text,
            DataType::Boolean => ColumnType::Boolean,
            DataType::Date32 | DataType::Date64 => ColumnType::Date,
            DataType::Timestamp(_, _) => ColumnType::Timestamp,
            DataType::Binary
            | DataType::LargeBinary
            | DataType::BinaryView
            | DataType::FixedSizeBinary(_) => ColumnType::Binary,
            _ => ColumnType::Other,
        }
    }
}

/// A column to profile: its name and semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Whether a histogram can be computed for this column at all.
    pub fn supports_histogram(&self) -> bool {
        self.column_type.is_quantifiable() || self.column_type.is_concatenable()
    }

    /// The escaped column identifier.
    pub fn identifier(&self) -> Result<String> {
        SqlSecurity::escape_identifier(&self.name)
    }

    /// The SQL expression metrics aggregate over.
    ///
    /// Textual columns are profiled through `LENGTH(column)`, every other
    /// type through the raw value.
    pub fn profiled_expression(&self) -> Result<String> {
        let ident = self.identifier()?;
        if self.column_type.is_concatenable() {
            Ok(format!("LENGTH({ident})"))
        } else {
            Ok(ident)
        }
    }
}

/// Handle to the dataset a profiling query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    table: String,
    from_clause: String,
}

impl Sample {
    /// Creates a sample over a (possibly schema-qualified) table.
    pub fn table(name: impl Into<String>) -> Result<Self> {
        let table = name.into();
        let from_clause = SqlSecurity::escape_table_name(&table)?;
        Ok(Self { table, from_clause })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The escaped relation to place after `FROM`.
    pub fn from_clause(&self) -> &str {
        &self.from_clause
    }
}

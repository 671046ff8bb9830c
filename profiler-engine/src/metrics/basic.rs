//! Static metrics the histogram depends on: count, min and max.

use super::{ColumnDescriptor, Metric, MetricKind, MetricName, StaticMetric};
use crate::error::Result;

/// Number of non-null values of the column.
#[derive(Debug, Clone)]
pub struct Count {
    column: ColumnDescriptor,
}

impl Count {
    pub fn new(column: ColumnDescriptor) -> Self {
        Self { column }
    }
}

impl Metric for Count {
    fn name(&self) -> MetricName {
        MetricName::Count
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Static
    }
}

impl StaticMetric for Count {
    fn aggregate_expression(&self) -> Result<Option<String>> {
        let ident = self.column.identifier()?;
        Ok(Some(format!("COUNT({ident})")))
    }
}

/// Smallest value of the profiled expression.
///
/// Dates and timestamps are supported but come back as text, which marks
/// them as non-numeric for downstream metrics.
#[derive(Debug, Clone)]
pub struct Min {
    column: ColumnDescriptor,
}

impl Min {
    pub fn new(column: ColumnDescriptor) -> Self {
        Self { column }
    }
}

impl Metric for Min {
    fn name(&self) -> MetricName {
        MetricName::Min
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Static
    }
}

impl StaticMetric for Min {
    fn aggregate_expression(&self) -> Result<Option<String>> {
        extreme_expression("MIN", &self.column)
    }
}

/// Largest value of the profiled expression.
#[derive(Debug, Clone)]
pub struct Max {
    column: ColumnDescriptor,
}

impl Max {
    pub fn new(column: ColumnDescriptor) -> Self {
        Self { column }
    }
}

impl Metric for Max {
    fn name(&self) -> MetricName {
        MetricName::Max
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Static
    }
}

impl StaticMetric for Max {
    fn aggregate_expression(&self) -> Result<Option<String>> {
        extreme_expression("MAX", &self.column)
    }
}

fn extreme_expression(function: &str, column: &ColumnDescriptor) -> Result<Option<String>> {
    let ty = column.column_type;
    if !(ty.is_quantifiable() || ty.is_concatenable() || ty.is_date_time()) {
        return Ok(None);
    }
    let expr = column.profiled_expression()?;
    Ok(Some(format!("{function}({expr})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ColumnType, MetricValue};
    use crate::session::CellValue;

    #[test]
    fn test_count_expression() {
        let count = Count::new(ColumnDescriptor::new("comment", ColumnType::Text));
        assert_eq!(
            count.aggregate_expression().unwrap().unwrap(),
            "COUNT(\"comment\")"
        );
    }

    #[test]
    fn test_min_max_use_length_for_text() {
        let column = ColumnDescriptor::new("comment", ColumnType::Text);
        assert_eq!(
            Min::new(column.clone()).aggregate_expression().unwrap().unwrap(),
            "MIN(LENGTH(\"comment\"))"
        );
        assert_eq!(
            Max::new(column).aggregate_expression().unwrap().unwrap(),
            "MAX(LENGTH(\"comment\"))"
        );
    }

    #[test]
    fn test_min_unsupported_for_boolean() {
        let min = Min::new(ColumnDescriptor::new("flag", ColumnType::Boolean));
        assert_eq!(min.aggregate_expression().unwrap(), None);
    }

    #[test]
    fn test_parse_value() {
        let max = Max::new(ColumnDescriptor::new("ts", ColumnType::Date));
        assert_eq!(
            max.parse_value(&CellValue::Text("2024-01-01".into())),
            Some(MetricValue::Text("2024-01-01".into()))
        );
        assert_eq!(max.parse_value(&CellValue::Null), None);
        assert_eq!(max.kind(), MetricKind::Static);
    }
}

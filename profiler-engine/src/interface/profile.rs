//! Profile of a single column.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::{ColumnDescriptor, ColumnResults, HistogramResult, MetricName, MetricValue};

/// Every metric computed for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: ColumnDescriptor,
    pub metrics: ColumnResults,
}

impl ColumnProfile {
    pub fn new(column: ColumnDescriptor, metrics: ColumnResults) -> Self {
        Self { column, metrics }
    }

    pub fn get(&self, name: MetricName) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn numeric(&self, name: MetricName) -> Option<f64> {
        self.metrics.numeric(name)
    }

    /// The histogram, when the column supported one.
    pub fn histogram(&self) -> Option<&HistogramResult> {
        self.get(MetricName::Histogram)
            .and_then(MetricValue::as_histogram)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

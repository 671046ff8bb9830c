//! Types for metric names, values and per-column result maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ProfilerError, Result};

/// Closed set of metric identifiers known to the engine.
///
/// The serialized form is the stable identifier used in profile payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricName {
    /// Number of non-null values.
    #[serde(rename = "valuesCount")]
    Count,
    #[serde(rename = "min")]
    Min,
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "firstQuartile")]
    FirstQuartile,
    #[serde(rename = "thirdQuartile")]
    ThirdQuartile,
    #[serde(rename = "interQuartileRange")]
    InterQuartileRange,
    #[serde(rename = "histogram")]
    Histogram,
}

impl MetricName {
    /// Returns the stable identifier of the metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Count => "valuesCount",
            MetricName::Min => "min",
            MetricName::Max => "max",
            MetricName::FirstQuartile => "firstQuartile",
            MetricName::ThirdQuartile => "thirdQuartile",
            MetricName::InterQuartileRange => "interQuartileRange",
            MetricName::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value produced by a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MetricValue {
    /// A floating-point metric value.
    Double(f64),

    /// An integer metric value (e.g. a count).
    Long(i64),

    /// A non-numeric value, such as the minimum of a date column.
    Text(String),

    /// A histogram over the column's profiled expression.
    Histogram(HistogramResult),
}

impl MetricValue {
    /// Checks if the metric value is numeric (Double or Long).
    pub fn is_numeric(&self) -> bool {
        match self {
            MetricValue::Double(v) => v.is_finite(),
            MetricValue::Long(_) => true,
            _ => false,
        }
    }

    /// Attempts to get the numeric value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Double(v) if v.is_finite() => Some(*v),
            MetricValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the histogram if this value holds one.
    pub fn as_histogram(&self) -> Option<&HistogramResult> {
        match self {
            MetricValue::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Double(v) => write!(f, "{v}"),
            MetricValue::Long(v) => write!(f, "{v}"),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Histogram(h) => write!(f, "Histogram({} bins)", h.boundaries.len()),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Double(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Long(value)
    }
}

impl From<HistogramResult> for MetricValue {
    fn from(value: HistogramResult) -> Self {
        MetricValue::Histogram(value)
    }
}

/// Bin labels and their counts, in ascending bin order.
///
/// `boundaries` and `frequencies` always have the same length. The last label
/// denotes the open-ended upper bin ("X and up").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramResult {
    pub boundaries: Vec<String>,
    pub frequencies: Vec<u64>,
}

impl HistogramResult {
    /// Builds a histogram, rejecting mismatched label and count sequences.
    pub fn new(boundaries: Vec<String>, frequencies: Vec<u64>) -> Result<Self> {
        if boundaries.len() != frequencies.len() {
            return Err(ProfilerError::invalid_data(format!(
                "histogram has {} boundaries but {} frequencies",
                boundaries.len(),
                frequencies.len()
            )));
        }
        Ok(Self {
            boundaries,
            frequencies,
        })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Sum of all bin counts.
    pub fn total(&self) -> u64 {
        self.frequencies.iter().sum()
    }
}

/// Metric results for a single column, accumulated as metrics complete.
///
/// An entry is write-once: storing a metric that is already present fails
/// with [`ProfilerError::MetricAlreadyComputed`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnResults {
    values: BTreeMap<MetricName, MetricValue>,
}

impl ColumnResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the value of a metric.
    pub fn insert(&mut self, name: MetricName, value: impl Into<MetricValue>) -> Result<()> {
        if self.values.contains_key(&name) {
            return Err(ProfilerError::MetricAlreadyComputed(name));
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Builder-style insert, mainly for assembling fixtures.
    pub fn with(mut self, name: MetricName, value: impl Into<MetricValue>) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: MetricName) -> Option<&MetricValue> {
        self.values.get(&name)
    }

    pub fn contains(&self, name: MetricName) -> bool {
        self.values.contains_key(&name)
    }

    /// Returns the metric as a number, or `None` if absent or non-numeric.
    pub fn numeric(&self, name: MetricName) -> Option<f64> {
        self.get(name).and_then(MetricValue::as_f64)
    }

    /// Returns the metric as a number, failing if it was never computed.
    ///
    /// A present but non-numeric value still yields `Ok(None)`.
    pub fn require_numeric(&self, metric: MetricName, dependency: MetricName) -> Result<Option<f64>> {
        match self.get(dependency) {
            Some(value) => Ok(value.as_f64()),
            None => Err(ProfilerError::missing_dependency(metric, dependency)),
        }
    }

    /// True when the metric is present but is not a number.
    pub fn is_non_numeric(&self, name: MetricName) -> bool {
        self.get(name).is_some_and(|v| !v.is_numeric())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricName, &MetricValue)> {
        self.values.iter()
    }
}

//! Bin sizing for numeric histograms.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::config::DEFAULT_MAX_BINS;
use crate::metrics::{ColumnResults, MetricName};

/// The prior results a histogram is planned from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramInputs {
    /// Interquartile range; `None` falls back to Sturges' rule
    pub iqr: Option<f64>,
    /// Number of non-null values
    pub row_count: f64,
    pub min: f64,
    pub max: f64,
}

impl HistogramInputs {
    /// Reads the inputs from a column's results.
    ///
    /// Returns `None` when count, min or max is missing or non-numeric.
    pub fn from_results(results: &ColumnResults) -> Option<Self> {
        Some(Self {
            iqr: results.numeric(MetricName::InterQuartileRange),
            row_count: results.numeric(MetricName::Count)?,
            min: results.numeric(MetricName::Min)?,
            max: results.numeric(MetricName::Max)?,
        })
    }
}

/// Number and width of bins, and where the first one starts.
///
/// A plan is derived once per histogram and shared verbatim by every query
/// dialect.
///
/// # Example
///
/// ```rust
/// use profiler_engine::metrics::BinPlan;
///
/// let plan = BinPlan {
///     num_bins: 2,
///     bin_width: 2.5,
///     starting_bound: 0.0,
/// };
/// let labels: Vec<String> = plan.bounds().iter().map(|b| b.label()).collect();
/// assert_eq!(labels, vec!["0.000 to 2.500", "2.500 and up"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinPlan {
    /// Number of bins; zero means no histogram
    pub num_bins: usize,
    /// Width shared by every bin, in units of the profiled expression
    pub bin_width: f64,
    /// Inclusive lower bound of the first bin, the column minimum
    pub starting_bound: f64,
}

impl BinPlan {
    /// A plan with no bins; no histogram is produced.
    pub fn empty(starting_bound: f64) -> Self {
        Self {
            num_bins: 0,
            bin_width: 0.0,
            starting_bound,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_bins == 0
    }

    /// Bounds of each bin in ascending order.
    ///
    /// Ends advance by repeated addition of the width. The last bin is
    /// open-ended so that the maximum is always counted.
    pub fn bounds(&self) -> Vec<BinBounds> {
        let mut bounds = Vec::with_capacity(self.num_bins);
        let mut start = self.starting_bound;
        let mut end = start + self.bin_width;

        for index in 0..self.num_bins {
            if index + 1 < self.num_bins {
                bounds.push(BinBounds {
                    index,
                    start,
                    end: Some(end),
                });
                start = end;
                end += self.bin_width;
            } else {
                bounds.push(BinBounds {
                    index,
                    start,
                    end: None,
                });
            }
        }

        bounds
    }
}

/// One bin: `start <= v < end`, or `v >= start` for the open last bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinBounds {
    /// Position of the bin in its plan
    pub index: usize,
    /// Inclusive lower bound
    pub start: f64,
    /// Exclusive upper bound; `None` for the last bin
    pub end: Option<f64>,
}

impl BinBounds {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Result column alias of the bin's aggregate.
    ///
    /// Derived from the position alone so that bins narrower than the label
    /// precision still get distinct columns.
    pub fn alias(&self) -> String {
        format!("bin_{}", self.index)
    }

    /// Human-readable label with bounds rounded to three decimals.
    pub fn label(&self) -> String {
        match self.end {
            Some(end) => format!("{:.3} to {:.3}", self.start, end),
            None => format!("{:.3} and up", self.start),
        }
    }
}

/// Strategy deciding how many bins a histogram gets and how wide they are.
pub trait BinSizing: Send + Sync + Debug {
    fn plan(&self, inputs: &HistogramInputs) -> BinPlan;
}

/// Freedman-Diaconis rule with a Sturges fallback and a bin cap.
///
/// - width `2 * iqr * n^(-1/3)`, count `ceil((max - min) / width)`;
/// - without a positive IQR, `ceil(log2(n) + 1)` bins spread over the range;
/// - more than `max_bins` bins are collapsed to `max_bins` equal-width bins.
///
/// An empty column or a zero range yields no bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreedmanDiaconis {
    pub max_bins: usize,
}

impl FreedmanDiaconis {
    pub fn new(max_bins: usize) -> Self {
        Self {
            max_bins: max_bins.max(1),
        }
    }
}

impl Default for FreedmanDiaconis {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BINS)
    }
}

impl BinSizing for FreedmanDiaconis {
    fn plan(&self, inputs: &HistogramInputs) -> BinPlan {
        let HistogramInputs {
            iqr,
            row_count,
            min,
            max,
        } = *inputs;
        let range = max - min;

        if !(row_count >= 1.0) || !range.is_finite() || range <= 0.0 {
            return BinPlan::empty(min);
        }

        let (mut num_bins, mut bin_width) = match iqr.filter(|v| v.is_finite() && *v > 0.0) {
            Some(iqr) => {
                let width = 2.0 * iqr * row_count.powf(-1.0 / 3.0);
                ((range / width).ceil(), width)
            }
            None => {
                let bins = (row_count.log2() + 1.0).ceil();
                (bins, range / bins)
            }
        };

        if !num_bins.is_finite() || num_bins > self.max_bins as f64 {
            num_bins = self.max_bins as f64;
            bin_width = range / num_bins;
        }

        if num_bins < 1.0 {
            return BinPlan::empty(min);
        }

        BinPlan {
            num_bins: num_bins as usize,
            bin_width,
            starting_bound: min,
        }
    }
}

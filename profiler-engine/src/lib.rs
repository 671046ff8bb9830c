//! # profiler-engine - Column Profiling Metrics
//!
//! `profiler-engine` computes numeric profiles of table columns (count, min,
//! max, quartiles and histograms) by synthesizing aggregate SQL and running it
//! through a [`session::QuerySession`]. DataFusion's `SessionContext` works out
//! of the box; other engines plug in through the same trait.
//!
//! ## Overview
//!
//! - [`metrics`] defines the metric taxonomy (static, composed and hybrid
//!   metrics) and the histogram algorithm.
//! - [`interface`] binds metrics to a backend: one [`interface::ProfilerInterface`]
//!   per sample and dialect, with its own override registry for metrics that
//!   need backend-specific SQL.
//! - [`sampler`] extracts bounded sample rows, truncating oversized text cells.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use datafusion::prelude::*;
//! use profiler_engine::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let ctx = SessionContext::new();
//! // ... register a table named "orders" ...
//!
//! let interface = ProfilerInterface::builder(Arc::new(ctx), "orders")
//!     .dialect(Dialect::Generic)
//!     .build()?;
//!
//! let profile = interface
//!     .profile_column(&ColumnDescriptor::new("amount", ColumnType::Float))
//!     .await?;
//!
//! if let Some(histogram) = profile.histogram() {
//!     for (label, count) in histogram.boundaries.iter().zip(&histogram.frequencies) {
//!         println!("{label}: {count}");
//!     }
//! }
//!
//! let sample = interface.sampler().fetch_sample_data().await?;
//! println!("{} sample rows", sample.rows.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Dialects
//!
//! Some engines cannot run the generic histogram query. Selecting
//! [`interface::Dialect::Pinot`] swaps the histogram for
//! [`metrics::PinotHistogram`], which counts with `SUM(CASE ...)` over scaled
//! integer comparisons while sharing the same bin plan.
//!
//! ## Logging
//!
//! The engine emits `tracing` spans and events under the `profiler_engine`
//! target. See [`logging::setup::init_logging`] for a ready-made subscriber.

pub mod config;
pub mod error;
pub mod interface;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod sampler;
pub mod security;
pub mod session;

#[cfg(test)]
pub mod test_helpers;

//! Per-adapter registry of hybrid metric overrides.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metrics::{HybridMetricType, MetricName};

/// Maps a metric name to the implementation that replaces it on one backend.
///
/// A registry is assembled with [`HybridOverrides::builder`] and has no
/// mutating methods once built. Each adapter owns its own registry, so two
/// adapters never observe each other's entries.
#[derive(Debug, Clone, Default)]
pub struct HybridOverrides {
    entries: HashMap<MetricName, Arc<dyn HybridMetricType>>,
}

impl HybridOverrides {
    /// An empty registry: every metric resolves to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> HybridOverridesBuilder {
        HybridOverridesBuilder::default()
    }

    /// Returns the override registered for `metric_type`, or `metric_type`
    /// itself when there is none.
    pub fn resolve<'a>(&'a self, metric_type: &'a dyn HybridMetricType) -> &'a dyn HybridMetricType {
        match self.entries.get(&metric_type.name()) {
            Some(overridden) => overridden.as_ref(),
            None => metric_type,
        }
    }

    pub fn get(&self, name: MetricName) -> Option<&dyn HybridMetricType> {
        self.entries.get(&name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: MetricName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Names of the overridden metrics, sorted.
    pub fn names(&self) -> Vec<MetricName> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`HybridOverrides`].
#[derive(Debug, Default)]
pub struct HybridOverridesBuilder {
    entries: HashMap<MetricName, Arc<dyn HybridMetricType>>,
}

impl HybridOverridesBuilder {
    /// Registers `metric_type` under its own name, replacing any previous
    /// entry for that name.
    pub fn with(mut self, metric_type: Arc<dyn HybridMetricType>) -> Self {
        self.entries.insert(metric_type.name(), metric_type);
        self
    }

    /// Adds every entry of `other`, replacing entries with the same name.
    pub fn extend(mut self, other: &HybridOverrides) -> Self {
        for (name, metric_type) in &other.entries {
            self.entries.insert(*name, metric_type.clone());
        }
        self
    }

    pub fn build(self) -> HybridOverrides {
        HybridOverrides {
            entries: self.entries,
        }
    }
}

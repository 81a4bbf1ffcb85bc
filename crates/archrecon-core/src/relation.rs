use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::error::ReconError;
use crate::types::TypeId;

/// A component candidate: the set of types evaluated as one component.
pub type Grouping = BTreeSet<TypeId>;

/// Stable, globally unique name of a metric.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MetricId(&'static str);

impl MetricId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A candidate pairing of two groupings and the scores computed for it.
///
/// Positional meaning only matters for directed metrics; commutative
/// metrics score `(a, b)` and `(b, a)` identically.
#[derive(Debug, Clone)]
pub struct ClusteringRelation<'a> {
    source: &'a Grouping,
    target: &'a Grouping,
    results: BTreeMap<MetricId, f64>,
}

impl<'a> ClusteringRelation<'a> {
    pub fn new(source: &'a Grouping, target: &'a Grouping) -> Self {
        Self {
            source,
            target,
            results: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> &'a Grouping {
        self.source
    }

    pub fn target(&self) -> &'a Grouping {
        self.target
    }

    /// Types of both groupings.
    pub fn union(&self) -> Grouping {
        self.source.union(self.target).copied().collect()
    }

    /// The same pairing with the roles swapped and no scores.
    pub fn reversed(&self) -> ClusteringRelation<'a> {
        ClusteringRelation::new(self.target, self.source)
    }

    pub fn result(&self, metric: MetricId) -> Option<f64> {
        self.results.get(&metric).copied()
    }

    pub fn results(&self) -> &BTreeMap<MetricId, f64> {
        &self.results
    }

    pub fn into_results(self) -> BTreeMap<MetricId, f64> {
        self.results
    }

    /// Record a score. A score that is already present is never replaced;
    /// use [`clear_result`](Self::clear_result) to request a recomputation.
    pub fn set_result(&mut self, metric: MetricId, value: f64) -> Result<(), ReconError> {
        if self.results.contains_key(&metric) {
            return Err(ReconError::ScoreAlreadySet(metric));
        }
        self.results.insert(metric, value);
        Ok(())
    }

    pub fn clear_result(&mut self, metric: MetricId) -> Option<f64> {
        self.results.remove(&metric)
    }
}

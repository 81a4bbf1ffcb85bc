//! Clustering metrics and the registry that applies them to relations.
//!
//! Every metric scores one [`ClusteringRelation`] against a shared
//! [`MetricContext`]. The context is built once per reconstruction run: it
//! owns the access cache and the frozen name-similarity table, so the
//! O(n²) pairwise evaluations of the clustering search never recompute graph
//! aggregates.

mod coupling;
mod efferent_coupling;
mod name_resemblance;
mod slice_layer;

pub use coupling::{Coupling, COUPLING};
pub use efferent_coupling::{EfferentCoupling, EFFERENT_COUPLING};
pub use name_resemblance::{NameResemblance, NAME_RESEMBLANCE};
pub use slice_layer::{SliceLayerArchitectureQuality, SLICE_LAYER_ARCHITECTURE_QUALITY};

use tracing::debug_span;

use crate::cache::AccessGraphCache;
use crate::error::ReconError;
use crate::graph::TypeGraph;
use crate::relation::{ClusteringRelation, Grouping, MetricId};
use crate::similarity::{NameSimilarityCache, NameSimilarityCacheBuilder, NameTrimmer};

/// Shared, read-only inputs of all metrics for one reconstruction run.
pub struct MetricContext<'g> {
    graph: &'g TypeGraph,
    access: AccessGraphCache,
    names: NameSimilarityCache,
}

impl<'g> MetricContext<'g> {
    /// Run the initialization pass over the whole graph.
    pub fn initialize(graph: &'g TypeGraph, trimmer: NameTrimmer) -> Self {
        let _span = debug_span!("metric_context", types = graph.type_count()).entered();
        let access = AccessGraphCache::build(graph);
        let names = NameSimilarityCacheBuilder::new(graph)
            .trimmer(trimmer)
            .build();
        Self {
            graph,
            access,
            names,
        }
    }

    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    pub fn access(&self) -> &AccessGraphCache {
        &self.access
    }

    pub fn names(&self) -> &NameSimilarityCache {
        &self.names
    }
}

/// A scorer over clustering relations.
pub trait Metric: Send + Sync {
    /// Unique identifier, used as the score key.
    fn id(&self) -> MetricId;

    /// Whether `(a, b)` and `(b, a)` always score the same.
    fn is_commutative(&self) -> bool;

    /// Whether scores lie in `[0, 1]`.
    fn is_normalised(&self) -> bool {
        true
    }

    /// Score the relation. Must not depend on scores of other metrics.
    fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &ClusteringRelation<'_>,
    ) -> Result<f64, ReconError>;
}

/// Scores of one candidate pair in both directions.
#[derive(Debug, Clone)]
pub struct PairScores<'a> {
    pub forward: ClusteringRelation<'a>,
    pub backward: ClusteringRelation<'a>,
}

/// The set of metrics applied to every relation.
pub struct MetricRegistry {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
        }
    }

    /// Registry with every built-in metric.
    pub fn with_defaults() -> Self {
        Self {
            metrics: vec![
                Box::new(EfferentCoupling),
                Box::new(Coupling),
                Box::new(NameResemblance),
                Box::new(SliceLayerArchitectureQuality),
            ],
        }
    }

    pub fn register(&mut self, metric: Box<dyn Metric>) -> Result<(), ReconError> {
        let id = metric.id();
        if self.get(id).is_some() {
            return Err(ReconError::DuplicateMetric(id));
        }
        self.metrics.push(metric);
        Ok(())
    }

    pub fn get(&self, id: MetricId) -> Option<&dyn Metric> {
        self.metrics
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.as_ref())
    }

    pub fn ids(&self) -> Vec<MetricId> {
        self.metrics.iter().map(|m| m.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Metric> + '_ {
        self.metrics.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Run every metric that has no score on `relation` yet.
    pub fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &mut ClusteringRelation<'_>,
    ) -> Result<(), ReconError> {
        for metric in &self.metrics {
            if relation.result(metric.id()).is_some() {
                continue;
            }
            let score = evaluate(metric.as_ref(), ctx, relation)?;
            relation.set_result(metric.id(), score)?;
        }
        Ok(())
    }

    /// Replace the score of one metric. The old score stays in place if the
    /// computation fails.
    pub fn recompute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &mut ClusteringRelation<'_>,
        id: MetricId,
    ) -> Result<f64, ReconError> {
        let metric = self
            .get(id)
            .ok_or_else(|| ReconError::UnknownMetric(id.to_string()))?;
        let score = evaluate(metric, ctx, relation)?;
        relation.clear_result(id);
        relation.set_result(id, score)?;
        Ok(score)
    }

    /// Score `(a, b)` and `(b, a)`. Commutative metrics run once and the
    /// score is mirrored; directed metrics run once per direction.
    pub fn score_pair<'a>(
        &self,
        ctx: &MetricContext<'_>,
        a: &'a Grouping,
        b: &'a Grouping,
    ) -> Result<PairScores<'a>, ReconError> {
        let mut forward = ClusteringRelation::new(a, b);
        let mut backward = forward.reversed();

        for metric in &self.metrics {
            let score = evaluate(metric.as_ref(), ctx, &forward)?;
            let reverse_score = if metric.is_commutative() {
                score
            } else {
                evaluate(metric.as_ref(), ctx, &backward)?
            };
            forward.set_result(metric.id(), score)?;
            backward.set_result(metric.id(), reverse_score)?;
        }

        Ok(PairScores { forward, backward })
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn evaluate(
    metric: &dyn Metric,
    ctx: &MetricContext<'_>,
    relation: &ClusteringRelation<'_>,
) -> Result<f64, ReconError> {
    let score = metric.compute(ctx, relation)?;
    if !score.is_finite() {
        return Err(ReconError::NonFiniteScore(metric.id()));
    }
    Ok(score)
}

use crate::error::ReconError;
use crate::relation::{ClusteringRelation, Grouping, MetricId};

use super::{Metric, MetricContext};

pub const COUPLING: MetricId = MetricId::new("archrecon.metrics.Coupling");

/// Directed coupling: the share of the source grouping's outgoing external
/// accesses that land in the target grouping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coupling;

impl Metric for Coupling {
    fn id(&self) -> MetricId {
        COUPLING
    }

    fn is_commutative(&self) -> bool {
        false
    }

    fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &ClusteringRelation<'_>,
    ) -> Result<f64, ReconError> {
        let external = ctx.access().external_access_count(relation.source());
        if external == 0 {
            return Ok(0.0);
        }
        let towards_target: Grouping = relation
            .target()
            .difference(relation.source())
            .copied()
            .collect();
        let accesses = ctx
            .access()
            .access_count(relation.source(), &towards_target);
        Ok(accesses as f64 / external as f64)
    }
}

use crate::error::ReconError;
use crate::relation::{ClusteringRelation, MetricId};

use super::{Metric, MetricContext};

pub const EFFERENT_COUPLING: MetricId = MetricId::new("archrecon.metrics.EfferentCoupling");

/// Efferent coupling (Ce) of the merged candidate: how many accesses leave
/// the union of both groupings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EfferentCoupling;

impl Metric for EfferentCoupling {
    fn id(&self) -> MetricId {
        EFFERENT_COUPLING
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn is_normalised(&self) -> bool {
        false
    }

    fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &ClusteringRelation<'_>,
    ) -> Result<f64, ReconError> {
        let internal = relation.union();
        Ok(ctx.access().external_access_count(&internal) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TypeGraph;
    use crate::relation::Grouping;
    use crate::similarity::NameTrimmer;
    use crate::types::AccessKind;

    #[test]
    fn test_single_outside_access() {
        let mut graph = TypeGraph::new();
        let x = graph.add_type_in("app", "ClassX");
        let y = graph.add_type_in("app", "ClassY");
        let z = graph.add_type_in("lib", "ClassZ");
        graph.add_access(x, z, AccessKind::Call);
        let ctx = MetricContext::initialize(&graph, NameTrimmer::default());

        let a: Grouping = [x].into_iter().collect();
        let b: Grouping = [y].into_iter().collect();
        let forward = EfferentCoupling
            .compute(&ctx, &ClusteringRelation::new(&a, &b))
            .unwrap();
        let backward = EfferentCoupling
            .compute(&ctx, &ClusteringRelation::new(&b, &a))
            .unwrap();

        assert_eq!(forward, 1.0);
        assert_eq!(backward, forward);
    }

    #[test]
    fn test_internal_accesses_do_not_count() {
        let mut graph = TypeGraph::new();
        let x = graph.add_type_in("app", "ClassX");
        let y = graph.add_type_in("app", "ClassY");
        graph.add_access(x, y, AccessKind::Call);
        graph.add_access(y, x, AccessKind::Inheritance);
        let ctx = MetricContext::initialize(&graph, NameTrimmer::default());

        let a: Grouping = [x].into_iter().collect();
        let b: Grouping = [y].into_iter().collect();
        let score = EfferentCoupling
            .compute(&ctx, &ClusteringRelation::new(&a, &b))
            .unwrap();
        assert_eq!(score, 0.0);

        let empty = Grouping::new();
        let score = EfferentCoupling
            .compute(&ctx, &ClusteringRelation::new(&empty, &empty))
            .unwrap();
        assert_eq!(score, 0.0);
    }
}

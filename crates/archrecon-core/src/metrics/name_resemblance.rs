use tracing::debug;

use crate::error::ReconError;
use crate::relation::{ClusteringRelation, MetricId};

use super::{Metric, MetricContext};

pub const NAME_RESEMBLANCE: MetricId = MetricId::new("archrecon.metrics.NameResemblance");

/// Mean name similarity over every pair of types drawn from the two
/// groupings. Names are compared after prefix/suffix trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameResemblance;

impl Metric for NameResemblance {
    fn id(&self) -> MetricId {
        NAME_RESEMBLANCE
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &ClusteringRelation<'_>,
    ) -> Result<f64, ReconError> {
        let source = relation.source();
        let target = relation.target();
        let total_compares = source.len() * target.len();
        if total_compares == 0 {
            debug!("name resemblance of an empty grouping");
            return Ok(0.0);
        }

        let mut sum = 0.0;
        for &a in source {
            for &b in target {
                sum += ctx.names().similarity(a, b)?;
            }
        }
        Ok(sum / total_compares as f64)
    }
}

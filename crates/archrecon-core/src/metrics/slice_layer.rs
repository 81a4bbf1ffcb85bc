use crate::error::ReconError;
use crate::graph::TypeGraph;
use crate::relation::{ClusteringRelation, Grouping, MetricId};
use crate::types::PackageId;

use super::{Metric, MetricContext};

pub const SLICE_LAYER_ARCHITECTURE_QUALITY: MetricId =
    MetricId::new("archrecon.metrics.SliceLayerArchitectureQuality");

/// Slice/layer architecture quality (SLAQ).
///
/// Below the common ancestor package of both groupings, every sub-package is
/// a slice and every sub-package of a slice is a layer. The slice with the
/// most layers defines the reference layer names; the score is the fraction
/// of `(slice, reference layer)` combinations that actually exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceLayerArchitectureQuality;

impl Metric for SliceLayerArchitectureQuality {
    fn id(&self) -> MetricId {
        SLICE_LAYER_ARCHITECTURE_QUALITY
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn compute(
        &self,
        ctx: &MetricContext<'_>,
        relation: &ClusteringRelation<'_>,
    ) -> Result<f64, ReconError> {
        let (source, target) = (relation.source(), relation.target());
        if source.is_empty() && target.is_empty() {
            return Ok(1.0);
        }

        let graph = ctx.graph();
        let Some(ancestor) = common_ancestor(graph, source, target) else {
            return Ok(0.0);
        };
        Ok(layering_quality(graph, ancestor))
    }
}

/// Deepest package whose qualified name occurs in the package name of every
/// non-inner member of both groupings.
///
/// Containment is a substring test, not a path-prefix test: `com.foo` is
/// accepted as an ancestor of `com.foobar`.
pub(crate) fn common_ancestor(
    graph: &TypeGraph,
    first: &Grouping,
    second: &Grouping,
) -> Option<PackageId> {
    let mut current = first
        .iter()
        .chain(second.iter())
        .find_map(|&t| graph.type_node(t).package)?;

    for grouping in [first, second] {
        current = widen_until_contained(graph, current, grouping)?;
    }
    Some(current)
}

fn widen_until_contained(
    graph: &TypeGraph,
    mut current: PackageId,
    grouping: &Grouping,
) -> Option<PackageId> {
    loop {
        let prefix = graph.package(current).qualified_name();
        let contained = grouping
            .iter()
            .map(|&t| graph.type_node(t))
            .filter(|node| !node.is_inner)
            .filter_map(|node| node.package)
            .all(|p| graph.package(p).qualified_name().contains(prefix));
        if contained {
            return Some(current);
        }
        current = graph.package(current).parent()?;
    }
}

fn layering_quality(graph: &TypeGraph, ancestor: PackageId) -> f64 {
    let slices = graph.sub_packages(ancestor);

    // On ties the later slice wins.
    let mut reference: &[PackageId] = &[];
    for &slice in slices {
        let layers = graph.sub_packages(slice);
        if layers.len() >= reference.len() {
            reference = layers;
        }
    }
    if reference.is_empty() {
        return 1.0;
    }

    let expected = slices.len() * reference.len();
    if expected == 0 {
        return 1.0;
    }

    let existing: usize = slices
        .iter()
        .map(|&slice| {
            let present: Vec<&str> = graph
                .sub_packages(slice)
                .iter()
                .map(|&layer| graph.package(layer).name())
                .collect();
            reference
                .iter()
                .filter(|&&layer| present.contains(&graph.package(layer).name()))
                .count()
        })
        .sum();

    existing as f64 / expected as f64
}

//! End-to-end runs over a whole snapshot: pairwise candidate scoring and
//! port binding of the full component hierarchy.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info_span;

use crate::binder::{BindingIssue, InterfacePortBinder};
use crate::error::ReconError;
use crate::links::ComponentLink;
use crate::metrics::{MetricContext, MetricRegistry};
use crate::model::{ComponentId, ContextId, InterfaceId, RoleId};
use crate::relation::{ClusteringRelation, MetricId};
use crate::snapshot::Candidate;
use crate::types::Direction;

/// Scores of one directed candidate pair.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScores {
    pub source: String,
    pub target: String,
    pub scores: BTreeMap<MetricId, f64>,
}

impl CandidateScores {
    fn from_relation(
        source: &Candidate,
        target: &Candidate,
        relation: ClusteringRelation<'_>,
    ) -> Self {
        Self {
            source: source.name.clone(),
            target: target.name.clone(),
            scores: relation.into_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringResult {
    pub metrics: Vec<MetricId>,
    pub pairs: Vec<CandidateScores>,
}

/// Score every unordered candidate pair in both directions. Pairs are
/// independent and scored in parallel; the output keeps pair order.
pub fn score_candidates(
    ctx: &MetricContext<'_>,
    registry: &MetricRegistry,
    candidates: &[Candidate],
) -> Result<ScoringResult, ReconError> {
    let _span = info_span!("score_candidates", candidates = candidates.len()).entered();

    let pairs: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|i| ((i + 1)..candidates.len()).map(move |j| (i, j)))
        .collect();

    let scored = pairs
        .par_iter()
        .map(|&(i, j)| -> Result<[CandidateScores; 2], ReconError> {
            let (a, b) = (&candidates[i], &candidates[j]);
            let pair = registry.score_pair(ctx, &a.types, &b.types)?;
            Ok([
                CandidateScores::from_relation(a, b, pair.forward),
                CandidateScores::from_relation(b, a, pair.backward),
            ])
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScoringResult {
        metrics: registry.ids(),
        pairs: scored.into_iter().flatten().collect(),
    })
}

/// One interface exhibited or forwarded by a composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingRecord {
    pub composite: String,
    pub direction: Direction,
    pub sub_component: ComponentId,
    pub interface: InterfaceId,
    pub role: RoleId,
    pub instance: Option<ContextId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub composite: String,
    pub direction: Direction,
    #[serde(flatten)]
    pub issue: BindingIssue,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HierarchyBinding {
    pub bindings: Vec<BindingRecord>,
    pub issues: Vec<IssueRecord>,
}

/// Run the binder for every link with sub-components, provided direction
/// first, walking the hierarchy in pre-order.
pub fn bind_hierarchy<'a>(
    binder: &InterfacePortBinder<'a>,
    root: &'a ComponentLink,
) -> Result<HierarchyBinding, ReconError> {
    let _span = info_span!("bind_hierarchy").entered();
    let mut out = HierarchyBinding::default();

    for link in root.walk() {
        if link.sub_components.is_empty() {
            continue;
        }
        let composite = link.label();
        for direction in [Direction::Provided, Direction::Required] {
            let report = binder.collect_non_bound_interfaces(link, direction)?;
            out.bindings
                .extend(report.bindings.iter().map(|b| BindingRecord {
                    composite: composite.clone(),
                    direction,
                    sub_component: b.sub_component.id.clone(),
                    interface: b.interface_link.interface.clone(),
                    role: b.role.id.clone(),
                    instance: b.instance.map(|ctx| ctx.id.clone()),
                }));
            out.issues
                .extend(report.issues.into_iter().map(|issue| IssueRecord {
                    composite: composite.clone(),
                    direction,
                    issue,
                }));
        }
    }
    Ok(out)
}

use std::collections::HashMap;

use dashmap::DashMap;

use crate::graph::TypeGraph;
use crate::relation::Grouping;
use crate::types::TypeId;

/// Precomputed access structure of the type graph.
///
/// Holds one adjacency entry per edge so that counting accesses for a
/// grouping never walks the petgraph structure again. External access counts
/// are memoised per distinct union in a concurrent map shared by the rayon
/// workers of a scoring run.
pub struct AccessGraphCache {
    outgoing: HashMap<TypeId, Vec<TypeId>>,
    external: DashMap<Vec<TypeId>, usize>,
}

impl AccessGraphCache {
    pub fn build(graph: &TypeGraph) -> Self {
        let outgoing = graph
            .type_ids()
            .map(|id| {
                let targets: Vec<TypeId> = graph.accesses_from(id).map(|(t, _)| t).collect();
                (id, targets)
            })
            .filter(|(_, targets)| !targets.is_empty())
            .collect();

        Self {
            outgoing,
            external: DashMap::new(),
        }
    }

    /// Number of accesses leaving `internal` towards types outside of it.
    pub fn external_access_count(&self, internal: &Grouping) -> usize {
        let key: Vec<TypeId> = internal.iter().copied().collect();
        *self.external.entry(key).or_insert_with(|| {
            self.targets_of(internal)
                .filter(|target| !internal.contains(*target))
                .count()
        })
    }

    /// Number of accesses from a type in `from` to a type in `to`.
    pub fn access_count(&self, from: &Grouping, to: &Grouping) -> usize {
        self.targets_of(from)
            .filter(|target| to.contains(*target))
            .count()
    }

    /// Number of distinct unions memoised so far.
    pub fn memoised_unions(&self) -> usize {
        self.external.len()
    }

    fn targets_of<'a>(&'a self, types: &'a Grouping) -> impl Iterator<Item = &'a TypeId> + 'a {
        types
            .iter()
            .filter_map(|t| self.outgoing.get(t))
            .flatten()
    }
}

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::ReconError;
use crate::graph::TypeGraph;
use crate::types::TypeId;

/// Separator of the excluded prefix/suffix lists in configuration strings.
pub const DEFAULT_DELIMITER: &str = "§";

/// Strips configured prefixes and suffixes from simple type names.
#[derive(Debug, Clone, Default)]
pub struct NameTrimmer {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl NameTrimmer {
    pub fn new<P, S>(prefixes: P, suffixes: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            prefixes: dedup_non_empty(prefixes.into_iter().map(Into::into)),
            suffixes: dedup_non_empty(suffixes.into_iter().map(Into::into)),
        }
    }

    /// Build from two delimiter-separated lists, e.g. `"Abstract§Default"`.
    pub fn from_delimited(prefixes: &str, suffixes: &str, delimiter: &str) -> Self {
        Self::new(split_tokens(prefixes, delimiter), split_tokens(suffixes, delimiter))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Strip every matching prefix until none applies, then every matching
    /// suffix until none applies.
    pub fn trim<'n>(&self, name: &'n str) -> &'n str {
        let name = strip_repeatedly(name, &self.prefixes, |n, p| n.strip_prefix(p));
        strip_repeatedly(name, &self.suffixes, |n, s| n.strip_suffix(s))
    }
}

fn split_tokens<'s>(list: &'s str, delimiter: &'s str) -> impl Iterator<Item = &'s str> + 's {
    // An empty delimiter would split between every character.
    let delimiter = if delimiter.is_empty() {
        DEFAULT_DELIMITER
    } else {
        delimiter
    };
    list.split(delimiter).map(str::trim)
}

fn dedup_non_empty(tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

fn strip_repeatedly<'n>(
    mut name: &'n str,
    patterns: &[String],
    strip: impl Fn(&'n str, &str) -> Option<&'n str>,
) -> &'n str {
    // Patterns are non-empty, so every strip shortens the name and the loop ends.
    while let Some(rest) = patterns.iter().find_map(|p| strip(name, p.as_str())) {
        name = rest;
    }
    name
}

/// Unordered pair of types: `(a, b)` and `(b, a)` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamePair {
    low: TypeId,
    high: TypeId,
}

impl NamePair {
    pub fn new(a: TypeId, b: TypeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// Collects the configuration for a [`NameSimilarityCache`] and computes it.
///
/// The builder has no query methods; scoring can only happen against the
/// finished cache.
pub struct NameSimilarityCacheBuilder<'g> {
    graph: &'g TypeGraph,
    trimmer: NameTrimmer,
}

impl<'g> NameSimilarityCacheBuilder<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            trimmer: NameTrimmer::default(),
        }
    }

    pub fn trimmer(mut self, trimmer: NameTrimmer) -> Self {
        self.trimmer = trimmer;
        self
    }

    /// Score every unordered pair of graph types, including each type with
    /// itself. Pairs are independent and computed in parallel.
    pub fn build(self) -> NameSimilarityCache {
        let ids: Vec<TypeId> = self.graph.type_ids().collect();
        let trimmed: Vec<String> = ids
            .iter()
            .map(|&id| self.trimmer.trim(&self.graph.type_node(id).name).to_string())
            .collect();

        let ids_ref = &ids;
        let names_ref = &trimmed;
        let scores: HashMap<NamePair, f64> = (0..ids.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                (i..ids_ref.len()).map(move |j| {
                    let score = strsim::jaro_winkler(&names_ref[i], &names_ref[j]);
                    (NamePair::new(ids_ref[i], ids_ref[j]), score)
                })
            })
            .collect();

        debug!(
            types = ids.len(),
            pairs = scores.len(),
            "name similarity cache built"
        );

        NameSimilarityCache {
            scores,
            trimmed: ids.into_iter().zip(trimmed).collect(),
        }
    }
}

/// Read-only Jaro-Winkler similarities of trimmed type names.
pub struct NameSimilarityCache {
    scores: HashMap<NamePair, f64>,
    trimmed: HashMap<TypeId, String>,
}

impl NameSimilarityCache {
    /// Similarity in `[0, 1]`. Asking for a pair outside the initialization
    /// pass is a contract violation and fails.
    pub fn similarity(&self, a: TypeId, b: TypeId) -> Result<f64, ReconError> {
        self.scores
            .get(&NamePair::new(a, b))
            .copied()
            .ok_or(ReconError::NameSimilarityMiss(a, b))
    }

    pub fn trimmed_name(&self, id: TypeId) -> Option<&str> {
        self.trimmed.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

//! JSON snapshot of an extracted code base and its reconstructed
//! architecture, the input format of the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ReconError;
use crate::filter::BlacklistFilter;
use crate::graph::TypeGraph;
use crate::links::ComponentLink;
use crate::model::{Repository, RepositoryComponent, SystemModel};
use crate::relation::Grouping;
use crate::types::{AccessKind, TypeId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub accesses: Vec<AccessEntry>,
    /// Explicit candidate groupings. When empty, candidates are derived from
    /// the component links.
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
    #[serde(default)]
    pub components: Vec<RepositoryComponent>,
    #[serde(default)]
    pub system: Option<SystemModel>,
    #[serde(default)]
    pub links: Option<ComponentLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub inner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessEntry {
    pub from: String,
    pub to: String,
    #[serde(default = "default_access_kind")]
    pub kind: AccessKind,
}

fn default_access_kind() -> AccessKind {
    AccessKind::Call
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub name: String,
    pub types: Vec<String>,
}

/// A named grouping resolved against the type graph.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub types: Grouping,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse snapshot '{}'", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot = serde_json::from_str(json)?;
        Ok(snapshot)
    }

    /// Build the type graph. Qualified names must be unique and every access
    /// must reference declared types.
    pub fn build_graph(&self) -> Result<TypeGraph, ReconError> {
        let mut graph = TypeGraph::new();
        for entry in &self.types {
            let package = graph.ensure_package(&entry.package);
            let id = graph.add_type(package, &entry.name, entry.inner);
            let qualified_name = &graph.type_node(id).qualified_name;
            if graph.find_type(qualified_name) != Some(id) {
                return Err(ReconError::DuplicateType(qualified_name.clone()));
            }
        }
        for access in &self.accesses {
            let from = resolve(&graph, &access.from)?;
            let to = resolve(&graph, &access.to)?;
            graph.add_access(from, to, access.kind);
        }
        debug!(
            types = graph.type_count(),
            accesses = graph.access_count(),
            "type graph built"
        );
        Ok(graph)
    }

    /// Candidate groupings with blacklisted types removed.
    pub fn candidates(
        &self,
        graph: &TypeGraph,
        filter: &BlacklistFilter,
    ) -> Result<Vec<Candidate>, ReconError> {
        let mut candidates = Vec::new();
        if self.candidates.is_empty() {
            if let Some(root) = &self.links {
                for link in root.walk().into_iter().filter(|l| !l.is_system()) {
                    candidates.push(Candidate {
                        name: link.label(),
                        types: link.implementing_types(graph)?,
                    });
                }
            }
        } else {
            for entry in &self.candidates {
                let types = entry
                    .types
                    .iter()
                    .map(|name| resolve(graph, name))
                    .collect::<Result<Grouping, _>>()?;
                candidates.push(Candidate {
                    name: entry.name.clone(),
                    types,
                });
            }
        }

        for candidate in &mut candidates {
            candidate.types = filter.retain(graph, &candidate.types);
        }
        Ok(candidates)
    }

    /// Repository of the declared components. A component id declared twice
    /// is an error.
    pub fn repository(&self) -> Result<Repository, ReconError> {
        Repository::new(self.components.clone())
    }
}

fn resolve(graph: &TypeGraph, name: &str) -> Result<TypeId, ReconError> {
    graph
        .find_type(name)
        .ok_or_else(|| ReconError::UnknownType(name.to_string()))
}

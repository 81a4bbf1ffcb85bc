use std::collections::HashMap;

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;

use crate::types::{AccessEdge, AccessKind, Package, PackageId, TypeId, TypeNode};

/// Directed access graph of source types, with the package tree they live in.
///
/// Built once by the extraction stage and read-only afterwards.
#[derive(Debug)]
pub struct TypeGraph {
    graph: DiGraph<TypeNode, AccessEdge>,
    packages: Vec<Package>,
    package_index: HashMap<String, PackageId>,
    type_index: HashMap<String, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            packages: Vec::new(),
            package_index: HashMap::new(),
            type_index: HashMap::new(),
        }
    }

    /// Ensure the dotted package path exists, creating missing ancestors.
    /// Returns `None` for the empty (default) package.
    pub fn ensure_package(&mut self, qualified_name: &str) -> Option<PackageId> {
        let mut parent: Option<PackageId> = None;
        let mut path = String::new();
        for segment in qualified_name.split('.').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);

            let id = match self.package_index.get(&path) {
                Some(&id) => id,
                None => {
                    let id = PackageId(self.packages.len());
                    self.packages.push(Package {
                        name: segment.to_string(),
                        qualified_name: path.clone(),
                        parent,
                        children: Vec::new(),
                    });
                    if let Some(p) = parent {
                        self.packages[p.0].children.push(id);
                    }
                    self.package_index.insert(path.clone(), id);
                    id
                }
            };
            parent = Some(id);
        }
        parent
    }

    /// Add a type as a node. Every call creates a distinct node.
    pub fn add_type(&mut self, package: Option<PackageId>, name: &str, is_inner: bool) -> TypeId {
        let qualified_name = match package {
            Some(p) => format!("{}.{name}", self.packages[p.0].qualified_name),
            None => name.to_string(),
        };
        let node = TypeNode {
            name: name.to_string(),
            qualified_name: qualified_name.clone(),
            package,
            is_inner,
        };
        let id = TypeId(self.graph.add_node(node));
        self.type_index.entry(qualified_name).or_insert(id);
        id
    }

    /// Add a top-level type into the package with the given dotted name.
    pub fn add_type_in(&mut self, package: &str, name: &str) -> TypeId {
        let package = self.ensure_package(package);
        self.add_type(package, name, false)
    }

    /// Add an access as an edge. Parallel edges are kept.
    pub fn add_access(&mut self, from: TypeId, to: TypeId, kind: AccessKind) {
        self.graph.add_edge(from.0, to.0, AccessEdge { kind });
    }

    pub fn type_node(&self, id: TypeId) -> &TypeNode {
        &self.graph[id.0]
    }

    /// Look up a type by qualified name (first added wins).
    pub fn find_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.type_index.get(qualified_name).copied()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.graph.node_indices().map(TypeId)
    }

    /// Targets of every outgoing access of `id`, one entry per edge.
    pub fn accesses_from(&self, id: TypeId) -> impl Iterator<Item = (TypeId, &AccessEdge)> + '_ {
        self.graph
            .edges(id.0)
            .map(|e| (TypeId(e.target()), e.weight()))
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn find_package(&self, qualified_name: &str) -> Option<PackageId> {
        self.package_index.get(qualified_name).copied()
    }

    pub fn sub_packages(&self, id: PackageId) -> &[PackageId] {
        &self.packages[id.0].children
    }

    pub fn type_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn access_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_types_and_accesses() {
        let mut graph = TypeGraph::new();
        let a = graph.add_type_in("com.shop.order", "OrderService");
        let b = graph.add_type_in("com.shop.billing", "Invoice");

        graph.add_access(a, b, AccessKind::Call);
        graph.add_access(a, b, AccessKind::TypeReference);

        assert_eq!(graph.type_count(), 2);
        assert_eq!(graph.access_count(), 2);
        assert_eq!(graph.accesses_from(a).count(), 2);
        assert_eq!(graph.accesses_from(b).count(), 0);
        assert_eq!(
            graph.type_node(a).qualified_name,
            "com.shop.order.OrderService"
        );
    }

    #[test]
    fn test_package_tree_shared_ancestors() {
        let mut graph = TypeGraph::new();
        let order = graph.ensure_package("com.shop.order").unwrap();
        let billing = graph.ensure_package("com.shop.billing").unwrap();
        let shop = graph.find_package("com.shop").unwrap();

        assert_eq!(graph.package(order).parent(), Some(shop));
        assert_eq!(graph.package(billing).parent(), Some(shop));
        assert_eq!(graph.sub_packages(shop), &[order, billing]);
        assert_eq!(graph.package(order).name(), "order");
        assert_eq!(graph.package(order).qualified_name(), "com.shop.order");
    }

    #[test]
    fn test_default_package() {
        let mut graph = TypeGraph::new();
        assert!(graph.ensure_package("").is_none());
        let t = graph.add_type(None, "Main", false);
        assert_eq!(graph.type_node(t).qualified_name, "Main");
        assert_eq!(graph.find_type("Main"), Some(t));
    }

    #[test]
    fn test_same_name_types_are_distinct() {
        let mut graph = TypeGraph::new();
        let first = graph.add_type_in("a", "Dup");
        let second = graph.add_type_in("a", "Dup");
        assert_ne!(first, second);
        assert_eq!(graph.find_type("a.Dup"), Some(first));
    }
}

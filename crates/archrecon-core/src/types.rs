use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a type in the [`TypeGraph`](crate::graph::TypeGraph).
///
/// Two types with the same qualified name are still distinct if they were
/// added separately; identity is the node, not the name.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeId(pub(crate) NodeIndex);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

/// Identity of a package in the package tree.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageId(pub(crate) usize);

/// Kind of access between two types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Call,
    FieldAccess,
    Inheritance,
    Implementation,
    TypeReference,
    Instantiation,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Call => write!(f, "call"),
            AccessKind::FieldAccess => write!(f, "field access"),
            AccessKind::Inheritance => write!(f, "inheritance"),
            AccessKind::Implementation => write!(f, "implementation"),
            AccessKind::TypeReference => write!(f, "type reference"),
            AccessKind::Instantiation => write!(f, "instantiation"),
        }
    }
}

/// A source type (class, interface, enum) extracted upstream.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    pub qualified_name: String,
    pub package: Option<PackageId>,
    pub is_inner: bool,
}

/// Directed access from one type to another.
#[derive(Debug, Clone)]
pub struct AccessEdge {
    pub kind: AccessKind,
}

/// A package in the package tree. Children keep insertion order.
#[derive(Debug, Clone)]
pub struct Package {
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) parent: Option<PackageId>,
    pub(crate) children: Vec<PackageId>,
}

impl Package {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn parent(&self) -> Option<PackageId> {
        self.parent
    }
}

/// Direction of an interface binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Provided,
    Required,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Provided => write!(f, "provided"),
            Direction::Required => write!(f, "required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serde() {
        let direction: Direction = serde_json::from_str("\"required\"").unwrap();
        assert_eq!(direction, Direction::Required);
        assert_eq!(Direction::Provided.to_string(), "provided");
    }

    #[test]
    fn test_access_kind_serde() {
        let kind: AccessKind = serde_json::from_str("\"field_access\"").unwrap();
        assert_eq!(kind, AccessKind::FieldAccess);
        assert_eq!(kind.to_string(), "field access");
    }
}

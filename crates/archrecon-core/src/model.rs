use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::types::Direction;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a repository component.
    ComponentId
);
string_id!(
    /// Identifier of an interface type.
    InterfaceId
);
string_id!(RoleId);
string_id!(ContextId);

/// Concrete kind of a role. Only operation roles can be bound by the
/// interface port binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Operation,
    Infrastructure,
    Event,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Operation => write!(f, "operation"),
            RoleKind::Infrastructure => write!(f, "infrastructure"),
            RoleKind::Event => write!(f, "event"),
        }
    }
}

/// A provided or required binding of a component to an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub kind: RoleKind,
    pub interface: InterfaceId,
}

impl Role {
    pub fn operation(id: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(id),
            kind: RoleKind::Operation,
            interface: InterfaceId::new(interface),
        }
    }

    pub fn with_kind(mut self, kind: RoleKind) -> Self {
        self.kind = kind;
        self
    }
}

/// An instance of a component inside a composed structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyContext {
    pub id: ContextId,
    pub encapsulated: ComponentId,
}

impl AssemblyContext {
    pub fn new(id: impl Into<String>, encapsulated: &ComponentId) -> Self {
        Self {
            id: ContextId::new(id),
            encapsulated: encapsulated.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    #[default]
    Basic,
    Composite,
}

/// Anything that contains assembly contexts: composite components and the
/// system itself.
pub trait ComposedStructure {
    fn structure_name(&self) -> &str;

    fn assembly_contexts(&self) -> &[AssemblyContext];
}

/// A component of the architecture repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryComponent {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub provided_roles: Vec<Role>,
    #[serde(default)]
    pub required_roles: Vec<Role>,
    #[serde(default)]
    pub assembly_contexts: Vec<AssemblyContext>,
}

impl RepositoryComponent {
    pub fn basic(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(id),
            name: name.into(),
            kind: ComponentKind::Basic,
            provided_roles: Vec::new(),
            required_roles: Vec::new(),
            assembly_contexts: Vec::new(),
        }
    }

    pub fn composite(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ComponentKind::Composite,
            ..Self::basic(id, name)
        }
    }

    pub fn provides(mut self, role: Role) -> Self {
        self.provided_roles.push(role);
        self
    }

    pub fn requires(mut self, role: Role) -> Self {
        self.required_roles.push(role);
        self
    }

    pub fn with_context(mut self, context: AssemblyContext) -> Self {
        self.assembly_contexts.push(context);
        self
    }

    /// Roles of one direction, in declaration order.
    pub fn roles(&self, direction: Direction) -> &[Role] {
        match direction {
            Direction::Provided => &self.provided_roles,
            Direction::Required => &self.required_roles,
        }
    }
}

impl ComposedStructure for RepositoryComponent {
    fn structure_name(&self) -> &str {
        &self.name
    }

    fn assembly_contexts(&self) -> &[AssemblyContext] {
        &self.assembly_contexts
    }
}

/// The top-level composed structure of the reconstructed architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemModel {
    pub name: String,
    #[serde(default)]
    pub assembly_contexts: Vec<AssemblyContext>,
}

impl SystemModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assembly_contexts: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: AssemblyContext) -> Self {
        self.assembly_contexts.push(context);
        self
    }
}

impl ComposedStructure for SystemModel {
    fn structure_name(&self) -> &str {
        &self.name
    }

    fn assembly_contexts(&self) -> &[AssemblyContext] {
        &self.assembly_contexts
    }
}

/// All components of the architecture, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    components: Vec<RepositoryComponent>,
    index: HashMap<ComponentId, usize>,
}

impl Repository {
    pub fn new(components: Vec<RepositoryComponent>) -> Result<Self, ReconError> {
        let mut repository = Self::default();
        for component in components {
            repository.add(component)?;
        }
        Ok(repository)
    }

    /// Add a component. Ids are unique within the repository.
    pub fn add(&mut self, component: RepositoryComponent) -> Result<(), ReconError> {
        if self.index.contains_key(&component.id) {
            return Err(ReconError::DuplicateComponent(component.id));
        }
        self.index
            .insert(component.id.clone(), self.components.len());
        self.components.push(component);
        Ok(())
    }

    pub fn component(&self, id: &ComponentId) -> Option<&RepositoryComponent> {
        self.index.get(id).map(|&idx| &self.components[idx])
    }

    pub fn components(&self) -> &[RepositoryComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_lookup() {
        let repository = Repository::new(vec![
            RepositoryComponent::basic("orders", "Orders")
                .provides(Role::operation("orders.p.IOrders", "IOrders")),
            RepositoryComponent::basic("billing", "Billing"),
        ])
        .unwrap();
        assert_eq!(repository.len(), 2);

        let orders = repository.component(&ComponentId::new("orders")).unwrap();
        assert_eq!(orders.roles(Direction::Provided).len(), 1);
        assert!(orders.roles(Direction::Required).is_empty());
        assert!(repository.component(&ComponentId::new("shipping")).is_none());
    }

    #[test]
    fn test_duplicate_component_is_rejected() {
        let mut repository =
            Repository::new(vec![RepositoryComponent::composite("shop", "Shop")
                .with_context(AssemblyContext::new("ctx.orders", &ComponentId::new("orders")))])
            .unwrap();

        let err = repository
            .add(RepositoryComponent::basic("shop", "Shop"))
            .unwrap_err();
        assert!(matches!(err, ReconError::DuplicateComponent(id) if id.0 == "shop"));

        // The first declaration is kept untouched.
        let shop = repository.component(&ComponentId::new("shop")).unwrap();
        assert_eq!(shop.assembly_contexts.len(), 1);
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_component_deserializes_with_defaults() {
        let json = r#"{
            "id": "billing",
            "name": "Billing",
            "provided_roles": [
                {"id": "billing.p.IBilling", "kind": "operation", "interface": "IBilling"},
                {"id": "billing.p.Events", "kind": "event", "interface": "BillingEvents"}
            ]
        }"#;
        let component: RepositoryComponent = serde_json::from_str(json).unwrap();
        assert_eq!(component.kind, ComponentKind::Basic);
        assert_eq!(component.provided_roles[1].kind, RoleKind::Event);
        assert_eq!(component.provided_roles[0].interface, InterfaceId::new("IBilling"));
        assert!(component.assembly_contexts.is_empty());
    }
}

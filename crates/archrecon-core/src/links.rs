use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::graph::TypeGraph;
use crate::model::{ComponentId, InterfaceId};
use crate::relation::Grouping;
use crate::types::Direction;

/// Link between an interface and the source types realising or using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceLink {
    pub interface: InterfaceId,
    #[serde(default)]
    pub types: Vec<String>,
}

impl InterfaceLink {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: InterfaceId::new(interface),
            types: Vec::new(),
        }
    }
}

/// Node of the component hierarchy decided by the clustering search.
///
/// The root node has no component; it stands for the system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentLink {
    #[serde(default)]
    pub component: Option<ComponentId>,
    #[serde(default)]
    pub implementing_types: Vec<String>,
    #[serde(default)]
    pub sub_components: Vec<ComponentLink>,
    #[serde(default)]
    pub provided_interfaces: Vec<InterfaceLink>,
    #[serde(default)]
    pub required_interfaces: Vec<InterfaceLink>,
}

impl ComponentLink {
    pub fn system() -> Self {
        Self::default()
    }

    pub fn component(id: impl Into<String>) -> Self {
        Self {
            component: Some(ComponentId::new(id)),
            ..Self::default()
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implementing_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_sub_component(mut self, link: ComponentLink) -> Self {
        self.sub_components.push(link);
        self
    }

    pub fn provides(mut self, link: InterfaceLink) -> Self {
        self.provided_interfaces.push(link);
        self
    }

    pub fn requires(mut self, link: InterfaceLink) -> Self {
        self.required_interfaces.push(link);
        self
    }

    pub fn interfaces(&self, direction: Direction) -> &[InterfaceLink] {
        match direction {
            Direction::Provided => &self.provided_interfaces,
            Direction::Required => &self.required_interfaces,
        }
    }

    pub fn is_system(&self) -> bool {
        self.component.is_none()
    }

    /// Label for messages: the component id, or `<system>` at the root.
    pub fn label(&self) -> String {
        match &self.component {
            Some(id) => id.to_string(),
            None => "<system>".to_string(),
        }
    }

    /// Types implementing this component, including those of all nested
    /// sub-components.
    pub fn implementing_types(&self, graph: &TypeGraph) -> Result<Grouping, ReconError> {
        let mut types = Grouping::new();
        self.collect_types(graph, &mut types)?;
        Ok(types)
    }

    fn collect_types(&self, graph: &TypeGraph, out: &mut Grouping) -> Result<(), ReconError> {
        for name in &self.implementing_types {
            let id = graph
                .find_type(name)
                .ok_or_else(|| ReconError::UnknownType(name.clone()))?;
            out.insert(id);
        }
        for sub in &self.sub_components {
            sub.collect_types(graph, out)?;
        }
        Ok(())
    }

    /// Pre-order walk over this link and all nested links.
    pub fn walk(&self) -> Vec<&ComponentLink> {
        let mut out = vec![self];
        for sub in &self.sub_components {
            out.extend(sub.walk());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> TypeGraph {
        let mut graph = TypeGraph::new();
        graph.add_type_in("shop.order", "OrderService");
        graph.add_type_in("shop.order", "OrderRepository");
        graph.add_type_in("shop.billing", "InvoiceService");
        graph
    }

    #[test]
    fn test_implementing_types_are_collected_recursively() {
        let graph = sample_graph();
        let link = ComponentLink::component("shop")
            .with_sub_component(
                ComponentLink::component("orders")
                    .with_types(["shop.order.OrderService", "shop.order.OrderRepository"]),
            )
            .with_sub_component(
                ComponentLink::component("billing").with_types(["shop.billing.InvoiceService"]),
            );

        let types = link.implementing_types(&graph).unwrap();
        assert_eq!(types.len(), 3);
        assert_eq!(link.walk().len(), 3);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let graph = sample_graph();
        let link = ComponentLink::component("ghost").with_types(["shop.Ghost"]);
        let err = link.implementing_types(&graph).unwrap_err();
        assert!(matches!(err, ReconError::UnknownType(name) if name == "shop.Ghost"));
    }

    #[test]
    fn test_link_tree_deserializes() {
        let json = r#"{
            "sub_components": [
                {"component": "orders", "provided_interfaces": [{"interface": "IOrders"}]}
            ]
        }"#;
        let root: ComponentLink = serde_json::from_str(json).unwrap();
        assert!(root.is_system());
        assert_eq!(root.label(), "<system>");
        let orders = &root.sub_components[0];
        assert_eq!(orders.label(), "orders");
        assert_eq!(orders.interfaces(Direction::Provided).len(), 1);
        assert!(orders.interfaces(Direction::Required).is_empty());
    }
}

//! Binding of sub-component interfaces to the ports of their composite.
//!
//! Given one node of the component hierarchy, the binder decides which
//! interfaces of the direct sub-components have to appear at the boundary of
//! the enclosing structure, and which formal role and assembly context each
//! of them is attached to.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ReconError;
use crate::links::{ComponentLink, InterfaceLink};
use crate::model::{
    AssemblyContext, ComponentId, ComposedStructure, InterfaceId, Repository,
    RepositoryComponent, Role, RoleId, RoleKind, SystemModel,
};
use crate::types::Direction;

/// Which provided interfaces surface at the composite boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhibitPolicy {
    /// Every provided interface of every sub-component is exhibited, bound
    /// internally or not. Required interfaces are still filtered.
    #[default]
    ExhibitAllProvided,
    /// Only interfaces whose role is not already a connector endpoint are
    /// exhibited, in both directions.
    ExhibitUnbound,
}

impl ExhibitPolicy {
    pub fn from_flag(exhibit_all_provided: bool) -> Self {
        if exhibit_all_provided {
            ExhibitPolicy::ExhibitAllProvided
        } else {
            ExhibitPolicy::ExhibitUnbound
        }
    }

    fn keeps_all(self, direction: Direction) -> bool {
        self == ExhibitPolicy::ExhibitAllProvided && direction == Direction::Provided
    }
}

/// One interface of a sub-component that has to be exhibited (provided) or
/// forwarded (required) by the enclosing structure.
#[derive(Debug, Clone)]
pub struct SubComponentBinding<'a> {
    pub sub_component: &'a RepositoryComponent,
    pub interface_link: &'a InterfaceLink,
    pub role: &'a Role,
    /// Assembly context of the sub-component inside the enclosing structure.
    pub instance: Option<&'a AssemblyContext>,
}

/// A recoverable inconsistency found while binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum BindingIssue {
    NoMatchingRole {
        component: ComponentId,
        interface: InterfaceId,
        direction: Direction,
    },
    NoMatchingInstance {
        component: ComponentId,
        structure: String,
    },
    UnsupportedRoleKind {
        component: ComponentId,
        role: RoleId,
        kind: RoleKind,
    },
}

impl fmt::Display for BindingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingIssue::NoMatchingRole {
                component,
                interface,
                direction,
            } => write!(
                f,
                "no {direction} operation role for interface '{interface}' on component '{component}'"
            ),
            BindingIssue::NoMatchingInstance {
                component,
                structure,
            } => write!(
                f,
                "component '{component}' has no assembly context in '{structure}'"
            ),
            BindingIssue::UnsupportedRoleKind {
                component,
                role,
                kind,
            } => write!(
                f,
                "role '{role}' of component '{component}' has unsupported kind '{kind}'"
            ),
        }
    }
}

/// Result of one binder run: the bindings in link order plus every issue
/// met on the way.
#[derive(Debug, Clone)]
pub struct BindingReport<'a> {
    pub direction: Direction,
    pub bindings: Vec<SubComponentBinding<'a>>,
    pub issues: Vec<BindingIssue>,
}

impl BindingReport<'_> {
    fn record(&mut self, issue: BindingIssue) {
        warn!("{issue}");
        self.issues.push(issue);
    }
}

/// Resolves the boundary interfaces of composite components.
pub struct InterfacePortBinder<'a> {
    repository: &'a Repository,
    system: Option<&'a SystemModel>,
    policy: ExhibitPolicy,
}

impl<'a> InterfacePortBinder<'a> {
    pub fn new(repository: &'a Repository, system: Option<&'a SystemModel>) -> Self {
        Self {
            repository,
            system,
            policy: ExhibitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExhibitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ExhibitPolicy {
        self.policy
    }

    /// Collect the interfaces of `link`'s direct sub-components that the
    /// enclosing structure has to exhibit in `direction`.
    pub fn collect_non_bound_interfaces(
        &self,
        link: &'a ComponentLink,
        direction: Direction,
    ) -> Result<BindingReport<'a>, ReconError> {
        let outer = self.outer_structure(link)?;
        let keep_all = self.policy.keeps_all(direction);
        let endpoints = if keep_all {
            HashSet::new()
        } else {
            self.collect_connector_endpoints(outer)?
        };

        let mut report = BindingReport {
            direction,
            bindings: Vec::new(),
            issues: Vec::new(),
        };

        for sub_link in &link.sub_components {
            let sub_component = self.sub_component(link, sub_link)?;

            for interface_link in sub_link.interfaces(direction) {
                let Some(role) =
                    interface_port(sub_component, interface_link, direction, &mut report)
                else {
                    report.record(BindingIssue::NoMatchingRole {
                        component: sub_component.id.clone(),
                        interface: interface_link.interface.clone(),
                        direction,
                    });
                    continue;
                };

                if !keep_all && endpoints.contains(&(&sub_component.id, &role.id)) {
                    debug!(
                        role = %role.id,
                        component = %sub_component.id,
                        "role bound by a connector, not exhibited"
                    );
                    continue;
                }

                let instance = sub_component_instance(outer, sub_component);
                if instance.is_none() {
                    report.record(BindingIssue::NoMatchingInstance {
                        component: sub_component.id.clone(),
                        structure: outer.structure_name().to_string(),
                    });
                }

                report.bindings.push(SubComponentBinding {
                    sub_component,
                    interface_link,
                    role,
                    instance,
                });
            }
        }

        debug!(
            component = %link.label(),
            %direction,
            bindings = report.bindings.len(),
            issues = report.issues.len(),
            "interfaces collected"
        );
        Ok(report)
    }

    /// The composite component of `link`, or the system at the root.
    fn outer_structure(
        &self,
        link: &ComponentLink,
    ) -> Result<&'a dyn ComposedStructure, ReconError> {
        match &link.component {
            Some(id) => {
                let component = self
                    .repository
                    .component(id)
                    .ok_or_else(|| ReconError::UnknownComponent(id.clone()))?;
                Ok(component)
            }
            None => match self.system {
                Some(system) => Ok(system),
                None => {
                    warn!("no system model, system-level bindings carry no instance");
                    Ok(&DETACHED_SYSTEM)
                }
            },
        }
    }

    fn sub_component(
        &self,
        parent: &ComponentLink,
        sub_link: &ComponentLink,
    ) -> Result<&'a RepositoryComponent, ReconError> {
        let id = sub_link
            .component
            .as_ref()
            .ok_or_else(|| ReconError::MissingComponent {
                parent: parent.label(),
            })?;
        self.repository
            .component(id)
            .ok_or_else(|| ReconError::UnknownComponent(id.clone()))
    }

    /// Every role of every component instantiated directly in `outer`,
    /// keyed by its owning component. Instances nested deeper are not
    /// visited.
    fn collect_connector_endpoints(
        &self,
        outer: &'a dyn ComposedStructure,
    ) -> Result<HashSet<Endpoint<'a>>, ReconError> {
        let mut endpoints = HashSet::new();
        for context in outer.assembly_contexts() {
            let component = self
                .repository
                .component(&context.encapsulated)
                .ok_or_else(|| ReconError::UnknownComponent(context.encapsulated.clone()))?;
            let roles = component.provided_roles.iter().chain(&component.required_roles);
            endpoints.extend(roles.map(|r| (&component.id, &r.id)));
        }
        Ok(endpoints)
    }
}

/// A connector endpoint: role ids are only unique within their component.
type Endpoint<'a> = (&'a ComponentId, &'a RoleId);

/// Stand-in outer structure for a system-level link when no system model is
/// known. It has no assembly contexts.
struct DetachedSystem;

static DETACHED_SYSTEM: DetachedSystem = DetachedSystem;

impl ComposedStructure for DetachedSystem {
    fn structure_name(&self) -> &str {
        "<system>"
    }

    fn assembly_contexts(&self) -> &[AssemblyContext] {
        &[]
    }
}

/// First operation role of `direction` typed by the link's interface.
///
/// Every non-operation role scanned before the match is reported, whatever
/// its interface.
fn interface_port<'a>(
    component: &'a RepositoryComponent,
    link: &InterfaceLink,
    direction: Direction,
    report: &mut BindingReport<'_>,
) -> Option<&'a Role> {
    for role in component.roles(direction) {
        if role.kind != RoleKind::Operation {
            report.record(BindingIssue::UnsupportedRoleKind {
                component: component.id.clone(),
                role: role.id.clone(),
                kind: role.kind,
            });
            continue;
        }
        if role.interface == link.interface {
            return Some(role);
        }
    }
    None
}

fn sub_component_instance<'a>(
    outer: &'a dyn ComposedStructure,
    component: &RepositoryComponent,
) -> Option<&'a AssemblyContext> {
    outer
        .assembly_contexts()
        .iter()
        .find(|ctx| ctx.encapsulated == component.id)
}

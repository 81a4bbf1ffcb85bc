pub mod binder;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod links;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod relation;
pub mod similarity;
pub mod snapshot;
pub mod types;

pub use binder::{BindingIssue, BindingReport, ExhibitPolicy, InterfacePortBinder};
pub use config::Config;
pub use error::ReconError;
pub use graph::TypeGraph;
pub use links::{ComponentLink, InterfaceLink};
pub use metrics::{Metric, MetricContext, MetricRegistry};
pub use relation::{ClusteringRelation, Grouping, MetricId};
pub use snapshot::Snapshot;
pub use types::*;

use thiserror::Error;

use crate::model::ComponentId;
use crate::relation::MetricId;
use crate::types::TypeId;

/// Contract violations between the phases of a reconstruction run.
///
/// Recoverable binding problems are not errors; they are reported as
/// [`BindingIssue`](crate::binder::BindingIssue)s.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("name similarity of {0} and {1} was not precomputed")]
    NameSimilarityMiss(TypeId, TypeId),

    #[error("metric '{0}' is already registered")]
    DuplicateMetric(MetricId),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("score for metric '{0}' is already set on this relation")]
    ScoreAlreadySet(MetricId),

    #[error("metric '{0}' produced a non-finite score")]
    NonFiniteScore(MetricId),

    #[error("component '{0}' is not part of the repository")]
    UnknownComponent(ComponentId),

    #[error("sub-component link below '{parent}' has no component")]
    MissingComponent { parent: String },

    #[error("type '{0}' is not part of the type graph")]
    UnknownType(String),

    #[error("type '{0}' is declared more than once")]
    DuplicateType(String),

    #[error("component '{0}' is declared more than once")]
    DuplicateComponent(ComponentId),
}

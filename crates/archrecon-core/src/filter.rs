use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, trace};

use crate::graph::TypeGraph;
use crate::relation::Grouping;

/// Keeps types whose qualified name matches a blacklist pattern out of
/// candidate groupings.
#[derive(Debug, Clone, Default)]
pub struct BlacklistFilter {
    pattern: Option<Regex>,
}

impl BlacklistFilter {
    /// Compile all patterns into one case-insensitive regex that has to match
    /// the whole qualified name. An empty list blocks nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let joined = patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i)^(?:{joined})$"))
            .with_context(|| format!("invalid blacklist pattern '{joined}'"))?;
        debug!(pattern = %pattern, "blacklist filter initialised");
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Whether a type with this qualified name may enter a grouping.
    pub fn passes(&self, qualified_name: &str) -> bool {
        match &self.pattern {
            Some(pattern) if pattern.is_match(qualified_name) => {
                trace!(qualified_name, "blacklist filter matches");
                false
            }
            _ => true,
        }
    }

    /// The members of `grouping` that pass the filter.
    pub fn retain(&self, graph: &TypeGraph, grouping: &Grouping) -> Grouping {
        grouping
            .iter()
            .copied()
            .filter(|&id| self.passes(&graph.type_node(id).qualified_name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blacklist_passes_everything() {
        let filter = BlacklistFilter::new::<String>(&[]).unwrap();
        assert!(filter.passes("java.lang.String"));
    }

    #[test]
    fn test_patterns_match_whole_name_case_insensitively() {
        let filter = BlacklistFilter::new(&["java\\..*", "org\\.junit\\..*"]).unwrap();
        assert!(!filter.passes("java.util.List"));
        assert!(!filter.passes("JAVA.util.List"));
        assert!(!filter.passes("org.junit.Assert"));
        assert!(filter.passes("com.shop.java.Adapter"));
        assert!(filter.passes("javax.inject.Inject"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = BlacklistFilter::new(&["(unclosed"]).unwrap_err();
        assert!(format!("{err:#}").contains("invalid blacklist pattern"));
    }

    #[test]
    fn test_retain_drops_blacklisted_members() {
        let mut graph = TypeGraph::new();
        let service = graph.add_type_in("com.shop", "OrderService");
        let list = graph.add_type_in("java.util", "List");
        let grouping: Grouping = [service, list].into_iter().collect();

        let filter = BlacklistFilter::new(&["java\\..*"]).unwrap();
        let kept = filter.retain(&graph, &grouping);
        assert_eq!(kept.into_iter().collect::<Vec<_>>(), vec![service]);
    }
}

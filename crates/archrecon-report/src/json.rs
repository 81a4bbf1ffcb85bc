use serde::Serialize;

use archrecon_core::pipeline::{HierarchyBinding, ScoringResult};

/// Format candidate scores as JSON.
pub fn format_scores(result: &ScoringResult, compact: bool) -> serde_json::Result<String> {
    to_json(result, compact)
}

/// Format the binding of a component hierarchy as JSON, with pass/fail
/// metadata on the issues found.
pub fn format_bindings(result: &HierarchyBinding, compact: bool) -> serde_json::Result<String> {
    let output = BindOutput {
        result,
        summary: BindSummary {
            binding_count: result.bindings.len(),
            issue_count: result.issues.len(),
            clean: result.issues.is_empty(),
        },
    };
    to_json(&output, compact)
}

#[derive(Debug, Serialize)]
pub struct BindOutput<'a> {
    #[serde(flatten)]
    pub result: &'a HierarchyBinding,
    pub summary: BindSummary,
}

#[derive(Debug, Serialize)]
pub struct BindSummary {
    pub binding_count: usize,
    pub issue_count: usize,
    pub clean: bool,
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

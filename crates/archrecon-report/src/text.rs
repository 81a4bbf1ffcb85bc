use colored::Colorize;

use archrecon_core::pipeline::{HierarchyBinding, ScoringResult};
use archrecon_core::relation::MetricId;

/// Format candidate scores for terminal output.
pub fn format_scores(result: &ScoringResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "archrecon - Candidate Scores".bold()));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    out.push_str(&format!(
        "\n{}: {} metrics, {} directed pairs\n",
        "Summary".bold(),
        result.metrics.len(),
        result.pairs.len(),
    ));

    if result.pairs.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            "Fewer than two candidates, nothing to score.".yellow()
        ));
        out.push('\n');
        return out;
    }

    let width = result
        .metrics
        .iter()
        .map(|id| short_name(*id).len())
        .max()
        .unwrap_or(0);

    for pair in &result.pairs {
        out.push_str(&format!(
            "\n  {} -> {}\n",
            pair.source.cyan(),
            pair.target.cyan()
        ));
        for (id, score) in &pair.scores {
            out.push_str(&format!(
                "    {:<width$}  {}\n",
                short_name(*id),
                format_score(*score),
            ));
        }
    }

    out.push('\n');
    out
}

/// Format the binding of a component hierarchy for terminal output.
pub fn format_bindings(result: &HierarchyBinding) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "archrecon - Interface Port Binding".bold()));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    let mut current: Option<(&str, String)> = None;
    for binding in &result.bindings {
        let key = (binding.composite.as_str(), binding.direction.to_string());
        if current.as_ref() != Some(&key) {
            out.push_str(&format!(
                "\n{} ({})\n",
                binding.composite.bold(),
                key.1
            ));
            current = Some(key);
        }
        let instance = match &binding.instance {
            Some(ctx) => ctx.to_string(),
            None => "no instance".dimmed().to_string(),
        };
        out.push_str(&format!(
            "  {} via {} [{}] @ {}\n",
            binding.interface, binding.role, binding.sub_component, instance
        ));
    }

    if result.bindings.is_empty() {
        out.push_str(&format!("\n{}\n", "No interfaces to exhibit.".yellow()));
    }

    if result.issues.is_empty() {
        out.push_str(&format!("\n{}\n", "No binding issues found!".green().bold()));
    } else {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Issues".yellow().bold(),
            result.issues.len(),
            "-".repeat(40),
        ));
        for record in &result.issues {
            out.push_str(&format!(
                "  {} [{} {}] {}\n",
                "WARN".yellow().bold(),
                record.composite,
                record.direction,
                record.issue,
            ));
        }
    }

    out.push('\n');
    out
}

fn short_name(id: MetricId) -> &'static str {
    id.as_str().rsplit('.').next().unwrap_or(id.as_str())
}

fn format_score(score: f64) -> String {
    let text = format!("{score:.3}");
    if !(0.0..=1.0).contains(&score) {
        return text;
    }
    if score >= 0.8 {
        text.green().to_string()
    } else if score >= 0.5 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archrecon_core::binder::BindingIssue;
    use archrecon_core::metrics::{EFFERENT_COUPLING, NAME_RESEMBLANCE};
    use archrecon_core::model::{ComponentId, ContextId, InterfaceId, RoleId};
    use archrecon_core::pipeline::{BindingRecord, CandidateScores, IssueRecord};
    use archrecon_core::Direction;

    #[test]
    fn test_short_name_strips_namespace() {
        assert_eq!(short_name(EFFERENT_COUPLING), "EfferentCoupling");
        assert_eq!(short_name(MetricId::new("Plain")), "Plain");
    }

    #[test]
    fn test_format_scores_lists_every_pair() {
        let result = ScoringResult {
            metrics: vec![EFFERENT_COUPLING, NAME_RESEMBLANCE],
            pairs: vec![CandidateScores {
                source: "orders".to_string(),
                target: "billing".to_string(),
                scores: [(EFFERENT_COUPLING, 4.0), (NAME_RESEMBLANCE, 0.25)]
                    .into_iter()
                    .collect(),
            }],
        };
        let text = format_scores(&result);
        assert!(text.contains("orders"));
        assert!(text.contains("EfferentCoupling"));
        assert!(text.contains("4.000"));
        assert!(text.contains("0.250"));
    }

    #[test]
    fn test_format_bindings_groups_and_lists_issues() {
        let binding = |direction, interface: &str, instance: Option<&str>| BindingRecord {
            composite: "shop".to_string(),
            direction,
            sub_component: ComponentId::new("orders"),
            interface: InterfaceId::new(interface),
            role: RoleId::new(format!("orders.{interface}")),
            instance: instance.map(ContextId::new),
        };
        let result = HierarchyBinding {
            bindings: vec![
                binding(Direction::Provided, "IOrders", Some("ctx.orders")),
                binding(Direction::Required, "IPayments", None),
            ],
            issues: vec![IssueRecord {
                composite: "shop".to_string(),
                direction: Direction::Required,
                issue: BindingIssue::NoMatchingInstance {
                    component: ComponentId::new("orders"),
                    structure: "Shop".to_string(),
                },
            }],
        };
        let text = format_bindings(&result);
        assert!(text.contains("(provided)"));
        assert!(text.contains("(required)"));
        assert!(text.contains("IOrders via orders.IOrders [orders] @ ctx.orders"));
        assert!(text.contains("has no assembly context in 'Shop'"));
    }
}

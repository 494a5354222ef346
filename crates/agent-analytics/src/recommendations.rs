//! Heuristic recommendations derived from the aggregates.
//!
//! Rules run in a fixed order and each contributes at most one message.

use crate::aggregations::{AgentTypeBreakdown, ResumePatterns, Summary};
use agent_core::config::Thresholds;

/// The reported aggregates a rule may look at.
pub struct RuleInput<'a> {
    pub summary: &'a Summary,
    pub agent_types: &'a AgentTypeBreakdown,
    pub resumes: &'a ResumePatterns,
    pub total_records: usize,
}

/// A named recommendation rule.
pub struct Rule {
    pub name: &'static str,
    check: fn(&RuleInput<'_>, &Thresholds) -> Option<String>,
}

impl Rule {
    pub fn evaluate(&self, input: &RuleInput<'_>, thresholds: &Thresholds) -> Option<String> {
        (self.check)(input, thresholds)
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "low_success_rate",
        check: low_success_rate,
    },
    Rule {
        name: "high_success_rate",
        check: high_success_rate,
    },
    Rule {
        name: "high_avg_cost",
        check: high_avg_cost,
    },
    Rule {
        name: "high_avg_resumes",
        check: high_avg_resumes,
    },
    Rule {
        name: "agent_type_template",
        check: agent_type_template,
    },
    Rule {
        name: "limited_history",
        check: limited_history,
    },
];

/// Evaluate every rule in order and collect the messages that fired.
pub fn recommend(input: &RuleInput<'_>, thresholds: &Thresholds) -> Vec<String> {
    RULES
        .iter()
        .filter_map(|rule| {
            let message = rule.evaluate(input, thresholds)?;
            tracing::debug!("Recommendation rule fired: {}", rule.name);
            Some(message)
        })
        .collect()
}

fn low_success_rate(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    (input.summary.success_rate < t.low_success_rate).then(|| {
        format!(
            "⚠️ Success rate is below {:.0}%. Consider using plan mode more often and providing more specific task descriptions.",
            t.low_success_rate * 100.0
        )
    })
}

// Only reachable when the low rule did not fire, as long as low <= high.
fn high_success_rate(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    let rate = input.summary.success_rate;
    (rate >= t.high_success_rate && rate >= t.low_success_rate).then(|| {
        format!(
            "✅ High success rate (>{:.0}%). Current approach is working well.",
            t.high_success_rate * 100.0
        )
    })
}

fn high_avg_cost(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    let avg = input.summary.avg_cost_per_agent;
    (avg > t.high_avg_cost_usd).then(|| {
        format!(
            "💰 Average cost per agent is ${:.2}. Consider breaking complex tasks into smaller chunks.",
            avg
        )
    })
}

fn high_avg_resumes(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    let avg = input.resumes.avg_resumes_per_session;
    (avg > t.high_avg_resumes).then(|| {
        format!(
            "🔄 High resume count (avg: {:.1}). More specific initial descriptions may reduce iterations.",
            avg
        )
    })
}

fn agent_type_template(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    if input.agent_types.len() <= t.max_agent_types {
        return None;
    }
    let (name, stats) = input.agent_types.most_executed()?;
    Some(format!(
        "📊 Most generated agent type: {} ({} times). Consider creating a template.",
        name, stats.count
    ))
}

fn limited_history(input: &RuleInput<'_>, t: &Thresholds) -> Option<String> {
    (input.total_records < t.min_history_records).then(|| {
        format!(
            "📈 Limited history. Generate {}+ agents for better pattern recognition.",
            t.min_history_records
        )
    })
}

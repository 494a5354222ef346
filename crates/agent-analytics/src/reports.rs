//! Report rendering for an [`Analysis`].
//!
//! JSON output is the machine contract; the text layout is for people and
//! carries no stability promise.

use crate::aggregations::{AgentTypeBreakdown, Analysis, CostPatterns, HistoryStatus, Summary};
use crate::stats::round_to;
use agent_core::config::OutputFormat;
use serde::Serialize;

/// Which document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Everything, including outcomes, resumes and recommendations.
    Full,
    /// Summary, agent types and cost patterns only.
    Basic,
}

/// Summary block of the basic document.
#[derive(Debug, Clone, Serialize)]
pub struct BasicSummary {
    pub total_sessions: usize,
    #[serde(flatten)]
    pub summary: Summary,
}

/// The reduced document printed by `stats`.
#[derive(Debug, Clone, Serialize)]
pub struct BasicStats<'a> {
    pub status: HistoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    pub summary: BasicSummary,
    pub agent_types: AgentTypeBreakdown,
    pub cost_patterns: &'a CostPatterns,
}

impl<'a> BasicStats<'a> {
    /// Success rates are rounded to two decimals in this view.
    pub fn from_analysis(analysis: &'a Analysis) -> Self {
        let mut summary = analysis.summary.clone();
        summary.success_rate = round_to(summary.success_rate, 2);
        Self {
            status: analysis.status,
            message: analysis.message.as_deref(),
            summary: BasicSummary {
                total_sessions: analysis.total_records,
                summary,
            },
            agent_types: analysis.agent_types.with_rounded_rates(),
            cost_patterns: &analysis.cost_patterns,
        }
    }
}

/// Report generator for JSON and text output.
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn render(
        analysis: &Analysis,
        kind: ReportKind,
        format: OutputFormat,
    ) -> agent_core::Result<String> {
        match (format, kind) {
            (OutputFormat::Json, ReportKind::Full) => Self::json_report(analysis),
            (OutputFormat::Json, ReportKind::Basic) => Self::json_stats(analysis),
            (OutputFormat::Text, ReportKind::Full) => Ok(Self::text_report(analysis)),
            (OutputFormat::Text, ReportKind::Basic) => Ok(Self::text_stats(analysis)),
        }
    }

    /// Pretty-printed full document.
    pub fn json_report(analysis: &Analysis) -> agent_core::Result<String> {
        Ok(serde_json::to_string_pretty(analysis)?)
    }

    /// Pretty-printed basic document.
    pub fn json_stats(analysis: &Analysis) -> agent_core::Result<String> {
        Ok(serde_json::to_string_pretty(&BasicStats::from_analysis(
            analysis,
        ))?)
    }

    /// Full multi-section text report.
    pub fn text_report(analysis: &Analysis) -> String {
        let mut report = String::new();
        report.push_str("# Agent Experience Report\n\n");
        Self::push_status(&mut report, analysis);
        Self::push_summary(&mut report, analysis);
        Self::push_agent_types(&mut report, &analysis.agent_types);
        Self::push_costs(&mut report, &analysis.cost_patterns);

        // Session outcomes.
        let metrics = &analysis.success_metrics;
        report.push_str("## Session Outcomes\n\n");
        report.push_str(&format!("- **Sessions:** {}\n", metrics.total_attempts));
        report.push_str(&format!(
            "- **Successful:** {} ({})\n",
            metrics.successful,
            format_percent(metrics.success_rate)
        ));
        report.push_str(&format!(
            "- **Failed:** {} ({})\n\n",
            metrics.failed,
            format_percent(metrics.failure_rate)
        ));

        // Resume patterns.
        let resumes = &analysis.resume_patterns;
        report.push_str("## Resume Patterns\n\n");
        report.push_str(&format!("- **Total Resumes:** {}\n", resumes.total_resumes));
        report.push_str(&format!(
            "- **Sessions With Resumes:** {}\n",
            resumes.sessions_with_resumes
        ));
        report.push_str(&format!(
            "- **Avg Per Session:** {:.1}\n",
            resumes.avg_resumes_per_session
        ));
        if let Some(max) = resumes.max_resumes {
            report.push_str(&format!("- **Max:** {}\n", max));
        }
        if let Some(dist) = &resumes.distribution {
            report.push_str(&format!(
                "- **Distribution:** 0: {}, 1: {}, 2+: {}\n",
                dist.zero_resumes, dist.one_resume, dist.two_or_more
            ));
        }
        report.push('\n');

        report.push_str("## Recommendations\n\n");
        if analysis.recommendations.is_empty() {
            report.push_str("(none)\n");
        } else {
            for rec in &analysis.recommendations {
                report.push_str(&format!("- {}\n", rec));
            }
        }

        report
    }

    /// Basic text report: summary, agent types and costs.
    pub fn text_stats(analysis: &Analysis) -> String {
        let mut report = String::new();
        report.push_str("# Agent Experience Stats\n\n");
        Self::push_status(&mut report, analysis);
        Self::push_summary(&mut report, analysis);
        Self::push_agent_types(&mut report, &analysis.agent_types);
        Self::push_costs(&mut report, &analysis.cost_patterns);
        // Trailing blank line from the last section is not wanted here.
        while report.ends_with("\n\n") {
            report.pop();
        }
        report
    }

    fn push_status(report: &mut String, analysis: &Analysis) {
        if let Some(message) = &analysis.message {
            report.push_str(&format!("{}\n\n", message));
        }
    }

    fn push_summary(report: &mut String, analysis: &Analysis) {
        let s = &analysis.summary;
        report.push_str("## Summary\n\n");
        report.push_str(&format!("- **Records:** {}\n", analysis.total_records));
        report.push_str(&format!("- **Executions:** {}\n", s.executions));
        report.push_str(&format!("- **Completed:** {}\n", s.completed));
        report.push_str(&format!("- **Failed:** {}\n", s.failed));
        report.push_str(&format!(
            "- **Success Rate:** {}\n",
            format_percent(s.success_rate)
        ));
        report.push_str(&format!(
            "- **Total Cost:** {}\n",
            format_usd(s.total_cost_usd)
        ));
        report.push_str(&format!(
            "- **Avg Cost Per Agent:** {}\n\n",
            format_usd(s.avg_cost_per_agent)
        ));
    }

    fn push_agent_types(report: &mut String, agent_types: &AgentTypeBreakdown) {
        report.push_str("## Agent Types\n\n");
        if agent_types.is_empty() {
            report.push_str("(none)\n\n");
            return;
        }
        report.push_str("| Type | Runs | Completed | Failed | Success | Avg Cost | Median |\n");
        report.push_str("|------|------|-----------|--------|---------|----------|--------|\n");
        for (name, stats) in agent_types.iter() {
            report.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                name,
                stats.count,
                stats.success,
                stats.failed,
                format_percent(stats.success_rate),
                format_usd(stats.avg_cost),
                format_usd(stats.median_cost),
            ));
        }
        report.push('\n');
    }

    fn push_costs(report: &mut String, costs: &CostPatterns) {
        report.push_str("## Costs By Action\n\n");
        if costs.by_action.is_empty() {
            report.push_str("(none)\n\n");
        } else {
            for (action, stats) in costs.by_action.iter() {
                report.push_str(&format!(
                    "- `{}`: {} costed, total {}, avg {}, min {}, max {}\n",
                    action,
                    stats.count,
                    format_usd(stats.total),
                    format_usd(stats.avg),
                    format_usd(stats.min),
                    format_usd(stats.max),
                ));
            }
            report.push('\n');
        }

        report.push_str("## Cost Categories\n\n");
        match &costs.categories {
            Some(c) => {
                for (label, category) in [
                    ("simple", &c.simple),
                    ("medium", &c.medium),
                    ("complex", &c.complex),
                ] {
                    report.push_str(&format!(
                        "- **{}** ({}): {}\n",
                        label, category.range, category.count
                    ));
                }
            }
            None => report.push_str("(none)\n"),
        }
        report.push('\n');
    }
}

/// Format a dollar amount with two decimals.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a 0..1 ratio as a percentage with one decimal.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::Analytics;
    use agent_core::{Action, Record};

    fn sample() -> Vec<Record> {
        vec![
            Record::new(Action::Execute)
                .with_agent_type("builder")
                .with_session("s1")
                .with_cost(0.10),
            Record::new(Action::Resume).with_session("s1"),
            Record::new(Action::Complete)
                .with_agent_type("builder")
                .with_session("s1"),
            Record::new(Action::Execute)
                .with_agent_type("builder")
                .with_session("s2")
                .with_cost(0.20),
            Record::new(Action::Execute)
                .with_agent_type("tester")
                .with_session("s3")
                .with_cost(0.45),
            Record::new(Action::Failed)
                .with_agent_type("tester")
                .with_session("s3"),
        ]
    }

    fn analyzed() -> Analysis {
        Analytics::default().analyze(&sample())
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_usd(0.3), "$0.30");
        assert_eq!(format_usd(12.346), "$12.35");
        assert_eq!(format_percent(0.5), "50.0%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
    }

    #[test]
    fn test_json_report_full_shape() {
        let json = ReportGenerator::json_report(&analyzed()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "analyzed");
        assert_eq!(value["total_sessions"], 6);
        assert_eq!(value["summary"]["total_executions"], 3);
        assert_eq!(value["agent_types"]["builder"]["count"], 2);
        assert_eq!(value["cost_patterns"]["execute"]["count"], 3);
        assert_eq!(value["cost_patterns"]["categories"]["medium"]["count"], 1);
        assert_eq!(value["success_metrics"]["total_attempts"], 2);
        assert_eq!(value["resume_patterns"]["distribution"]["1_resume"], 1);
        assert!(value["recommendations"].is_array());
        // Pretty printed.
        assert!(json.contains("\n  \"status\""));
    }

    #[test]
    fn test_json_report_key_order() {
        let json = ReportGenerator::json_report(&analyzed()).unwrap();
        let positions: Vec<usize> = [
            "\"status\"",
            "\"total_sessions\"",
            "\"summary\"",
            "\"agent_types\"",
            "\"cost_patterns\"",
            "\"success_metrics\"",
            "\"resume_patterns\"",
            "\"recommendations\"",
        ]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_json_stats_shape() {
        let json = ReportGenerator::json_stats(&analyzed()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total_sessions"], 6);
        assert_eq!(value["summary"]["total_executions"], 3);
        // One completion over three executions, rounded.
        assert_eq!(value["summary"]["success_rate"], 0.33);
        assert_eq!(value["agent_types"]["builder"]["success_rate"], 0.5);
        assert!(value.get("recommendations").is_none());
        assert!(value.get("resume_patterns").is_none());
        assert!(value.get("success_metrics").is_none());
        assert!(value.get("total_sessions").is_none());
    }

    #[test]
    fn test_full_report_keeps_unrounded_rate() {
        let json = ReportGenerator::json_report(&analyzed()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rate = value["summary"]["success_rate"].as_f64().unwrap();
        assert!((rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_history_json() {
        let analysis = Analysis::no_history();
        let value: serde_json::Value =
            serde_json::from_str(&ReportGenerator::json_report(&analysis).unwrap()).unwrap();
        assert_eq!(value["status"], "no_history");
        assert_eq!(value["message"], "No session history found");
        assert_eq!(value["total_sessions"], 0);
        assert_eq!(value["summary"]["total_cost_usd"], 0.0);
        assert_eq!(value["agent_types"], serde_json::json!({}));
        assert_eq!(value["cost_patterns"], serde_json::json!({}));
        assert_eq!(value["resume_patterns"]["total_resumes"], 0);
        assert_eq!(value["recommendations"], serde_json::json!([]));

        let stats: serde_json::Value =
            serde_json::from_str(&ReportGenerator::json_stats(&analysis).unwrap()).unwrap();
        assert_eq!(stats["status"], "no_history");
        assert_eq!(stats["message"], "No session history found");
        assert_eq!(stats["summary"]["total_sessions"], 0);
    }

    #[test]
    fn test_text_report_sections() {
        let report = ReportGenerator::text_report(&analyzed());
        assert!(report.starts_with("# Agent Experience Report"));
        for section in [
            "## Summary",
            "## Agent Types",
            "## Costs By Action",
            "## Cost Categories",
            "## Session Outcomes",
            "## Resume Patterns",
            "## Recommendations",
        ] {
            assert!(report.contains(section), "missing {}", section);
        }
        assert!(report.contains("| builder | 2 | 1 | 0 | 50.0% | $0.15 | $0.15 |"));
        assert!(report.contains("- **medium** ($0.15-$0.40): 1"));
        assert!(report.contains("- **Total Cost:** $0.75"));
    }

    #[test]
    fn test_text_stats_is_reduced() {
        let report = ReportGenerator::text_stats(&analyzed());
        assert!(report.starts_with("# Agent Experience Stats"));
        assert!(report.contains("## Summary"));
        assert!(report.contains("## Cost Categories"));
        assert!(!report.contains("## Recommendations"));
        assert!(!report.contains("## Resume Patterns"));
        assert!(!report.ends_with("\n\n"));
    }

    #[test]
    fn test_empty_text_report() {
        let report = ReportGenerator::text_report(&Analysis::no_history());
        assert!(report.contains("No session history found"));
        assert!(report.contains("(none)"));
        assert!(report.contains("- **Records:** 0"));
        assert!(!report.contains("Distribution"));
    }

    #[test]
    fn test_render_dispatch() {
        let analysis = analyzed();
        let text = ReportGenerator::render(&analysis, ReportKind::Full, OutputFormat::Text).unwrap();
        assert!(text.contains("## Recommendations"));

        let json = ReportGenerator::render(&analysis, ReportKind::Basic, OutputFormat::Json).unwrap();
        assert!(json.trim_start().starts_with('{'));
    }
}

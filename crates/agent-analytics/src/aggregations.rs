//! Aggregations over the sessions log.
//!
//! Each aggregator borrows the full record list and derives a fresh value.
//! None of them mutate the records or depend on one another, so they can run
//! in any order.

use crate::recommendations::{self, RuleInput};
use crate::stats::{ratio, round_to, CostStats, OrderedGroups};
use agent_core::config::{
    AppConfig, CostCategoryBounds, Thresholds, SIMPLE_COST_LABEL_FLOOR_USD,
};
use agent_core::{Action, Record};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

pub const NO_HISTORY_MESSAGE: &str = "No session history found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Analyzed,
    NoHistory,
}

/// Headline totals and rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "total_executions")]
    pub executions: usize,
    pub completed: usize,
    pub failed: usize,
    /// completed / executions, 0 when nothing was executed.
    pub success_rate: f64,
    pub total_cost_usd: f64,
    pub avg_cost_per_agent: f64,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        let executions = count_action(records, &Action::Execute);
        let completed = count_action(records, &Action::Complete);
        let failed = count_action(records, &Action::Failed);
        let total_cost: f64 = records.iter().filter_map(|r| r.cost_usd).sum();

        let avg_cost_per_agent = if completed == 0 {
            0.0
        } else {
            round_to(total_cost / completed as f64, 2)
        };

        Self {
            executions,
            completed,
            failed,
            success_rate: ratio(completed, executions),
            total_cost_usd: round_to(total_cost, 2),
            avg_cost_per_agent,
        }
    }
}

/// Totals and cost statistics for one agent type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentTypeStats {
    /// Number of execute records.
    pub count: usize,
    /// Number of complete records.
    pub success: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub avg_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub median_cost: f64,
}

#[derive(Default)]
struct AgentTypeTally {
    executes: usize,
    completes: usize,
    failures: usize,
    costs: Vec<f64>,
}

/// Per-agent-type stats in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AgentTypeBreakdown(OrderedGroups<AgentTypeStats>);

impl AgentTypeBreakdown {
    /// Only types with at least one execute record are reported.
    pub fn from_records(records: &[Record]) -> Self {
        let mut tallies: OrderedGroups<AgentTypeTally> = OrderedGroups::new();

        for record in records {
            match record.action {
                Action::Execute => {
                    let tally = tallies.entry(record.agent_type());
                    tally.executes += 1;
                    if let Some(cost) = record.cost_usd {
                        tally.costs.push(cost);
                    }
                }
                Action::Complete => tallies.entry(record.agent_type()).completes += 1,
                Action::Failed => tallies.entry(record.agent_type()).failures += 1,
                _ => {}
            }
        }

        Self(tallies.filter_map(|_, tally| {
            if tally.executes == 0 {
                return None;
            }
            let costs = CostStats::from_costs(&tally.costs);
            Some(AgentTypeStats {
                count: tally.executes,
                success: tally.completes,
                failed: tally.failures,
                success_rate: ratio(tally.completes, tally.executes),
                avg_cost: costs.as_ref().map_or(0.0, |c| c.avg),
                min_cost: costs.as_ref().map_or(0.0, |c| c.min),
                max_cost: costs.as_ref().map_or(0.0, |c| c.max),
                median_cost: costs.as_ref().map_or(0.0, |c| c.median),
            })
        }))
    }

    pub fn get(&self, agent_type: &str) -> Option<&AgentTypeStats> {
        self.0.get(agent_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentTypeStats)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The type with the most executions. Ties go to the type seen first.
    pub fn most_executed(&self) -> Option<(&str, &AgentTypeStats)> {
        let mut best: Option<(&str, &AgentTypeStats)> = None;
        for (name, stats) in self.0.iter() {
            if best.map_or(true, |(_, top)| stats.count > top.count) {
                best = Some((name, stats));
            }
        }
        best
    }

    /// Copy with success rates rounded to two decimals.
    pub fn with_rounded_rates(&self) -> Self {
        let mut rounded = self.clone();
        for stats in rounded.0.values_mut() {
            stats.success_rate = round_to(stats.success_rate, 2);
        }
        rounded
    }
}

/// One bucket of the cost categorisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostCategory {
    pub range: String,
    pub count: usize,
}

/// Execute costs split into simple / medium / complex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostCategories {
    pub simple: CostCategory,
    pub medium: CostCategory,
    pub complex: CostCategory,
}

impl CostCategories {
    /// Bucket costs with inclusive upper edges. `None` when there are no costs.
    pub fn from_costs(costs: &[f64], bounds: &CostCategoryBounds) -> Option<Self> {
        if costs.is_empty() {
            return None;
        }
        let simple = costs
            .iter()
            .filter(|&&c| c <= bounds.simple_max_usd)
            .count();
        let medium = costs
            .iter()
            .filter(|&&c| c > bounds.simple_max_usd && c <= bounds.medium_max_usd)
            .count();
        let complex = costs
            .iter()
            .filter(|&&c| c > bounds.medium_max_usd)
            .count();

        let floor = if bounds.simple_max_usd > SIMPLE_COST_LABEL_FLOOR_USD {
            SIMPLE_COST_LABEL_FLOOR_USD
        } else {
            0.0
        };

        Some(Self {
            simple: CostCategory {
                range: format!("${:.2}-${:.2}", floor, bounds.simple_max_usd),
                count: simple,
            },
            medium: CostCategory {
                range: format!("${:.2}-${:.2}", bounds.simple_max_usd, bounds.medium_max_usd),
                count: medium,
            },
            complex: CostCategory {
                range: format!("${:.2}+", bounds.medium_max_usd),
                count: complex,
            },
        })
    }
}

/// Cost statistics per action, plus categories over execute costs.
///
/// Serialized as a single object: one key per action, then `categories`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostPatterns {
    pub by_action: OrderedGroups<CostStats>,
    pub categories: Option<CostCategories>,
}

impl CostPatterns {
    pub fn from_records(records: &[Record], bounds: &CostCategoryBounds) -> Self {
        let mut costs: OrderedGroups<Vec<f64>> = OrderedGroups::new();
        let mut execute_costs = Vec::new();

        for record in records {
            let Some(cost) = record.cost_usd else {
                continue;
            };
            costs.entry(record.action.as_str()).push(cost);
            if record.action == Action::Execute {
                execute_costs.push(cost);
            }
        }

        Self {
            by_action: costs.filter_map(|_, samples| CostStats::from_costs(&samples)),
            categories: CostCategories::from_costs(&execute_costs, bounds),
        }
    }
}

impl Serialize for CostPatterns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.by_action.len() + usize::from(self.categories.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (action, stats) in self.by_action.iter() {
            map.serialize_entry(action, stats)?;
        }
        if let Some(categories) = &self.categories {
            map.serialize_entry("categories", categories)?;
        }
        map.end()
    }
}

/// Session outcomes, where the last complete/failed record of a session wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuccessMetrics {
    pub total_attempts: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
}

impl SuccessMetrics {
    pub fn from_records(records: &[Record]) -> Self {
        let mut outcomes: HashMap<&str, &Action> = HashMap::new();
        for record in records.iter().filter(|r| r.action.is_terminal()) {
            if let Some(session) = record.session() {
                outcomes.insert(session, &record.action);
            }
        }

        let total = outcomes.len();
        let successful = outcomes
            .values()
            .filter(|a| ***a == Action::Complete)
            .count();
        let failed = total - successful;

        Self {
            total_attempts: total,
            successful,
            failed,
            success_rate: round_to(ratio(successful, total), 2),
            failure_rate: round_to(ratio(failed, total), 2),
        }
    }
}

/// How many sessions needed 0, 1, or 2+ resumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeDistribution {
    /// Completed records minus sessions that resumed. This is an approximation
    /// and goes negative when completions and resumes are not one-to-one per session.
    #[serde(rename = "0_resumes")]
    pub zero_resumes: i64,
    #[serde(rename = "1_resume")]
    pub one_resume: usize,
    #[serde(rename = "2+_resumes")]
    pub two_or_more: usize,
}

/// Resume iteration patterns, grouped by session id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumePatterns {
    pub total_resumes: usize,
    pub sessions_with_resumes: usize,
    pub avg_resumes_per_session: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_resumes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<ResumeDistribution>,
}

impl ResumePatterns {
    /// Resume records without a session id are left out.
    pub fn from_records(records: &[Record]) -> Self {
        let mut per_session: OrderedGroups<usize> = OrderedGroups::new();
        for record in records.iter().filter(|r| r.action == Action::Resume) {
            if let Some(session) = record.session() {
                *per_session.entry(session) += 1;
            }
        }

        if per_session.is_empty() {
            return Self::default();
        }

        let counts: Vec<usize> = per_session.iter().map(|(_, n)| *n).collect();
        let total: usize = counts.iter().sum();
        let sessions = counts.len();
        let completed = count_action(records, &Action::Complete);

        Self {
            total_resumes: total,
            sessions_with_resumes: sessions,
            avg_resumes_per_session: round_to(ratio(total, sessions), 1),
            max_resumes: counts.iter().max().copied(),
            distribution: Some(ResumeDistribution {
                zero_resumes: completed as i64 - sessions as i64,
                one_resume: counts.iter().filter(|&&n| n == 1).count(),
                two_or_more: counts.iter().filter(|&&n| n >= 2).count(),
            }),
        }
    }
}

/// Everything derived from one pass over the sessions log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub status: HistoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Number of records loaded (the log calls every line a session).
    #[serde(rename = "total_sessions")]
    pub total_records: usize,
    pub summary: Summary,
    pub agent_types: AgentTypeBreakdown,
    pub cost_patterns: CostPatterns,
    pub success_metrics: SuccessMetrics,
    pub resume_patterns: ResumePatterns,
    pub recommendations: Vec<String>,
}

impl Analysis {
    /// The fixed, zeroed document for an empty log.
    pub fn no_history() -> Self {
        Self {
            status: HistoryStatus::NoHistory,
            message: Some(NO_HISTORY_MESSAGE.to_string()),
            total_records: 0,
            summary: Summary::default(),
            agent_types: AgentTypeBreakdown::default(),
            cost_patterns: CostPatterns::default(),
            success_metrics: SuccessMetrics::default(),
            resume_patterns: ResumePatterns::default(),
            recommendations: Vec::new(),
        }
    }
}

/// Analytics engine: turns a record list into an [`Analysis`].
#[derive(Debug, Clone, Default)]
pub struct Analytics {
    thresholds: Thresholds,
    cost_bounds: CostCategoryBounds,
}

impl Analytics {
    pub fn new(thresholds: Thresholds, cost_bounds: CostCategoryBounds) -> Self {
        Self {
            thresholds,
            cost_bounds,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.thresholds.clone(), config.cost_categories.clone())
    }

    /// Run every aggregator and the recommendation rules.
    pub fn analyze(&self, records: &[Record]) -> Analysis {
        if records.is_empty() {
            return Analysis::no_history();
        }

        let summary = Summary::from_records(records);
        let agent_types = AgentTypeBreakdown::from_records(records);
        let cost_patterns = CostPatterns::from_records(records, &self.cost_bounds);
        let success_metrics = SuccessMetrics::from_records(records);
        let resume_patterns = ResumePatterns::from_records(records);

        let recommendations = recommendations::recommend(
            &RuleInput {
                summary: &summary,
                agent_types: &agent_types,
                resumes: &resume_patterns,
                total_records: records.len(),
            },
            &self.thresholds,
        );

        tracing::debug!(
            records = records.len(),
            agent_types = agent_types.len(),
            recommendations = recommendations.len(),
            "Analyzed session history"
        );

        Analysis {
            status: HistoryStatus::Analyzed,
            message: None,
            total_records: records.len(),
            summary,
            agent_types,
            cost_patterns,
            success_metrics,
            resume_patterns,
            recommendations,
        }
    }
}

fn count_action(records: &[Record], action: &Action) -> usize {
    records.iter().filter(|r| r.is(action)).count()
}

//! Analytics over agent-run session logs.
//!
//! Turns a parsed record list into summary, agent type, cost, outcome and
//! resume aggregates, derives recommendations, and renders reports.

pub mod aggregations;
pub mod recommendations;
pub mod reports;
pub mod stats;

pub use aggregations::{Analysis, Analytics, HistoryStatus};
pub use reports::{ReportGenerator, ReportKind};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for records that carry no `agent_type`.
pub const UNKNOWN_AGENT_TYPE: &str = "unknown";

/// Action key assigned to records that carry no `action`.
pub const UNKNOWN_ACTION: &str = "unknown";

/// A single entry in the sessions log.
///
/// Unknown keys are ignored so older binaries keep reading newer logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Cost of the run in USD. `None` means "not costed", which is not the same as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl Record {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            session_id: None,
            agent_type: None,
            cost_usd: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = Some(cost_usd);
        self
    }

    /// Agent type label, falling back to `"unknown"`.
    pub fn agent_type(&self) -> &str {
        self.agent_type.as_deref().unwrap_or(UNKNOWN_AGENT_TYPE)
    }

    /// Session id, treating an empty string as absent.
    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is(&self, action: &Action) -> bool {
        &self.action == action
    }
}

/// Lifecycle tag of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Execute,
    Complete,
    Failed,
    Resume,
    /// Any tag this version does not know about, kept verbatim.
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Execute => "execute",
            Action::Complete => "complete",
            Action::Failed => "failed",
            Action::Resume => "resume",
            Action::Other(tag) => tag,
        }
    }

    /// Complete and failed records settle a session's outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Complete | Action::Failed)
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Other(UNKNOWN_ACTION.to_string())
    }
}

impl From<String> for Action {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "execute" => Action::Execute,
            "complete" => Action::Complete,
            "failed" => Action::Failed,
            "resume" => Action::Resume,
            _ => Action::Other(tag),
        }
    }
}

impl From<&str> for Action {
    fn from(tag: &str) -> Self {
        Action::from(tag.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};

/// How strongly a pathway is indicated. `Active` is stronger than `Consider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Consider,
    Active,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Active, Status::Consider];

    pub const fn label(self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Consider => "CONSIDER",
        }
    }
}

/// Urgency of an activation, ordered `Normal < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Normal,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Critical, Priority::High, Priority::Normal];

    pub const fn label(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
        }
    }
}

/// Where an activation came from: a CHOP pathway, another publisher, or an advisory note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Chop,
    NonChop,
    Note,
}

/// The engine's current assessment of one pathway (or advisory note) for a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub priority: Priority,
    pub reason: String,
    pub source: Source,
}

impl Activation {
    /// Advisory entry that is not backed by a catalog pathway.
    pub fn note(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: Priority,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::Consider,
            priority,
            reason: reason.into(),
            source: Source::Note,
        }
    }
}

/// Audit row recorded for every rule evaluated during a routing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTraceRow {
    pub rule_id: String,
    pub fired: bool,
    pub details: String,
}

impl RuleTraceRow {
    pub fn fired(rule_id: &str, details: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            fired: true,
            details: details.into(),
        }
    }

    pub fn skipped(rule_id: &str, details: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            fired: false,
            details: details.into(),
        }
    }
}

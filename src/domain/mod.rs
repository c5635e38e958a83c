//! Domain types shared across the idea-expansion subsystem.
//!
//! Strong enums replace the string-typed columns at the edges: entities store
//! plain strings (SQLite), everything above the repositories works with these
//! types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an idea.
///
/// Newtype wrapper preventing idea IDs from being mixed with user IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IdeaId(i32);

impl IdeaId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for IdeaId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<IdeaId> for i32 {
    fn from(id: IdeaId) -> Self {
        id.0
    }
}

/// The six canonical section categories extracted from generated text.
///
/// The variant order here is the canonical presentation order; persisted
/// `order_index` values derive from it, never from the order headers appear
/// in the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Problem,
    Users,
    Features,
    Workflow,
    Risks,
    Metrics,
}

impl SectionType {
    pub const ALL: [Self; 6] = [
        Self::Problem,
        Self::Users,
        Self::Features,
        Self::Workflow,
        Self::Risks,
        Self::Metrics,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Users => "users",
            Self::Features => "features",
            Self::Workflow => "workflow",
            Self::Risks => "risks",
            Self::Metrics => "metrics",
        }
    }

    /// Display title matching the header the completion service is asked to emit.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Problem => "Problem Statement",
            Self::Users => "Target Users",
            Self::Features => "Core Features",
            Self::Workflow => "User Workflow",
            Self::Risks => "Risks & Challenges",
            Self::Metrics => "Success Metrics",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Problem => "🎯",
            Self::Users => "👥",
            Self::Features => "⚡",
            Self::Workflow => "🔄",
            Self::Risks => "⚠️",
            Self::Metrics => "📊",
        }
    }

    /// Canonical position used for `order_index` on persisted rows.
    #[must_use]
    pub fn order_index(self) -> i32 {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map(|p| p as i32)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idea lifecycle states: draft -> expanded -> archived.
///
/// Re-expansion keeps an idea at `Expanded`; there is no path back from
/// `Archived` to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Draft,
    Expanded,
    Archived,
}

impl IdeaStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Expanded => "expanded",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "expanded" => Some(Self::Expanded),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account roles. Admins get the management console on top of normal access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

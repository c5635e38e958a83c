use crate::domain::{IdeaStatus, SectionType};
use crate::parser::ParsedSections;
use serde::{Deserialize, Serialize};

/// An idea as the services see it: entity row plus decoded JSON columns.
#[derive(Debug, Clone)]
pub struct Idea {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub raw_idea: String,
    pub expanded_content: Option<String>,
    pub sections_parsed: Option<ParsedSections>,
    pub suggested_prompts: Vec<FollowUpPrompt>,
    pub status: IdeaStatus,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub sections: Vec<IdeaSection>,
    pub created_at: String,
    pub updated_at: String,
}

/// One persisted section row, always non-empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaSection {
    pub section_type: SectionType,
    pub content: String,
    pub order_index: i32,
}

/// A pre-authored deeper-exploration prompt surfaced next to an expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPrompt {
    pub category: String,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub prompt: String,
}

/// Per-user idea counters for the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IdeaStats {
    pub total: u64,
    pub expanded: u64,
    pub drafts: u64,
    pub favorites: u64,
}

use serde::Serialize;

use crate::clients::Usage;
use crate::db::{IdeaBreakdown, User, UserBreakdown};
use crate::models::{FollowUpPrompt, Idea, IdeaStats};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionDto {
    pub section_type: String,
    pub title: String,
    pub icon: String,
    pub content: String,
    pub order_index: i32,
}

#[derive(Debug, Serialize)]
pub struct IdeaDto {
    pub id: i32,
    pub title: String,
    pub raw_idea: String,
    pub status: String,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub expanded_content: Option<String>,
    pub sections: Vec<SectionDto>,
    pub suggested_prompts: Vec<FollowUpPrompt>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Idea> for IdeaDto {
    fn from(idea: Idea) -> Self {
        Self {
            id: idea.id,
            title: idea.title,
            raw_idea: idea.raw_idea,
            status: idea.status.as_str().to_string(),
            is_favorite: idea.is_favorite,
            tags: idea.tags,
            expanded_content: idea.expanded_content,
            sections: idea
                .sections
                .into_iter()
                .map(|s| SectionDto {
                    section_type: s.section_type.as_str().to_string(),
                    title: s.section_type.title().to_string(),
                    icon: s.section_type.icon().to_string(),
                    content: s.content,
                    order_index: s.order_index,
                })
                .collect(),
            suggested_prompts: idea.suggested_prompts,
            created_at: idea.created_at,
            updated_at: idea.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdeaListDto {
    pub items: Vec<IdeaDto>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub total: u64,
    pub expanded: u64,
    pub drafts: u64,
    pub favorites: u64,
}

impl From<IdeaStats> for StatsDto {
    fn from(stats: IdeaStats) -> Self {
        Self {
            total: stats.total,
            expanded: stats.expanded,
            drafts: stats.drafts,
            favorites: stats.favorites,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpandPromptDto {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
pub struct ExpandIdeaDto {
    pub idea: IdeaDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ----------------------------------------------------------------------
// Admin DTOs
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AdminUserDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub idea_count: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminUserListDto {
    pub users: Vec<AdminUserDto>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminIdeaDto {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminIdeaListDto {
    pub ideas: Vec<AdminIdeaDto>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardDto {
    pub total_users: u64,
    pub total_ideas: u64,
    pub active_users_week: u64,
    pub new_users_month: u64,
    pub ideas_today: u64,
    pub recent_users: Vec<AdminUserDto>,
    pub recent_ideas: Vec<AdminIdeaDto>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatisticsDto {
    pub users: UserBreakdown,
    pub ideas: IdeaBreakdown,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database_ok: bool,
    pub completion_configured: bool,
    pub total_users: u64,
    pub total_ideas: u64,
}

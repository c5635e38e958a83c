use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ideas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub title: String,

    pub raw_idea: String,

    /// Full generated markdown, set once the idea has been expanded.
    pub expanded_content: Option<String>,

    /// JSON object mapping section type to extracted text.
    pub sections_parsed: Option<String>,

    /// JSON array of follow-up prompt suggestions.
    pub suggested_prompts: Option<String>,

    /// "draft", "expanded" or "archived"
    pub status: String,

    pub is_favorite: bool,

    /// JSON array of free-form tags.
    pub tags: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::idea_sections::Entity")]
    IdeaSections,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::idea_sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IdeaSections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "idea_sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub idea_id: i32,

    /// One of the six canonical section types.
    pub section_type: String,

    pub content: String,

    /// Position in the canonical section ordering.
    pub order_index: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ideas::Entity",
        from = "Column::IdeaId",
        to = "super::ideas::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ideas,
}

impl Related<super::ideas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ideas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scout_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub scout_id: String,
    /// "user" or "assistant".
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scouts::Entity",
        from = "Column::ScoutId",
        to = "super::scouts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Scouts,
}

impl Related<super::scouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

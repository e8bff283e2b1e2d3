use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    /// JSON array of query strings.
    pub search_queries: Option<String>,
    /// JSON-encoded `UserLocation`.
    pub location: Option<String>,
    pub frequency: Option<String>,
    pub is_active: bool,
    pub last_run_at: Option<String>,
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
    #[sea_orm(has_many = "super::scout_messages::Entity")]
    ScoutMessages,
    #[sea_orm(has_many = "super::scout_executions::Entity")]
    ScoutExecutions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::scout_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScoutMessages.def()
    }
}

impl Related<super::scout_executions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScoutExecutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

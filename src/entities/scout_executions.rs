use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scout_executions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub scout_id: String,
    /// "running", "completed" or "failed"; written by the external engine.
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
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
    #[sea_orm(has_many = "super::scout_execution_steps::Entity")]
    ScoutExecutionSteps,
}

impl Related<super::scouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scouts.def()
    }
}

impl Related<super::scout_execution_steps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScoutExecutionSteps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

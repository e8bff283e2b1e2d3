use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scout_execution_steps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub execution_id: String,
    /// Strictly ordered within an execution.
    pub step_number: i32,
    pub step_type: String,
    pub description: String,
    /// Untyped JSON payload specific to the step type.
    #[sea_orm(column_type = "Text", nullable)]
    pub input_data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub output_data: Option<String>,
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scout_executions::Entity",
        from = "Column::ExecutionId",
        to = "super::scout_executions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ScoutExecutions,
}

impl Related<super::scout_executions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScoutExecutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

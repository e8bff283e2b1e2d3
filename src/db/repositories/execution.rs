use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::{RunStatus, StepType};
use crate::entities::{scout_execution_steps, scout_executions};

/// Fields the execution engine reports for a step.
#[derive(Debug, Clone)]
pub struct NewStep {
    pub step_number: i32,
    pub step_type: StepType,
    pub description: String,
    pub input_data: Option<serde_json::Value>,
    pub output_data: Option<serde_json::Value>,
    pub status: RunStatus,
    pub started_at: String,
    pub completed_at: Option<String>,
}

pub struct ExecutionRepository {
    conn: DatabaseConnection,
}

impl ExecutionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        id: &str,
        scout_id: &str,
        started_at: Option<&str>,
    ) -> Result<scout_executions::Model> {
        let model = scout_executions::ActiveModel {
            id: Set(id.to_string()),
            scout_id: Set(scout_id.to_string()),
            status: Set(RunStatus::Running.as_str().to_string()),
            started_at: Set(started_at
                .map_or_else(|| chrono::Utc::now().to_rfc3339(), ToString::to_string)),
            completed_at: Set(None),
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Option<scout_executions::Model>> {
        scout_executions::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query execution by ID")
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: RunStatus,
        completed_at: Option<&str>,
    ) -> Result<Option<scout_executions::Model>> {
        let Some(existing) = scout_executions::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: scout_executions::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        match status {
            RunStatus::Completed | RunStatus::Failed => {
                active.completed_at = Set(Some(completed_at.map_or_else(
                    || chrono::Utc::now().to_rfc3339(),
                    ToString::to_string,
                )));
            }
            RunStatus::Running => {}
        }

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Executions for a scout, newest first.
    pub async fn list_for_scout(&self, scout_id: &str) -> Result<Vec<scout_executions::Model>> {
        Ok(scout_executions::Entity::find()
            .filter(scout_executions::Column::ScoutId.eq(scout_id))
            .order_by_desc(scout_executions::Column::StartedAt)
            .all(&self.conn)
            .await?)
    }

    pub async fn latest_for_scout(
        &self,
        scout_id: &str,
    ) -> Result<Option<scout_executions::Model>> {
        Ok(scout_executions::Entity::find()
            .filter(scout_executions::Column::ScoutId.eq(scout_id))
            .order_by_desc(scout_executions::Column::StartedAt)
            .one(&self.conn)
            .await?)
    }

    /// (scout id, status) pairs for the admin overview, capped.
    pub async fn list_statuses(&self, limit: u64) -> Result<Vec<(String, String)>> {
        let rows = scout_executions::Entity::find()
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|e| (e.scout_id, e.status)).collect())
    }

    pub async fn add_step(
        &self,
        execution_id: &str,
        step: NewStep,
    ) -> Result<scout_execution_steps::Model> {
        let model = scout_execution_steps::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            execution_id: Set(execution_id.to_string()),
            step_number: Set(step.step_number),
            step_type: Set(step.step_type.as_str().to_string()),
            description: Set(step.description),
            input_data: Set(encode_payload(step.input_data.as_ref())?),
            output_data: Set(encode_payload(step.output_data.as_ref())?),
            status: Set(step.status.as_str().to_string()),
            started_at: Set(step.started_at),
            completed_at: Set(step.completed_at),
        };

        Ok(model.insert(&self.conn).await?)
    }

    /// Steps of an execution in the order the engine recorded them.
    pub async fn list_steps(
        &self,
        execution_id: &str,
    ) -> Result<Vec<scout_execution_steps::Model>> {
        Ok(scout_execution_steps::Entity::find()
            .filter(scout_execution_steps::Column::ExecutionId.eq(execution_id))
            .order_by_asc(scout_execution_steps::Column::StepNumber)
            .all(&self.conn)
            .await?)
    }
}

fn encode_payload(value: Option<&serde_json::Value>) -> Result<Option<String>> {
    value
        .map(|v| serde_json::to_string(v).context("Failed to encode step payload"))
        .transpose()
}

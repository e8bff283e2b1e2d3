//! Execution triggering, history, and the runner ingest write path.

use thiserror::Error;

use crate::api::types::{
    CreateExecutionRequest, ExecutionDto, RecordStepRequest, StepDto, UpdateExecutionRequest,
};
use crate::replay::{ReplayTimeline, StepRecord};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Scout not found or unauthorized")]
    NotOwner,

    #[error("Execution {0} not found")]
    NotFound(String),

    #[error("Scout was run recently; allowed again in {wait_seconds} seconds")]
    Cooldown { wait_seconds: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ExecutionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Steps in replay form plus the execution's current status, for the
/// live-follow stream.
#[derive(Debug)]
pub struct LiveSnapshot {
    pub status: String,
    pub steps: Vec<StepRecord>,
}

#[async_trait::async_trait]
pub trait ExecutionService: Send + Sync {
    /// Authorizes the user against the scout, enforces the manual-run
    /// cooldown, and hands the run to the engine without awaiting it.
    async fn trigger(&self, user_id: &str, scout_id: &str) -> Result<(), ExecutionError>;

    async fn history(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<Vec<ExecutionDto>, ExecutionError>;

    async fn steps(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<Vec<StepDto>, ExecutionError>;

    /// The computed replay schedule for a recorded execution.
    async fn replay(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<ReplayTimeline, ExecutionError>;

    async fn live_snapshot(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<LiveSnapshot, ExecutionError>;

    // Runner ingest path; the caller has already authenticated the engine.

    async fn record_execution(
        &self,
        request: CreateExecutionRequest,
    ) -> Result<ExecutionDto, ExecutionError>;

    async fn update_execution(
        &self,
        execution_id: &str,
        request: UpdateExecutionRequest,
    ) -> Result<ExecutionDto, ExecutionError>;

    async fn record_step(
        &self,
        execution_id: &str,
        request: RecordStepRequest,
    ) -> Result<StepDto, ExecutionError>;
}

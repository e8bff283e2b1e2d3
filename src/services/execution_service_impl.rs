//! Execution service over the store, the runner client, and the event bus.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::types::{
    CreateExecutionRequest, ExecutionDto, RecordStepRequest, StepDto, UpdateExecutionRequest,
};
use crate::clients::RunnerClient;
use crate::config::Config;
use crate::db::{NewStep, Store, UsageEvent};
use crate::domain::events::NotificationEvent;
use crate::domain::{RunStatus, StepType};
use crate::entities::{scout_execution_steps, scout_executions, scouts};
use crate::replay::{ReplayTimeline, StepRecord};
use crate::services::execution_service::{ExecutionError, ExecutionService, LiveSnapshot};
use crate::services::firecrawl_service::FirecrawlKeyService;

pub struct SeaOrmExecutionService {
    store: Arc<Store>,
    runner: Arc<RunnerClient>,
    keys: Arc<dyn FirecrawlKeyService>,
    config: Arc<RwLock<Config>>,
    event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
}

impl SeaOrmExecutionService {
    #[must_use]
    pub const fn new(
        store: Arc<Store>,
        runner: Arc<RunnerClient>,
        keys: Arc<dyn FirecrawlKeyService>,
        config: Arc<RwLock<Config>>,
        event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            runner,
            keys,
            config,
            event_bus,
        }
    }

    async fn owned_scout(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<scouts::Model, ExecutionError> {
        let scout = self
            .store
            .get_scout(scout_id)
            .await?
            .ok_or(ExecutionError::NotOwner)?;
        if scout.user_id != user_id {
            return Err(ExecutionError::NotOwner);
        }
        Ok(scout)
    }

    /// Resolves an execution the user is allowed to see.
    async fn owned_execution(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<scout_executions::Model, ExecutionError> {
        let execution = self
            .store
            .get_execution(execution_id)
            .await?
            .ok_or_else(|| ExecutionError::NotFound(execution_id.to_string()))?;

        self.owned_scout(user_id, &execution.scout_id).await?;
        Ok(execution)
    }
}

fn step_dto(model: scout_execution_steps::Model) -> StepDto {
    StepDto {
        id: model.id,
        step_number: model.step_number,
        step_type: model.step_type,
        description: model.description,
        input_data: model
            .input_data
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok()),
        output_data: model
            .output_data
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok()),
        status: model.status,
        started_at: model.started_at,
        completed_at: model.completed_at,
    }
}

/// Seconds until another manual run is allowed, zero when the window has
/// passed or the timestamp is unreadable.
fn remaining_run_cooldown(last_started_at: &str, cooldown_minutes: u64, now: DateTime<Utc>) -> u64 {
    let Ok(started) = DateTime::parse_from_rfc3339(last_started_at) else {
        return 0;
    };

    let elapsed = now.signed_duration_since(started.with_timezone(&Utc));
    let elapsed_seconds = elapsed.num_seconds().max(0) as u64;
    (cooldown_minutes * 60).saturating_sub(elapsed_seconds)
}

#[async_trait::async_trait]
impl ExecutionService for SeaOrmExecutionService {
    async fn trigger(&self, user_id: &str, scout_id: &str) -> Result<(), ExecutionError> {
        self.owned_scout(user_id, scout_id).await?;

        let cooldown_minutes = self.config.read().await.quota.manual_run_cooldown_minutes;
        if let Some(latest) = self.store.latest_execution_for_scout(scout_id).await? {
            let wait_seconds =
                remaining_run_cooldown(&latest.started_at, cooldown_minutes, Utc::now());
            if wait_seconds > 0 {
                return Err(ExecutionError::Cooldown { wait_seconds });
            }
        }

        let resolved = self
            .keys
            .key_for_user(user_id)
            .await
            .map_err(|e| ExecutionError::Database(e.to_string()))?;

        let runner = Arc::clone(&self.runner);
        let keys = Arc::clone(&self.keys);
        let user = user_id.to_string();
        let scout = scout_id.to_string();

        // Fire and forget; the engine reports back through the ingest
        // endpoints.
        tokio::spawn(async move {
            match runner
                .trigger_run(&scout, &user, resolved.api_key.as_deref())
                .await
            {
                Ok(()) => {
                    let event = UsageEvent {
                        user_id: user.clone(),
                        scout_id: Some(scout.clone()),
                        execution_id: None,
                        used_fallback: resolved.used_fallback,
                        fallback_reason: resolved.fallback_reason,
                        api_calls_count: 1,
                    };
                    if let Err(e) = keys.log_usage(event).await {
                        warn!("Could not log key usage for scout {scout}: {e}");
                    }
                }
                Err(e) => warn!("Run trigger for scout {scout} failed: {e}"),
            }
        });

        info!("Run for scout {scout_id} handed to engine");
        Ok(())
    }

    async fn history(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<Vec<ExecutionDto>, ExecutionError> {
        self.owned_scout(user_id, scout_id).await?;
        let executions = self.store.list_executions_for_scout(scout_id).await?;
        Ok(executions.into_iter().map(ExecutionDto::from).collect())
    }

    async fn steps(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<Vec<StepDto>, ExecutionError> {
        let execution = self.owned_execution(user_id, execution_id).await?;
        let steps = self.store.list_execution_steps(&execution.id).await?;
        Ok(steps.into_iter().map(step_dto).collect())
    }

    async fn replay(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<ReplayTimeline, ExecutionError> {
        let execution = self.owned_execution(user_id, execution_id).await?;
        let steps = self.store.list_execution_steps(&execution.id).await?;

        let records: Vec<StepRecord> = steps.iter().map(StepRecord::from_model).collect();
        Ok(ReplayTimeline::build(&records))
    }

    async fn live_snapshot(
        &self,
        user_id: &str,
        execution_id: &str,
    ) -> Result<LiveSnapshot, ExecutionError> {
        let execution = self.owned_execution(user_id, execution_id).await?;
        let steps = self.store.list_execution_steps(&execution.id).await?;
        Ok(LiveSnapshot {
            status: execution.status,
            steps: steps.iter().map(StepRecord::from_model).collect(),
        })
    }

    async fn record_execution(
        &self,
        request: CreateExecutionRequest,
    ) -> Result<ExecutionDto, ExecutionError> {
        self.store
            .get_scout(&request.scout_id)
            .await?
            .ok_or_else(|| {
                ExecutionError::Validation(format!("Unknown scout: {}", request.scout_id))
            })?;

        let id = request
            .execution_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let execution = self
            .store
            .create_execution(&id, &request.scout_id, request.started_at.as_deref())
            .await?;
        self.store.touch_scout_last_run(&request.scout_id).await?;

        let _ = self.event_bus.send(NotificationEvent::ExecutionCreated {
            execution_id: execution.id.clone(),
            scout_id: execution.scout_id.clone(),
        });

        Ok(ExecutionDto::from(execution))
    }

    async fn update_execution(
        &self,
        execution_id: &str,
        request: UpdateExecutionRequest,
    ) -> Result<ExecutionDto, ExecutionError> {
        let status = RunStatus::from_str(&request.status).map_err(ExecutionError::Validation)?;

        let execution = self
            .store
            .update_execution_status(execution_id, status, request.completed_at.as_deref())
            .await?
            .ok_or_else(|| ExecutionError::NotFound(execution_id.to_string()))?;

        let _ = self
            .event_bus
            .send(NotificationEvent::ExecutionStatusChanged {
                execution_id: execution.id.clone(),
                scout_id: execution.scout_id.clone(),
                status: execution.status.clone(),
            });

        Ok(ExecutionDto::from(execution))
    }

    async fn record_step(
        &self,
        execution_id: &str,
        request: RecordStepRequest,
    ) -> Result<StepDto, ExecutionError> {
        let execution = self
            .store
            .get_execution(execution_id)
            .await?
            .ok_or_else(|| ExecutionError::NotFound(execution_id.to_string()))?;

        let step_type =
            StepType::from_str(&request.step_type).map_err(ExecutionError::Validation)?;
        let status = request
            .status
            .as_deref()
            .map(RunStatus::from_str)
            .transpose()
            .map_err(ExecutionError::Validation)?
            .unwrap_or(RunStatus::Completed);

        let step = self
            .store
            .add_execution_step(execution_id, NewStep {
                step_number: request.step_number,
                step_type,
                description: request.description,
                input_data: request.input_data,
                output_data: request.output_data,
                status,
                started_at: request
                    .started_at
                    .unwrap_or_else(|| Utc::now().to_rfc3339()),
                completed_at: request.completed_at,
            })
            .await?;

        let _ = self.event_bus.send(NotificationEvent::StepRecorded {
            execution_id: execution.id,
            scout_id: execution.scout_id,
            step_number: step.step_number,
            step_type: step.step_type.clone(),
        });

        Ok(step_dto(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_cooldown_counts_down_in_seconds() {
        let started = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let started_at = started.to_rfc3339();

        let at = |secs: i64| started + chrono::Duration::seconds(secs);

        assert_eq!(remaining_run_cooldown(&started_at, 20, at(0)), 1200);
        assert_eq!(remaining_run_cooldown(&started_at, 20, at(600)), 600);
        assert_eq!(remaining_run_cooldown(&started_at, 20, at(1200)), 0);
    }

    #[test]
    fn unreadable_timestamp_never_blocks_a_run() {
        assert_eq!(remaining_run_cooldown("garbage", 20, Utc::now()), 0);
    }
}

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::StreamExt;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{ExecuteRequest, ExecuteResponse, ExecutionDto, StepDto};
use crate::domain::RunStatus;
use crate::domain::events::NotificationEvent;
use crate::replay::ReplayTimeline;
use crate::replay::driver::TimelinePlayer;
use crate::replay::live::LiveTracker;
use crate::services::ExecutionError;

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::NotOwner => {
                Self::Forbidden("Scout not found or unauthorized".to_string())
            }
            ExecutionError::NotFound(id) => Self::not_found("Execution", id),
            ExecutionError::Cooldown { wait_seconds } => Self::RateLimited { wait_seconds },
            ExecutionError::Validation(msg) => Self::ValidationError(msg),
            ExecutionError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// POST /scout/execute
pub async fn execute_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let Some(scout_id) = payload.scout_id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::validation("scoutId is required"));
    };

    state
        .execution_service()
        .trigger(&user.id, &scout_id)
        .await?;

    Ok(Json(ExecuteResponse {
        success: true,
        message: "Scout execution started".to_string(),
        scout_id,
    }))
}

/// GET /scouts/{id}/executions
pub async fn list_executions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ExecutionDto>>>, ApiError> {
    let executions = state.execution_service().history(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(executions)))
}

/// GET /executions/{id}/steps
pub async fn list_steps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<StepDto>>>, ApiError> {
    let steps = state.execution_service().steps(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(steps)))
}

/// GET /executions/{id}/replay/stream
///
/// Plays the timeline server-side and streams each frame at its scheduled
/// offset. Dropping the connection aborts the playback task.
pub async fn stream_replay(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let timeline = state.execution_service().replay(&user.id, &id).await?;

    let player = TimelinePlayer::start(timeline);
    let rx = player.subscribe();

    let stream = stream::unfold((player, rx), |(player, mut rx)| async move {
        if rx.changed().await.is_err() {
            return None;
        }
        let frame = rx.borrow_and_update().clone()?;
        let json = serde_json::to_string(&frame).unwrap_or_default();
        Some((Ok(Event::default().data(json)), (player, rx)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn live_frame(step_index: usize) -> Event {
    let json = serde_json::to_string(&serde_json::json!({ "stepIndex": step_index }))
        .unwrap_or_default();
    Event::default().data(json)
}

/// GET /executions/{id}/live
///
/// Follows an execution while the engine is still recording steps,
/// emitting the step index the viewer should be on. A scrape screenshot
/// pins the index for five seconds before newer steps pull focus. The
/// stream ends when the execution leaves the running state; an execution
/// that already finished gets its final frame and closes immediately.
pub async fn stream_live(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let snapshot = state.execution_service().live_snapshot(&user.id, &id).await?;
    let running = snapshot.status == RunStatus::Running.as_str();

    let rx = state.event_bus().subscribe();
    let started = Instant::now();
    let mut tracker = LiveTracker::new();
    let first = tracker.observe(&snapshot.steps, 0);

    let init = stream::iter(first.map(|index| Ok(live_frame(index))));

    let follow = stream::unfold(
        (state, user.id, id, rx, tracker, first, started, running),
        |(state, user_id, id, mut rx, mut tracker, mut last, started, running)| async move {
            if !running {
                return None;
            }
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        match &event {
                            NotificationEvent::StepRecorded { execution_id, .. }
                                if *execution_id == id => {}
                            NotificationEvent::ExecutionStatusChanged {
                                execution_id,
                                status,
                                ..
                            } if *execution_id == id
                                && status != RunStatus::Running.as_str() =>
                            {
                                return None;
                            }
                            _ => continue,
                        }

                        let Ok(snapshot) =
                            state.execution_service().live_snapshot(&user_id, &id).await
                        else {
                            return None;
                        };
                        let now_ms =
                            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                        let index = tracker.observe(&snapshot.steps, now_ms);
                        if index == last {
                            continue;
                        }
                        last = index;

                        if let Some(step_index) = index {
                            return Some((
                                Ok(live_frame(step_index)),
                                (state, user_id, id, rx, tracker, last, started, running),
                            ));
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        },
    );

    let stream = init.chain(follow);
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

/// GET /executions/{id}/replay
pub async fn get_replay(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReplayTimeline>>, ApiError> {
    let timeline = state.execution_service().replay(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(timeline)))
}

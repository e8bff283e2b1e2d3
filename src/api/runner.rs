//! Ingest endpoints for the external execution engine. Guarded by a
//! shared service token instead of user auth.

use axum::{
    Json,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{
    CreateExecutionRequest, ExecutionDto, RecordStepRequest, StepDto, UpdateExecutionRequest,
};

pub async fn runner_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let expected = state.config().read().await.runner.service_token.clone();

    let presented = headers
        .get("X-Runner-Token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !expected.is_empty() && presented == expected {
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

/// POST /runner/executions
pub async fn create_execution(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateExecutionRequest>,
) -> Result<Json<ApiResponse<ExecutionDto>>, ApiError> {
    let execution = state.execution_service().record_execution(payload).await?;
    Ok(Json(ApiResponse::success(execution)))
}

/// PUT /runner/executions/{id}
pub async fn update_execution(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExecutionRequest>,
) -> Result<Json<ApiResponse<ExecutionDto>>, ApiError> {
    let execution = state
        .execution_service()
        .update_execution(&id, payload)
        .await?;
    Ok(Json(ApiResponse::success(execution)))
}

/// POST /runner/executions/{id}/steps
pub async fn record_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<RecordStepRequest>,
) -> Result<Json<ApiResponse<StepDto>>, ApiError> {
    let step = state.execution_service().record_step(&id, payload).await?;
    Ok(Json(ApiResponse::success(step)))
}

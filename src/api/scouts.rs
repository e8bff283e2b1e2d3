use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{
    CreateScoutRequest, MessageDto, ScoutDto, SendMessageRequest, UpdateScoutRequest,
};
use crate::services::{ChatServiceError, ScoutError};

impl From<ScoutError> for ApiError {
    fn from(err: ScoutError) -> Self {
        match err {
            ScoutError::NotFound(id) => Self::not_found("Scout", id),
            ScoutError::QuotaExceeded { limit } => {
                Self::Conflict(format!("Scout limit of {limit} reached"))
            }
            ScoutError::NotOwner => {
                Self::Forbidden("Scout not found or unauthorized".to_string())
            }
            ScoutError::Incomplete(fields) => {
                Self::ValidationError(format!("Scout is missing required fields: {fields}"))
            }
            ScoutError::Validation(msg) => Self::ValidationError(msg),
            ScoutError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ChatServiceError> for ApiError {
    fn from(err: ChatServiceError) -> Self {
        match err {
            ChatServiceError::NotOwner => {
                Self::Forbidden("Scout not found or unauthorized".to_string())
            }
            ChatServiceError::Backend(msg) => Self::ExternalApiError {
                service: "Chat".to_string(),
                message: msg,
            },
            ChatServiceError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /scouts
pub async fn list_scouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ScoutDto>>>, ApiError> {
    let scouts = state.scout_service().list(&user.id).await?;
    Ok(Json(ApiResponse::success(scouts)))
}

/// POST /scouts
pub async fn create_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateScoutRequest>,
) -> Result<Json<ApiResponse<ScoutDto>>, ApiError> {
    let scout = state.scout_service().create(&user.id, payload).await?;
    Ok(Json(ApiResponse::success(scout)))
}

/// GET /scouts/{id}
pub async fn get_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ScoutDto>>, ApiError> {
    let scout = state.scout_service().get(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(scout)))
}

/// PATCH /scouts/{id}
pub async fn update_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateScoutRequest>,
) -> Result<Json<ApiResponse<ScoutDto>>, ApiError> {
    let scout = state.scout_service().update(&user.id, &id, payload).await?;
    Ok(Json(ApiResponse::success(scout)))
}

/// POST /scouts/{id}/activate
pub async fn activate_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ScoutDto>>, ApiError> {
    let scout = state.scout_service().activate(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(scout)))
}

/// DELETE /scouts/{id}
pub async fn delete_scout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.scout_service().delete(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /scouts/{id}/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let messages = state.chat_service().list_messages(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(messages)))
}

/// POST /scouts/{id}/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Message must not be empty"));
    }

    let messages = state
        .chat_service()
        .send_message(&user.id, &id, &payload.content)
        .await?;
    Ok(Json(ApiResponse::success(messages)))
}

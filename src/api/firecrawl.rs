use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{KeyInfoDto, RegenerateResponse};
use crate::services::KeyError;

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::RateLimited { wait_seconds } => Self::RateLimited { wait_seconds },
            KeyError::Upstream(msg) => Self::firecrawl_error(msg),
            KeyError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// POST /firecrawl/regenerate
pub async fn regenerate_key(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<RegenerateResponse>, ApiError> {
    let outcome = state
        .key_service()
        .regenerate(&user.id, &user.email)
        .await?;

    Ok(Json(RegenerateResponse {
        success: true,
        already_existed: outcome.already_existed,
    }))
}

/// GET /firecrawl/status
pub async fn key_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<KeyInfoDto>>, ApiError> {
    let info = state.key_service().key_info(&user.id).await?;
    Ok(Json(ApiResponse::success(info)))
}

use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::{AdminOverviewDto, DeleteUserRequest};
use crate::services::AdminError;

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::SelfDeletion => {
                Self::Forbidden("Administrators cannot delete their own account".to_string())
            }
            AdminError::UserNotFound(id) => Self::not_found("User", id),
            AdminError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// Admin access is decided by the session email's domain suffix.
async fn require_admin(state: &AppState, user: &CurrentUser) -> Result<(), ApiError> {
    let domain = state.config().read().await.admin.email_domain.clone();
    if user.email.ends_with(&domain) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

/// GET /admin
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<AdminOverviewDto>>, ApiError> {
    require_admin(&state, &user).await?;

    let overview = state.admin_service().overview().await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// DELETE /admin
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&state, &user).await?;

    state
        .admin_service()
        .delete_user(&user.id, &payload.user_id)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{LoginRequest, SessionUserDto, SignupRequest};

/// The authenticated account, resolved by the middleware and available to
/// handlers as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(user_id)) = session.get::<String>("user_id").await
        && let Ok(Some(user)) = state.store().get_user_by_id(&user_id).await
    {
        tracing::Span::current().record("user_id", &user.id);
        request.extensions_mut().insert(CurrentUser {
            id: user.id,
            email: user.email,
        });
        return Ok(next.run(request).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(user)) = state.store().verify_api_key(&key).await
    {
        tracing::Span::current().record("user_id", &user.id);
        request.extensions_mut().insert(CurrentUser {
            id: user.id,
            email: user.email,
        });
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<SessionUserDto>>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation("A valid email is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }

    if state
        .store()
        .get_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to check email: {e}")))?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let user = state
        .store()
        .create_user(&email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create account: {e}")))?;

    // New accounts get a crawl key straight away, best effort.
    state.key_service().ensure_key(&user.id, &user.email).await;

    session
        .insert("user_id", &user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(SessionUserDto {
        id: user.id,
        email: user.email,
        api_key: user.api_key,
    })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionUserDto>>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let is_valid = state
        .store()
        .verify_user_password(&email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store()
        .get_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    state
        .store()
        .touch_last_sign_in(&user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to record sign-in: {e}")))?;

    // Users from before key provisioning existed pick one up on login.
    state.key_service().ensure_key(&user.id, &user.email).await;

    session
        .insert("user_id", &user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(SessionUserDto {
        id: user.id,
        email: user.email,
        api_key: user.api_key,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

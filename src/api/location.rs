use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::api::types::ResolveLocationRequest;
use crate::domain::UserLocation;
use crate::location::{self, CityRef, CountryRef, StateRef};

#[derive(Debug, Deserialize)]
pub struct StatesQuery {
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    pub country: String,
    pub state: String,
}

/// GET /location/countries
pub async fn list_countries() -> Json<ApiResponse<Vec<CountryRef>>> {
    Json(ApiResponse::success(location::countries()))
}

/// GET /location/states?country=
pub async fn list_states(Query(query): Query<StatesQuery>) -> Json<ApiResponse<Vec<StateRef>>> {
    Json(ApiResponse::success(location::states(&query.country)))
}

/// GET /location/cities?country=&state=
pub async fn list_cities(Query(query): Query<CitiesQuery>) -> Json<ApiResponse<Vec<CityRef>>> {
    Json(ApiResponse::success(location::cities(
        &query.country,
        &query.state,
    )))
}

/// POST /location/resolve
///
/// A failed lookup returns 400 and leaves the caller's stored location
/// untouched.
pub async fn resolve_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ResolveLocationRequest>,
) -> Result<Json<ApiResponse<UserLocation>>, ApiError> {
    let Some(resolved) = location::resolve(payload.latitude, payload.longitude) else {
        return Err(ApiError::validation(
            "No known location near these coordinates",
        ));
    };

    if let Err(e) = state.store().set_user_location(&user.id, &resolved).await {
        warn!("Could not save resolved location for {}: {e}", user.id);
    }

    Ok(Json(ApiResponse::success(resolved)))
}

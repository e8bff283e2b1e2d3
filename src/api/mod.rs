use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod events;
mod executions;
mod firecrawl;
mod location;
mod observability;
mod runner;
mod scouts;
pub mod types;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::domain::events::NotificationEvent;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn scout_service(&self) -> &Arc<dyn crate::services::ScoutService> {
        &self.shared.scout_service
    }

    #[must_use]
    pub fn chat_service(&self) -> &Arc<dyn crate::services::ChatService> {
        &self.shared.chat_service
    }

    #[must_use]
    pub fn execution_service(&self) -> &Arc<dyn crate::services::ExecutionService> {
        &self.shared.execution_service
    }

    #[must_use]
    pub fn key_service(&self) -> &Arc<dyn crate::services::FirecrawlKeyService> {
        &self.shared.key_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn crate::services::AdminService> {
        &self.shared.admin_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_ttl_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_ttl_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());
    let runner_routes = create_runner_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_ttl_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .merge(runner_routes)
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/scouts", get(scouts::list_scouts))
        .route("/scouts", post(scouts::create_scout))
        .route("/scouts/{id}", get(scouts::get_scout))
        .route("/scouts/{id}", patch(scouts::update_scout))
        .route("/scouts/{id}", delete(scouts::delete_scout))
        .route("/scouts/{id}/activate", post(scouts::activate_scout))
        .route("/scouts/{id}/messages", get(scouts::list_messages))
        .route("/scouts/{id}/messages", post(scouts::send_message))
        .route("/scout/execute", post(executions::execute_scout))
        .route("/scouts/{id}/executions", get(executions::list_executions))
        .route("/executions/{id}/steps", get(executions::list_steps))
        .route("/executions/{id}/replay", get(executions::get_replay))
        .route(
            "/executions/{id}/replay/stream",
            get(executions::stream_replay),
        )
        .route(
            "/executions/{id}/live",
            get(executions::stream_live),
        )
        .route("/firecrawl/regenerate", post(firecrawl::regenerate_key))
        .route("/firecrawl/status", get(firecrawl::key_status))
        .route("/location/countries", get(location::list_countries))
        .route("/location/states", get(location::list_states))
        .route("/location/cities", get(location::list_cities))
        .route("/location/resolve", post(location::resolve_location))
        .route("/admin", get(admin::get_overview))
        .route("/admin", delete(admin::delete_user))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_runner_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/runner/executions", post(runner::create_execution))
        .route("/runner/executions/{id}", put(runner::update_execution))
        .route(
            "/runner/executions/{id}/steps",
            post(runner::record_step),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            runner::runner_auth_middleware,
        ))
}

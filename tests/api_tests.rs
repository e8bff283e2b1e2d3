use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use openscouts::api::AppState;
use openscouts::config::Config;
use openscouts::domain::KeyStatus;

/// Default API key seeded by migration (must match m20250101_initial.rs)
const DEFAULT_API_KEY: &str = "openscouts_default_api_key_please_regenerate";

/// Runner ingest token from the default config.
const RUNNER_TOKEN: &str = "openscouts_runner_token_please_change";

const ADMIN_EMAIL: &str = "admin@openscouts.dev";

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = openscouts::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = openscouts::api::router(state.clone()).await;
    (app, state)
}

fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates a scout owned by the given key and returns its id.
async fn create_scout(app: &Router, api_key: &str, title: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scouts",
            Some(api_key),
            &serde_json::json!({ "title": title }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Signs up a fresh account and returns its api key.
async fn signup(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            &serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["api_key"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/scouts", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/scouts", Some("wrong-key")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/scouts", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signup_and_login_flow() {
    let (app, _state) = spawn_app().await;

    // Too-short password is rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            &serde_json::json!({ "email": "short@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let api_key = signup(&app, "alice@example.com").await;

    // Duplicate signup conflicts.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            &serde_json::json!({ "email": "alice@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": "alice@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": "alice@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The issued api key authenticates requests.
    let response = app
        .clone()
        .oneshot(get("/api/scouts", Some(&api_key)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_scout_crud() {
    let (app, _state) = spawn_app().await;

    let id = create_scout(&app, DEFAULT_API_KEY, "Rust jobs in Berlin").await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/scouts/{id}"), Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Rust jobs in Berlin");
    assert_eq!(body["data"]["is_active"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/scouts/{id}"),
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "description": "Weekly job watch" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["description"], "Weekly job watch");

    let response = app
        .clone()
        .oneshot(get("/api/scouts", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/scouts/{id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleted scouts are indistinguishable from foreign ones.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/scouts/{id}"), Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_scout_creation_validation_and_quota() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scouts",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "title": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for i in 0..5 {
        create_scout(&app, DEFAULT_API_KEY, &format!("Scout {i}")).await;
    }

    // Default quota is 5 per user.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scouts",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "title": "One too many" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_scout_activation_requires_full_configuration() {
    let (app, _state) = spawn_app().await;

    let id = create_scout(&app, DEFAULT_API_KEY, "Half-configured").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/scouts/{id}/activate"),
            Some(DEFAULT_API_KEY),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/scouts/{id}"),
            Some(DEFAULT_API_KEY),
            &serde_json::json!({
                "goal": "Track new Rust job postings",
                "search_queries": ["rust developer berlin"],
                "frequency": "hourly"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/scouts/{id}/activate"),
            Some(DEFAULT_API_KEY),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_active"], true);
}

#[tokio::test]
async fn test_scout_ownership_is_enforced() {
    let (app, _state) = spawn_app().await;

    let id = create_scout(&app, DEFAULT_API_KEY, "Mine").await;
    let other_key = signup(&app, "intruder@example.com").await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/scouts/{id}"), Some(&other_key)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/scouts/{id}"))
                .header("X-Api-Key", &other_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_messages_endpoint() {
    let (app, _state) = spawn_app().await;

    let id = create_scout(&app, DEFAULT_API_KEY, "Chatty").await;

    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/scouts/{id}/messages"),
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/scouts/{id}/messages"),
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "content": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_execute_scout_validation_and_cooldown() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scout/execute",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scout/execute",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "scoutId": "does-not-exist" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let id = create_scout(&app, DEFAULT_API_KEY, "Cooldown target").await;

    // The engine reports a run, which starts the manual-run cooldown.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/runner/executions")
                .header("X-Runner-Token", RUNNER_TOKEN)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "scoutId": id }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scout/execute",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "scoutId": id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_runner_endpoints_require_service_token() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/runner/executions",
            None,
            &serde_json::json!({ "scoutId": "whatever" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A user api key is not a runner token.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/runner/executions")
                .header("X-Runner-Token", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "scoutId": "whatever" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_runner_ingest_and_replay_timeline() {
    let (app, _state) = spawn_app().await;

    let scout_id = create_scout(&app, DEFAULT_API_KEY, "Replayable").await;

    let runner_post = |uri: String, body: serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("X-Runner-Token", RUNNER_TOKEN)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(runner_post(
            "/api/runner/executions".to_string(),
            serde_json::json!({ "scoutId": scout_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let execution_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "running");

    let steps = [
        serde_json::json!({
            "stepNumber": 1,
            "stepType": "search",
            "description": "Searching the web",
            "inputData": { "query": "rust jobs" },
            "outputData": { "searchResults": [
                { "title": "Board", "url": "https://a.example" },
                { "title": "Other", "url": "https://b.example" }
            ]}
        }),
        serde_json::json!({
            "stepNumber": 2,
            "stepType": "tool_call",
            "description": "Engine bookkeeping"
        }),
        serde_json::json!({
            "stepNumber": 3,
            "stepType": "scrape",
            "description": "Reading the page",
            "inputData": { "url": "https://b.example" },
            "outputData": { "screenshot": "data:image/png;base64,xyz" }
        }),
        serde_json::json!({
            "stepNumber": 4,
            "stepType": "summarize",
            "description": "Writing the summary",
            "outputData": { "summary": "a".repeat(100) }
        }),
    ];
    for step in &steps {
        let response = app
            .clone()
            .oneshot(runner_post(
                format!("/api/runner/executions/{execution_id}/steps"),
                step.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/runner/executions/{execution_id}"))
                .header("X-Runner-Token", RUNNER_TOKEN)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "status": "completed" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completed_at"].is_string());

    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/executions/{execution_id}/steps"),
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/executions/{execution_id}/replay"),
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // search 4000 + scrape 5000 + summarize (100 chars * 15ms => 1500) + 2000
    assert_eq!(body["data"]["total_ms"], 12_500);

    let events = body["data"]["events"].as_array().unwrap();
    assert!(!events.is_empty());
    // The tool call never appears; the scrape highlights the second hit.
    assert!(events.iter().all(|e| e["step_index"].as_u64().unwrap() < 3));
    assert!(events
        .iter()
        .any(|e| e["kind"] == "scrape_screenshot" && e["active_result"] == 1));

    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/scouts/{scout_id}/executions"),
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_live_stream_closes_once_execution_finished() {
    let (app, _state) = spawn_app().await;

    let scout_id = create_scout(&app, DEFAULT_API_KEY, "Finished run").await;

    let runner_post = |uri: String, body: serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("X-Runner-Token", RUNNER_TOKEN)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(runner_post(
            "/api/runner/executions".to_string(),
            serde_json::json!({ "scoutId": scout_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let execution_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(runner_post(
            format!("/api/runner/executions/{execution_id}/steps"),
            serde_json::json!({
                "stepNumber": 1,
                "stepType": "search",
                "description": "Searching the web"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/runner/executions/{execution_id}"))
                .header("X-Runner-Token", RUNNER_TOKEN)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "status": "completed" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A finished execution gets its final frame and a closed stream, not
    // an open connection waiting on the event bus.
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/executions/{execution_id}/live"),
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let collected = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        response.into_body().collect(),
    )
    .await
    .expect("live stream did not close")
    .unwrap();
    let body = String::from_utf8(collected.to_bytes().to_vec()).unwrap();
    assert!(body.contains("stepIndex"));
}

#[tokio::test]
async fn test_admin_dashboard_access() {
    let (app, state) = spawn_app().await;

    let response = app.clone().oneshot(get("/api/admin", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let outsider_key = signup(&app, "outsider@example.com").await;
    let response = app
        .clone()
        .oneshot(get("/api/admin", Some(&outsider_key)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/admin", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_users"], 2);

    // Admins cannot delete themselves.
    let admin = state
        .store()
        .get_user_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/admin",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "userId": admin.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let outsider = state
        .store()
        .get_user_by_email("outsider@example.com")
        .await
        .unwrap()
        .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/admin",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "userId": outsider.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/admin", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_users"], 1);
}

#[tokio::test]
async fn test_firecrawl_key_status_and_regenerate_cooldown() {
    let (app, state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/firecrawl/status", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["has_dedicated_key"], false);

    // Give the seeded account a freshly provisioned key.
    let admin = state
        .store()
        .get_user_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();
    state
        .store()
        .set_key_status(&admin.id, KeyStatus::Active, Some("fc-test-key"), None)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/firecrawl/status", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["has_dedicated_key"], true);

    // A key minted seconds ago cannot be regenerated yet.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/firecrawl/regenerate",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_location_endpoints() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/location/countries", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["code"] == "US"));

    let response = app
        .clone()
        .oneshot(get(
            "/api/location/states?country=us",
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["code"] == "NY"));

    let response = app
        .clone()
        .oneshot(get(
            "/api/location/cities?country=US&state=NY",
            Some(DEFAULT_API_KEY),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["name"] == "New York"));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/location/resolve",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "latitude": 40.7128, "longitude": -74.006 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["city"], "New York");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/location/resolve",
            Some(DEFAULT_API_KEY),
            &serde_json::json!({ "latitude": 0.0, "longitude": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let (app, _state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/metrics", Some(DEFAULT_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

use serde::{Deserialize, Serialize};

use crate::domain::UserLocation;
use crate::entities::{scout_executions, scout_messages, scouts};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ScoutDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Vec<String>,
    pub location: Option<UserLocation>,
    pub frequency: Option<String>,
    pub is_active: bool,
    pub last_run_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<scouts::Model> for ScoutDto {
    fn from(model: scouts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            goal: model.goal,
            search_queries: model
                .search_queries
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default(),
            location: model
                .location
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            frequency: model.frequency,
            is_active: model.is_active,
            last_run_at: model.last_run_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct MessageDto {
    pub id: i32,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl From<scout_messages::Model> for MessageDto {
    fn from(model: scout_messages::Model) -> Self {
        Self {
            id: model.id,
            role: model.role,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ExecutionDto {
    pub id: String,
    pub scout_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl From<scout_executions::Model> for ExecutionDto {
    fn from(model: scout_executions::Model) -> Self {
        Self {
            id: model.id,
            scout_id: model.scout_id,
            status: model.status,
            started_at: model.started_at,
            completed_at: model.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct StepDto {
    pub id: String,
    pub step_number: i32,
    pub step_type: String,
    pub description: String,
    pub input_data: Option<serde_json::Value>,
    pub output_data: Option<serde_json::Value>,
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeyInfoDto {
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub error: Option<String>,
    pub has_dedicated_key: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminUserDto {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub last_sign_in_at: Option<String>,
    pub scout_count: u64,
    pub execution_count: u64,
    pub remaining_credits: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminOverviewDto {
    pub users: Vec<AdminUserDto>,
    pub total_users: u64,
    pub total_scouts: u64,
    pub total_executions: u64,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUserDto {
    pub id: String,
    pub email: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateScoutRequest {
    pub title: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub location: Option<UserLocation>,
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateScoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub location: Option<UserLocation>,
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(rename = "scoutId")]
    pub scout_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "scoutId")]
    pub scout_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub success: bool,
    #[serde(rename = "alreadyExisted")]
    pub already_existed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateExecutionRequest {
    #[serde(rename = "executionId")]
    pub execution_id: Option<String>,
    #[serde(rename = "scoutId")]
    pub scout_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExecutionRequest {
    pub status: String,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordStepRequest {
    #[serde(rename = "stepNumber")]
    pub step_number: i32,
    #[serde(rename = "stepType")]
    pub step_type: String,
    pub description: String,
    #[serde(rename = "inputData")]
    pub input_data: Option<serde_json::Value>,
    #[serde(rename = "outputData")]
    pub output_data: Option<serde_json::Value>,
    pub status: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<String>,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<String>,
}

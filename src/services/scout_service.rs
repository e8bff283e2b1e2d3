//! Domain service for scout definitions.

use crate::api::types::{CreateScoutRequest, ScoutDto, UpdateScoutRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Scout {0} not found")]
    NotFound(String),

    #[error("Scout limit of {limit} reached")]
    QuotaExceeded { limit: u64 },

    #[error("Scout not found or unauthorized")]
    NotOwner,

    #[error("Scout is missing required fields: {0}")]
    Incomplete(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ScoutError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ScoutError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Scout CRUD with per-user ownership and quota enforcement. Every
/// operation takes the acting user's id; reads and writes against scouts
/// the user does not own fail with [`ScoutError::NotOwner`].
#[async_trait::async_trait]
pub trait ScoutService: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<ScoutDto>, ScoutError>;

    /// Creates a scout; fails with [`ScoutError::QuotaExceeded`] when the
    /// user already owns the configured maximum.
    async fn create(
        &self,
        user_id: &str,
        request: CreateScoutRequest,
    ) -> Result<ScoutDto, ScoutError>;

    async fn get(&self, user_id: &str, scout_id: &str) -> Result<ScoutDto, ScoutError>;

    async fn update(
        &self,
        user_id: &str,
        scout_id: &str,
        request: UpdateScoutRequest,
    ) -> Result<ScoutDto, ScoutError>;

    /// Activates a scout so the engine schedules it. Requires title, goal,
    /// at least one search query, and a frequency.
    async fn activate(&self, user_id: &str, scout_id: &str) -> Result<ScoutDto, ScoutError>;

    async fn delete(&self, user_id: &str, scout_id: &str) -> Result<(), ScoutError>;
}

//! Admin aggregation over users, scouts, and executions.

use thiserror::Error;

use crate::api::types::AdminOverviewDto;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Administrators cannot delete their own account")]
    SelfDeletion,

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Dashboard queries for sessions with an email under the admin domain.
/// The caller is responsible for the domain check; this layer only
/// aggregates.
#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    /// All users joined in memory with their scout and execution counts
    /// and, where a dedicated key exists, the remaining Firecrawl credits.
    async fn overview(&self) -> Result<AdminOverviewDto, AdminError>;

    /// Deletes a user and all owned data. `acting_user_id` guards against
    /// self-deletion.
    async fn delete_user(&self, acting_user_id: &str, user_id: &str) -> Result<(), AdminError>;
}

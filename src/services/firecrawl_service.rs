//! Per-user Firecrawl key lifecycle.
//!
//! Key status is a small state machine persisted in `user_preferences`:
//! `pending -> active` on successful provisioning, `pending -> failed` on an
//! upstream error, `active -> invalid` when a 401 is observed, and
//! `invalid/failed -> active` on a successful regeneration.

use thiserror::Error;

use crate::api::types::KeyInfoDto;
use crate::db::UsageEvent;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Regeneration allowed again in {wait_seconds} seconds")]
    RateLimited { wait_seconds: u64 },

    #[error("Partner API error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for KeyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The credential a run should use, after fallback resolution. `api_key`
/// is absent when neither a dedicated nor a fallback key exists.
#[derive(Debug, Clone)]
pub struct ResolvedKey {
    pub api_key: Option<String>,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
}

/// Outcome of a regeneration attempt.
#[derive(Debug, Clone, Copy)]
pub struct RegenerateOutcome {
    pub already_existed: bool,
}

#[async_trait::async_trait]
pub trait FirecrawlKeyService: Send + Sync {
    /// Provisions a key when the user has no active one. Best-effort; a
    /// failure is persisted as `failed` and not surfaced to the caller.
    async fn ensure_key(&self, user_id: &str, email: &str);

    /// Explicit regeneration, rate-limited to one attempt per cooldown
    /// window counted from the last successful creation.
    async fn regenerate(&self, user_id: &str, email: &str)
    -> Result<RegenerateOutcome, KeyError>;

    async fn key_info(&self, user_id: &str) -> Result<KeyInfoDto, KeyError>;

    /// Dedicated key when its status is `active`, otherwise the shared
    /// fallback credential.
    async fn key_for_user(&self, user_id: &str) -> Result<ResolvedKey, KeyError>;

    /// Records an observed 401 against the user's dedicated key.
    async fn mark_invalid(&self, user_id: &str, reason: &str) -> Result<(), KeyError>;

    async fn log_usage(&self, event: UsageEvent) -> Result<(), KeyError>;
}

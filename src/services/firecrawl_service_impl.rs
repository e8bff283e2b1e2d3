//! Key lifecycle implementation against the partner API and the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::types::KeyInfoDto;
use crate::clients::FirecrawlClient;
use crate::config::Config;
use crate::db::{Store, UsageEvent};
use crate::domain::KeyStatus;
use crate::domain::events::NotificationEvent;
use crate::services::firecrawl_service::{
    FirecrawlKeyService, KeyError, RegenerateOutcome, ResolvedKey,
};

pub struct PartnerKeyService {
    store: Arc<Store>,
    firecrawl: Arc<FirecrawlClient>,
    config: Arc<RwLock<Config>>,
    event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
}

impl PartnerKeyService {
    #[must_use]
    pub const fn new(
        store: Arc<Store>,
        firecrawl: Arc<FirecrawlClient>,
        config: Arc<RwLock<Config>>,
        event_bus: tokio::sync::broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            firecrawl,
            config,
            event_bus,
        }
    }

    fn publish_status(&self, user_id: &str, status: KeyStatus) {
        let _ = self.event_bus.send(NotificationEvent::KeyStatusChanged {
            user_id: user_id.to_string(),
            status: status.as_str().to_string(),
        });
    }

    async fn set_status(
        &self,
        user_id: &str,
        status: KeyStatus,
        api_key: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), KeyError> {
        self.store
            .set_key_status(user_id, status, api_key, error)
            .await?;
        self.publish_status(user_id, status);
        Ok(())
    }

    async fn provision(&self, user_id: &str, email: &str) -> Result<RegenerateOutcome, KeyError> {
        self.set_status(user_id, KeyStatus::Pending, None, None)
            .await?;

        match self.firecrawl.create_user(email).await {
            Ok(provisioned) => {
                self.set_status(user_id, KeyStatus::Active, Some(&provisioned.api_key), None)
                    .await?;
                info!("Firecrawl key active for user {user_id}");
                Ok(RegenerateOutcome {
                    already_existed: provisioned.already_existed,
                })
            }
            Err(e) => {
                let message = e.to_string();
                self.set_status(user_id, KeyStatus::Failed, None, Some(&message))
                    .await?;
                Err(KeyError::Upstream(message))
            }
        }
    }

    async fn current_status(&self, user_id: &str) -> Result<Option<KeyStatus>, KeyError> {
        let prefs = self.store.get_preferences(user_id).await?;
        Ok(prefs
            .and_then(|p| p.firecrawl_key_status)
            .and_then(|raw| raw.parse().ok()))
    }
}

/// Seconds left in the cooldown window, zero when it has passed or the
/// timestamp is unreadable.
fn remaining_cooldown(created_at: &str, cooldown_seconds: u64, now: DateTime<Utc>) -> u64 {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return 0;
    };

    let elapsed = now.signed_duration_since(created.with_timezone(&Utc));
    let elapsed_seconds = elapsed.num_seconds().max(0) as u64;
    cooldown_seconds.saturating_sub(elapsed_seconds)
}

#[async_trait::async_trait]
impl FirecrawlKeyService for PartnerKeyService {
    async fn ensure_key(&self, user_id: &str, email: &str) {
        match self.current_status(user_id).await {
            Ok(Some(KeyStatus::Active)) => {}
            Ok(_) => {
                if let Err(e) = self.provision(user_id, email).await {
                    warn!("Key provisioning for {user_id} failed: {e}");
                }
            }
            Err(e) => warn!("Could not read key status for {user_id}: {e}"),
        }
    }

    async fn regenerate(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<RegenerateOutcome, KeyError> {
        let cooldown = self
            .config
            .read()
            .await
            .firecrawl
            .regenerate_cooldown_seconds;

        if let Some(prefs) = self.store.get_preferences(user_id).await? {
            if let Some(created_at) = prefs.firecrawl_key_created_at.as_deref() {
                let wait_seconds = remaining_cooldown(created_at, cooldown, Utc::now());
                if wait_seconds > 0 {
                    return Err(KeyError::RateLimited { wait_seconds });
                }
            }
        }

        self.provision(user_id, email).await
    }

    async fn key_info(&self, user_id: &str) -> Result<KeyInfoDto, KeyError> {
        let mut prefs = self.store.get_preferences(user_id).await?;

        // Revalidate active keys on read. An explicit rejection upstream
        // demotes the key; transport errors leave it untouched.
        if let Some(p) = prefs.as_ref()
            && p.firecrawl_key_status.as_deref() == Some(KeyStatus::Active.as_str())
            && let Some(api_key) = p.firecrawl_api_key.as_deref()
            && matches!(self.firecrawl.validate_key(api_key).await, Ok(false))
        {
            self.mark_invalid(user_id, "Key rejected by partner API")
                .await?;
            prefs = self.store.get_preferences(user_id).await?;
        }

        Ok(prefs.map_or(
            KeyInfoDto {
                status: None,
                created_at: None,
                error: None,
                has_dedicated_key: false,
            },
            |p| KeyInfoDto {
                status: p.firecrawl_key_status,
                created_at: p.firecrawl_key_created_at,
                error: p.firecrawl_key_error,
                has_dedicated_key: p.firecrawl_api_key.is_some(),
            },
        ))
    }

    async fn key_for_user(&self, user_id: &str) -> Result<ResolvedKey, KeyError> {
        let prefs = self.store.get_preferences(user_id).await?;
        let fallback_key = self.config.read().await.firecrawl.fallback_key.clone();

        let (key, status) = prefs
            .map(|p| {
                let status = p
                    .firecrawl_key_status
                    .and_then(|raw| raw.parse::<KeyStatus>().ok());
                (p.firecrawl_api_key, status)
            })
            .unwrap_or((None, None));

        if let (Some(api_key), Some(KeyStatus::Active)) = (key, status) {
            return Ok(ResolvedKey {
                api_key: Some(api_key),
                used_fallback: false,
                fallback_reason: None,
            });
        }

        let reason = match status {
            None => "no dedicated key provisioned".to_string(),
            Some(s) => format!("dedicated key status is {}", s.as_str()),
        };

        Ok(ResolvedKey {
            api_key: fallback_key,
            used_fallback: true,
            fallback_reason: Some(reason),
        })
    }

    async fn mark_invalid(&self, user_id: &str, reason: &str) -> Result<(), KeyError> {
        self.store.mark_key_invalid(user_id, reason).await?;
        self.publish_status(user_id, KeyStatus::Invalid);
        warn!("Marked key for {user_id} invalid: {reason}");
        Ok(())
    }

    async fn log_usage(&self, event: UsageEvent) -> Result<(), KeyError> {
        self.store.log_usage(event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cooldown_counts_down_from_creation() {
        let created = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let created_at = created.to_rfc3339();

        let at = |secs: i64| created + chrono::Duration::seconds(secs);

        assert_eq!(remaining_cooldown(&created_at, 60, at(0)), 60);
        assert_eq!(remaining_cooldown(&created_at, 60, at(25)), 35);
        assert_eq!(remaining_cooldown(&created_at, 60, at(60)), 0);
        assert_eq!(remaining_cooldown(&created_at, 60, at(3600)), 0);
    }

    #[test]
    fn unreadable_timestamp_does_not_block() {
        assert_eq!(remaining_cooldown("not a date", 60, Utc::now()), 0);
    }
}
